use k8s_openapi::serde_json::{self, Value};
use kube::api::DynamicObject;
use tracing::{span, Level};

use super::{
    clusterrole::ClusterRoleProcessor,
    clusterrolebinding::ClusterRoleBindingProcessor,
    default::DefaultProcessor,
    processor::{FilterParams, Processor},
    role::RoleProcessor,
    rolebinding::RoleBindingProcessor,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProcessorKind {
    ClusterRole,
    ClusterRoleBinding,
    Default,
    Role,
    RoleBinding,
}

/// Processor for a Kubernetes kind name, case-insensitive; unknown kinds get the default.
#[inline]
pub fn processor_for(kind: &str) -> ProcessorKind {
    match kind.to_lowercase().as_str() {
        "clusterrole" => ProcessorKind::ClusterRole,
        "clusterrolebinding" => ProcessorKind::ClusterRoleBinding,
        "role" => ProcessorKind::Role,
        "rolebinding" => ProcessorKind::RoleBinding,
        _ => ProcessorKind::Default,
    }
}

fn run<P: Processor>(
    proc_impl: &P,
    items: &[DynamicObject],
    params: &FilterParams,
) -> Result<Vec<Value>, serde_json::Error> {
    let rows = proc_impl.process(items, params)?;

    let _json_span = span!(Level::DEBUG, "json_convert", rows = rows.len()).entered();

    rows.iter().map(serde_json::to_value).collect()
}

impl ProcessorKind {
    pub fn columns(&self) -> &'static [&'static str] {
        use ProcessorKind::*;
        match self {
            ClusterRole => ClusterRoleProcessor.columns(),
            ClusterRoleBinding => ClusterRoleBindingProcessor.columns(),
            Default => DefaultProcessor.columns(),
            Role => RoleProcessor.columns(),
            RoleBinding => RoleBindingProcessor.columns(),
        }
    }

    pub fn process(
        &self,
        items: &[DynamicObject],
        params: &FilterParams,
    ) -> Result<Vec<Value>, serde_json::Error> {
        use ProcessorKind::*;
        match self {
            ClusterRole => run(&ClusterRoleProcessor, items, params),
            ClusterRoleBinding => run(&ClusterRoleBindingProcessor, items, params),
            Default => run(&DefaultProcessor, items, params),
            Role => run(&RoleProcessor, items, params),
            RoleBinding => run(&RoleBindingProcessor, items, params),
        }
    }
}
