//! Path-addressable describer tree.
//!
//! Leaves fetch and render one source of content (a Kubernetes kind, or the
//! port-forward sessions); sections aggregate their children in declared
//! order. The tree is built once and only read afterwards.

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::content::Content;
use crate::error::Result;
use crate::portforward::PortForwardState;
use crate::processors::FilterParams;
use crate::store::ObjectStore;

mod path;
mod portforward;
mod resource;
mod section;

pub use path::{has_path_prefix, is_nested_under, validate_path, ROOT_PATH};
pub use portforward::{PortForwardDescriber, PORT_FORWARD_PATH, PORT_FORWARD_TITLE};
pub use resource::{ResourceDescriber, ResourceDescriptor, ResourceKey, ResourceOptions};
pub use section::SectionDescriber;

/// Per-request inputs handed down the tree.
#[derive(Clone)]
pub struct DescribeContext<'a> {
    store: &'a dyn ObjectStore,
    port_forwards: Option<&'a dyn PortForwardState>,
    namespace: Option<String>,
    object_name: Option<String>,
    params: FilterParams,
    cancel: CancellationToken,
}

impl<'a> DescribeContext<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self {
            store,
            port_forwards: None,
            namespace: None,
            object_name: None,
            params: FilterParams::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_port_forwards(mut self, state: &'a dyn PortForwardState) -> Self {
        self.port_forwards = Some(state);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Address a single object instead of the whole list.
    pub fn with_object_name(mut self, name: impl Into<String>) -> Self {
        self.object_name = Some(name.into());
        self
    }

    pub fn with_params(mut self, params: FilterParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn store(&self) -> &'a dyn ObjectStore {
        self.store
    }

    pub fn port_forwards(&self) -> Option<&'a dyn PortForwardState> {
        self.port_forwards
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn object_name(&self) -> Option<&str> {
        self.object_name.as_deref()
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Context for a section's children: single-object addressing only
    /// applies to the node the request targeted.
    pub(crate) fn for_children(&self) -> Self {
        Self {
            object_name: None,
            ..self.clone()
        }
    }
}

/// A node of the describer tree.
#[derive(Debug)]
pub enum Describer {
    Resource(ResourceDescriber),
    Section(SectionDescriber),
    PortForward(PortForwardDescriber),
}

impl Describer {
    pub fn path(&self) -> &str {
        match self {
            Describer::Resource(d) => d.path(),
            Describer::Section(d) => d.path(),
            Describer::PortForward(d) => d.path(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Describer::Resource(d) => d.title(),
            Describer::Section(d) => d.title(),
            Describer::PortForward(d) => d.title(),
        }
    }

    /// Ordered children; leaves have none.
    pub fn children(&self) -> &[Describer] {
        match self {
            Describer::Section(d) => d.children(),
            _ => &[],
        }
    }

    pub fn describe<'a>(&'a self, ctx: &'a DescribeContext<'a>) -> BoxFuture<'a, Result<Content>> {
        match self {
            Describer::Resource(d) => d.describe(ctx).boxed(),
            Describer::Section(d) => d.describe(ctx).boxed(),
            Describer::PortForward(d) => d.describe(ctx).boxed(),
        }
    }

    /// Pre-order traversal of this node and its descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// The node whose path equals `path`. Sibling paths never overlap, so at
    /// most one child can contain the request at each level.
    pub fn resolve(&self, path: &str) -> Option<&Describer> {
        let mut node = self;
        loop {
            if node.path() == path {
                return Some(node);
            }
            node = node
                .children()
                .iter()
                .find(|child| has_path_prefix(path, child.path()))?;
        }
    }
}

impl From<ResourceDescriber> for Describer {
    fn from(d: ResourceDescriber) -> Self {
        Describer::Resource(d)
    }
}

impl From<SectionDescriber> for Describer {
    fn from(d: SectionDescriber) -> Self {
        Describer::Section(d)
    }
}

impl From<PortForwardDescriber> for Describer {
    fn from(d: PortForwardDescriber) -> Self {
        Describer::PortForward(d)
    }
}

/// Lazy pre-order iterator over a describer subtree.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<&'a Describer>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Describer;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory collaborators shared by the describer tests.

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use k8s_openapi::serde_json::{self, json};
    use kube::api::DynamicObject;
    use tokio_util::sync::CancellationToken;

    use crate::describer::ResourceKey;
    use crate::error::StoreError;
    use crate::store::{ObjectStore, QueryScope};

    /// Serves canned objects per kind and records every query.
    #[derive(Default)]
    pub struct FakeStore {
        objects: HashMap<String, Vec<DynamicObject>>,
        failing: Vec<String>,
        stalling: Vec<String>,
        pub queries: Mutex<Vec<(ResourceKey, QueryScope)>>,
    }

    impl FakeStore {
        pub fn with_objects(mut self, kind: &str, objects: Vec<DynamicObject>) -> Self {
            self.objects.insert(kind.to_string(), objects);
            self
        }

        pub fn failing_for(mut self, kind: &str) -> Self {
            self.failing.push(kind.to_string());
            self
        }

        /// Queries for `kind` are recorded and then never complete.
        pub fn stalling_for(mut self, kind: &str) -> Self {
            self.stalling.push(kind.to_string());
            self
        }

        pub fn recorded(&self) -> Vec<(ResourceKey, QueryScope)> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl ObjectStore for FakeStore {
        fn query<'a>(
            &'a self,
            key: &'a ResourceKey,
            scope: &'a QueryScope,
        ) -> BoxFuture<'a, Result<Vec<DynamicObject>, StoreError>> {
            async move {
                self.queries
                    .lock()
                    .unwrap()
                    .push((key.clone(), scope.clone()));
                if self.failing.contains(&key.kind) {
                    return Err(StoreError::Backend(format!("{} is unreachable", key.kind)));
                }
                if self.stalling.contains(&key.kind) {
                    std::future::pending::<()>().await;
                }
                let objects = self.objects.get(&key.kind).cloned().unwrap_or_default();
                Ok(objects
                    .into_iter()
                    .filter(|o| match (scope.namespace(), o.metadata.namespace.as_deref()) {
                        (Some(wanted), Some(ns)) => ns == wanted,
                        _ => true,
                    })
                    .collect())
            }
            .boxed()
        }
    }

    pub fn cluster_role(name: &str) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "rbac.authorization.k8s.io/v1",
            "kind": "ClusterRole",
            "metadata": {"name": name},
        }))
        .unwrap()
    }

    pub fn cluster_role_binding(name: &str, role: &str) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "rbac.authorization.k8s.io/v1",
            "kind": "ClusterRoleBinding",
            "metadata": {"name": name},
            "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": "ClusterRole", "name": role},
        }))
        .unwrap()
    }

    pub fn role(ns: &str, name: &str) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "rbac.authorization.k8s.io/v1",
            "kind": "Role",
            "metadata": {"name": name, "namespace": ns},
        }))
        .unwrap()
    }

    pub fn rbac_key(kind: &str) -> ResourceKey {
        ResourceKey::new("rbac.authorization.k8s.io/v1", kind)
    }

    /// Fires `cancel` shortly after the caller starts awaiting.
    pub fn cancel_soon(cancel: &CancellationToken) {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });
    }
}
