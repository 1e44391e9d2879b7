use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, Subject};
use k8s_openapi::serde_json;
use kube::api::DynamicObject;

use crate::processors::processor::{age_accessor, dynamic_to_typed, Processor};
use crate::utils::{AccessorMode, FieldValue};

#[derive(Debug, Clone, serde::Serialize)]
pub struct ClusterRoleBindingProcessed {
    name: String,
    role: String,
    #[serde(rename = "subject-kind")]
    subject_kind: String,
    subjects: String,
    age: FieldValue,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ClusterRoleBindingProcessor;

impl Processor for ClusterRoleBindingProcessor {
    type Row = ClusterRoleBindingProcessed;

    fn columns(&self) -> &'static [&'static str] {
        &["name", "role", "subject-kind", "subjects", "age"]
    }

    fn build_row(&self, obj: &DynamicObject) -> Result<Self::Row, serde_json::Error> {
        let crb: ClusterRoleBinding = dynamic_to_typed(obj)?;
        let subjects = crb.subjects.unwrap_or_default();

        Ok(ClusterRoleBindingProcessed {
            name: crb.metadata.name.clone().unwrap_or_default(),
            role: format!("{}/{}", crb.role_ref.kind, crb.role_ref.name),
            subject_kind: subject_kinds(&subjects),
            subjects: subject_names(&subjects),
            age: self.get_age(obj),
        })
    }

    fn filterable_fields(&self) -> &'static [&'static str] {
        &["name", "role", "subject_kind", "subjects"]
    }

    fn field_accessor(
        &self,
        mode: AccessorMode,
    ) -> Box<dyn Fn(&Self::Row, &str) -> Option<String> + '_> {
        Box::new(move |resource, field| match field {
            "name" => Some(resource.name.clone()),
            "role" => Some(resource.role.clone()),
            "subject_kind" | "subject-kind" => Some(resource.subject_kind.clone()),
            "subjects" => Some(resource.subjects.clone()),
            "age" => age_accessor(&resource.age, mode),
            _ => None,
        })
    }
}

/// Distinct subject kinds in declaration order, `ServiceAccount` shortened.
pub(crate) fn subject_kinds(subjects: &[Subject]) -> String {
    let mut kinds: Vec<&str> = Vec::new();
    for subject in subjects {
        let kind = match subject.kind.as_str() {
            "ServiceAccount" => "SvcAcct",
            other => other,
        };
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    kinds.join(", ")
}

pub(crate) fn subject_names(subjects: &[Subject]) -> String {
    subjects
        .iter()
        .map(|s| match s.namespace.as_deref() {
            Some(ns) => format!("{}/{}", ns, s.name),
            None => s.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
