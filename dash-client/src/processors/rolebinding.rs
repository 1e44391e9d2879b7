use k8s_openapi::api::rbac::v1::RoleBinding;
use k8s_openapi::serde_json;
use kube::api::DynamicObject;

use crate::processors::clusterrolebinding::{subject_kinds, subject_names};
use crate::processors::processor::{age_accessor, dynamic_to_typed, Processor};
use crate::utils::{AccessorMode, FieldValue};

#[derive(Debug, Clone, serde::Serialize)]
pub struct RoleBindingProcessed {
    namespace: String,
    name: String,
    role: String,
    #[serde(rename = "subject-kind")]
    subject_kind: String,
    subjects: String,
    age: FieldValue,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RoleBindingProcessor;

impl Processor for RoleBindingProcessor {
    type Row = RoleBindingProcessed;

    fn columns(&self) -> &'static [&'static str] {
        &["namespace", "name", "role", "subject-kind", "subjects", "age"]
    }

    fn build_row(&self, obj: &DynamicObject) -> Result<Self::Row, serde_json::Error> {
        let rb: RoleBinding = dynamic_to_typed(obj)?;
        let subjects = rb.subjects.unwrap_or_default();

        Ok(RoleBindingProcessed {
            namespace: rb.metadata.namespace.clone().unwrap_or_default(),
            name: rb.metadata.name.clone().unwrap_or_default(),
            role: format!("{}/{}", rb.role_ref.kind, rb.role_ref.name),
            subject_kind: subject_kinds(&subjects),
            subjects: subject_names(&subjects),
            age: self.get_age(obj),
        })
    }

    fn filterable_fields(&self) -> &'static [&'static str] {
        &["namespace", "name", "role", "subjects"]
    }

    fn field_accessor(
        &self,
        mode: AccessorMode,
    ) -> Box<dyn Fn(&Self::Row, &str) -> Option<String> + '_> {
        Box::new(move |resource, field| match field {
            "namespace" => Some(resource.namespace.clone()),
            "name" => Some(resource.name.clone()),
            "role" => Some(resource.role.clone()),
            "subject_kind" | "subject-kind" => Some(resource.subject_kind.clone()),
            "subjects" => Some(resource.subjects.clone()),
            "age" => age_accessor(&resource.age, mode),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::processor::FilterParams;
    use k8s_openapi::serde_json::json;

    fn binding(ns: &str, name: &str, role: &str) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "rbac.authorization.k8s.io/v1",
            "kind": "RoleBinding",
            "metadata": {"name": name, "namespace": ns},
            "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": "Role", "name": role},
            "subjects": [{"kind": "User", "name": "jane"}]
        }))
        .unwrap()
    }

    #[test]
    fn filters_on_role_and_negates() {
        let items = vec![
            binding("default", "read-pods", "pod-reader"),
            binding("default", "write-pods", "pod-writer"),
        ];
        let params = FilterParams {
            filter: Some("pod-,!writer".into()),
            ..Default::default()
        };

        let rows = RoleBindingProcessor.process(&items, &params).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "read-pods");
        assert_eq!(rows[0].role, "Role/pod-reader");
        assert_eq!(rows[0].subject_kind, "User");
    }
}
