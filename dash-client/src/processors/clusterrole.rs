use k8s_openapi::api::rbac::v1::ClusterRole;
use k8s_openapi::serde_json;
use kube::api::DynamicObject;

use crate::processors::processor::{age_accessor, dynamic_to_typed, Processor};
use crate::utils::{AccessorMode, FieldValue};

#[derive(Debug, Clone, serde::Serialize)]
pub struct ClusterRoleProcessed {
    name: String,
    rules: usize,
    aggregated: bool,
    age: FieldValue,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ClusterRoleProcessor;

impl Processor for ClusterRoleProcessor {
    type Row = ClusterRoleProcessed;

    fn columns(&self) -> &'static [&'static str] {
        &["name", "rules", "aggregated", "age"]
    }

    fn build_row(&self, obj: &DynamicObject) -> Result<Self::Row, serde_json::Error> {
        let cr: ClusterRole = dynamic_to_typed(obj)?;

        Ok(ClusterRoleProcessed {
            name: cr.metadata.name.clone().unwrap_or_default(),
            rules: cr.rules.as_ref().map_or(0, Vec::len),
            aggregated: cr.aggregation_rule.is_some(),
            age: self.get_age(obj),
        })
    }

    fn filterable_fields(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn field_accessor(
        &self,
        mode: AccessorMode,
    ) -> Box<dyn Fn(&Self::Row, &str) -> Option<String> + '_> {
        Box::new(move |resource, field| match field {
            "name" => Some(resource.name.clone()),
            "rules" => Some(crate::utils::pad_key(resource.rules)),
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

    fn cluster_role(name: &str, rules: usize) -> DynamicObject {
        let rules: Vec<_> = (0..rules)
            .map(|_| json!({"apiGroups": [""], "resources": ["pods"], "verbs": ["get"]}))
            .collect();
        serde_json::from_value(json!({
            "apiVersion": "rbac.authorization.k8s.io/v1",
            "kind": "ClusterRole",
            "metadata": {"name": name, "creationTimestamp": "2024-01-01T00:00:00Z"},
            "rules": rules,
        }))
        .unwrap()
    }

    #[test]
    fn builds_rows_sorted_by_name() {
        let items = vec![cluster_role("view", 2), cluster_role("admin", 5)];
        let rows = ClusterRoleProcessor
            .process(&items, &FilterParams::default())
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "admin");
        assert_eq!(rows[0].rules, 5);
        assert!(!rows[0].aggregated);
        assert_eq!(rows[1].age.sort_by, Some(1_704_067_200));
        assert!(rows[1].age.value.contains('y'));
    }

    #[test]
    fn filter_matches_on_name() {
        let items = vec![cluster_role("view", 1), cluster_role("admin", 1)];
        let params = FilterParams {
            filter: Some("adm".into()),
            ..Default::default()
        };
        let rows = ClusterRoleProcessor.process(&items, &params).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "admin");
    }
}
