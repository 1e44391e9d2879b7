use k8s_openapi::api::rbac::v1::Role;
use k8s_openapi::serde_json;
use kube::api::DynamicObject;

use crate::processors::processor::{age_accessor, dynamic_to_typed, Processor};
use crate::utils::{AccessorMode, FieldValue};

#[derive(Debug, Clone, serde::Serialize)]
pub struct RoleProcessed {
    namespace: String,
    name: String,
    rules: usize,
    age: FieldValue,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RoleProcessor;

impl Processor for RoleProcessor {
    type Row = RoleProcessed;

    fn columns(&self) -> &'static [&'static str] {
        &["namespace", "name", "rules", "age"]
    }

    fn build_row(&self, obj: &DynamicObject) -> Result<Self::Row, serde_json::Error> {
        let role: Role = dynamic_to_typed(obj)?;

        Ok(RoleProcessed {
            namespace: role.metadata.namespace.clone().unwrap_or_default(),
            name: role.metadata.name.clone().unwrap_or_default(),
            rules: role.rules.as_ref().map_or(0, Vec::len),
            age: self.get_age(obj),
        })
    }

    fn filterable_fields(&self) -> &'static [&'static str] {
        &["namespace", "name"]
    }

    fn field_accessor(
        &self,
        mode: AccessorMode,
    ) -> Box<dyn Fn(&Self::Row, &str) -> Option<String> + '_> {
        Box::new(move |resource, field| match field {
            "namespace" => Some(resource.namespace.clone()),
            "name" => Some(resource.name.clone()),
            "rules" => Some(crate::utils::pad_key(resource.rules)),
            "age" => age_accessor(&resource.age, mode),
            _ => None,
        })
    }
}
