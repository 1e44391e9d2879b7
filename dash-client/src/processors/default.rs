use k8s_openapi::serde_json;
use kube::api::DynamicObject;
use kube::ResourceExt;

use crate::processors::processor::{age_accessor, Processor};
use crate::utils::{AccessorMode, FieldValue};

/// Generic name/namespace/age rows for kinds without a dedicated processor.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DefaultProcessed {
    namespace: String,
    name: String,
    age: FieldValue,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DefaultProcessor;

impl Processor for DefaultProcessor {
    type Row = DefaultProcessed;

    fn columns(&self) -> &'static [&'static str] {
        &["namespace", "name", "age"]
    }

    fn build_row(&self, obj: &DynamicObject) -> Result<Self::Row, serde_json::Error> {
        Ok(DefaultProcessed {
            namespace: obj.namespace().unwrap_or_default(),
            name: obj.name_any(),
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
            "age" => age_accessor(&resource.age, mode),
            _ => None,
        })
    }
}
