use chrono::{DateTime, Utc};
use k8s_openapi::serde_json;
use kube::api::DynamicObject;
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    filter::filter_dynamic,
    sort::sort_dynamic,
    utils::{time_since, AccessorMode, FieldValue},
};

type FieldAccessorFn<'a, R> = Box<dyn Fn(&R, &str) -> Option<String> + 'a>;

/// Caller-supplied list shaping, applied after rows are built.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub filter: Option<String>,
}

pub fn dynamic_to_typed<K: DeserializeOwned>(obj: &DynamicObject) -> Result<K, serde_json::Error> {
    serde_json::from_value(serde_json::to_value(obj)?)
}

/// Turns raw store objects of one kind into display rows.
pub trait Processor: Debug + Send + Sync {
    type Row: Debug + Clone + Send + Sync + serde::Serialize;

    /// Row keys in display order.
    fn columns(&self) -> &'static [&'static str];

    fn build_row(&self, obj: &DynamicObject) -> Result<Self::Row, serde_json::Error>;

    fn filterable_fields(&self) -> &'static [&'static str];

    fn field_accessor(&self, mode: AccessorMode) -> FieldAccessorFn<'_, Self::Row>;

    #[tracing::instrument(skip(self, items), fields(item_count = items.len()))]
    fn process(
        &self,
        items: &[DynamicObject],
        params: &FilterParams,
    ) -> Result<Vec<Self::Row>, serde_json::Error> {
        let mut rows: Vec<Self::Row> = items
            .par_iter()
            .map(|obj| self.build_row(obj))
            .collect::<Result<Vec<_>, _>>()?;

        sort_dynamic(
            &mut rows,
            params.sort_by.as_deref(),
            params.sort_order.as_deref(),
            self.field_accessor(AccessorMode::Sort),
        );

        if let Some(query) = params.filter.as_deref() {
            rows = filter_dynamic(
                &rows,
                query,
                self.filterable_fields(),
                self.field_accessor(AccessorMode::Filter),
            )
            .into_iter()
            .cloned()
            .collect();
        }

        Ok(rows)
    }

    fn get_age(&self, obj: &DynamicObject) -> FieldValue {
        let mut age = FieldValue::default();
        let Some(ts) = obj.metadata.creation_timestamp.as_ref() else {
            return age;
        };
        // `Time` serializes as RFC3339 whatever datetime type it wraps.
        let Ok(serde_json::Value::String(raw)) = serde_json::to_value(ts) else {
            return age;
        };
        age.value = time_since(&raw);
        age.sort_by = raw
            .parse::<DateTime<Utc>>()
            .ok()
            .map(|t| t.timestamp().max(0) as usize);
        age
    }
}

/// Shared accessor arm for the `age` column.
pub fn age_accessor(age: &FieldValue, mode: AccessorMode) -> Option<String> {
    match mode {
        AccessorMode::Sort => age.sort_by.map(crate::utils::pad_key),
        AccessorMode::Filter => Some(age.value.clone()),
    }
}
