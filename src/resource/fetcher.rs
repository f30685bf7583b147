//! Resource Fetcher
//!
//! Handles fetching resources from AWS APIs based on resource definitions.
//! Only the first page of each listing is read.

use super::registry::ResourceDef;
use crate::aws::client::ResourceApi;
use anyhow::Result;
use serde_json::{Map, Value};

/// Fetch the records of one resource type
pub async fn fetch_resources(resource_def: &ResourceDef, api: &dyn ResourceApi) -> Result<Vec<Value>> {
    // Build params
    let mut params = resource_def.sdk_method_params.clone();
    if params.is_null() {
        params = Value::Object(Map::new());
    }

    let response = api
        .invoke(&resource_def.service, &resource_def.sdk_method, &params)
        .await?;

    let items = extract_items(&response, &resource_def.response_path);
    tracing::debug!("{}: {} records", resource_def.key, items.len());

    Ok(items)
}

/// Extract items from response using the response_path
fn extract_items(response: &Value, path: &str) -> Vec<Value> {
    let container = if path.is_empty() {
        Some(response)
    } else {
        extract_json_value(response, path)
    };

    container
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

/// Extract a value from JSON using a dot-notation path
pub fn extract_json_value<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = item;

    for part in path.split('.') {
        // Handle array index
        current = match part.parse::<usize>() {
            Ok(idx) => current.get(idx)?,
            Err(_) => current.get(part)?,
        };
    }

    Some(current)
}

/// The strings held by a field: itself if it is a string, the string
/// elements if it is a list, nothing otherwise
pub fn value_texts(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(arr) => arr.iter().filter_map(|v| v.as_str()).collect(),
        _ => Vec::new(),
    }
}

/// Case-sensitive, unanchored substring test across the designated fields.
/// A list field matches if any of its elements does.
pub fn record_matches(record: &Value, fields: &[String], term: &str) -> bool {
    fields.iter().any(|field| {
        extract_json_value(record, field)
            .map(|value| value_texts(value).iter().any(|text| text.contains(term)))
            .unwrap_or(false)
    })
}
