//! Resource Registry - Load resource definitions from JSON
//!
//! This module loads the AWS resource definitions from an embedded JSON file
//! and provides lookup functions for the rest of the application. The order
//! of the definitions in the file is the order in which resources are
//! searched and reported.

use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

/// Embedded resource JSON (compiled into the binary)
const RESOURCE_FILE: &str = include_str!("../resources/aws.json");

/// Extra field shown under each match
#[derive(Debug, Clone, Deserialize)]
pub struct DetailDef {
    pub label: String,
    pub json_path: String,
    /// Skip the line entirely when the value is an empty list
    #[serde(default)]
    pub omit_if_empty: bool,
}

/// Client-side guard restricting which records are candidates for matching
#[derive(Debug, Clone, Deserialize)]
pub struct IncludeOnly {
    pub field: String,
    pub values: Vec<String>,
}

impl IncludeOnly {
    pub fn admits(&self, item: &Value) -> bool {
        item.get(&self.field)
            .and_then(|v| v.as_str())
            .map(|s| self.values.iter().any(|allowed| allowed == s))
            .unwrap_or(false)
    }
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub key: String,
    pub display_name: String,
    #[serde(default)]
    pub icon: String,
    pub service: String,
    pub sdk_method: String,
    #[serde(default)]
    pub sdk_method_params: Value,
    pub response_path: String,
    pub match_fields: Vec<String>,
    /// Field holding a reference the API already returns
    #[serde(default)]
    pub arn_field: Option<String>,
    /// Reference assembled from `{partition}`, `{region}`, `{account}` and record fields
    #[serde(default)]
    pub arn_template: Option<String>,
    #[serde(default)]
    pub details: Vec<DetailDef>,
    #[serde(default)]
    pub include_only: Option<IncludeOnly>,
}

impl ResourceDef {
    /// Whether building a reference requires the caller's region or account
    pub fn needs_caller_context(&self) -> bool {
        self.arn_template
            .as_deref()
            .map(|t| t.contains("{region}") || t.contains("{account}"))
            .unwrap_or(false)
    }
}

/// Root structure of resources/aws.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    pub resources: Vec<ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        serde_json::from_str(RESOURCE_FILE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e))
    })
}

/// All resource definitions, in search order
pub fn all_resources() -> &'static [ResourceDef] {
    &get_registry().resources
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    all_resources().iter().find(|r| r.key == key)
}

/// Get all resource keys, in search order
pub fn get_all_resource_keys() -> Vec<&'static str> {
    all_resources().iter().map(|r| r.key.as_str()).collect()
}

/// Resolve a list of keys to definitions, keeping registry order.
/// An empty selection means every resource.
pub fn select_resources(keys: &[String]) -> anyhow::Result<Vec<&'static ResourceDef>> {
    if let Some(unknown) = keys.iter().find(|k| get_resource(k).is_none()) {
        return Err(anyhow::anyhow!(
            "Unknown resource type: {} (expected one of: {})",
            unknown,
            get_all_resource_keys().join(", ")
        ));
    }

    Ok(all_resources()
        .iter()
        .filter(|r| keys.is_empty() || keys.iter().any(|k| k == &r.key))
        .collect())
}
