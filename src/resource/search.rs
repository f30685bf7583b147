//! Resource Search
//!
//! One generic probe drives every resource type: fetch the records, keep
//! the candidates the definition admits, test the match fields for the
//! search term and turn each hit into a [`ResourceMatch`].

use super::fetcher::{extract_json_value, fetch_resources, record_matches, value_texts};
use super::registry::{DetailDef, ResourceDef};
use crate::aws::client::ResourceApi;
use crate::aws::identity::CallerContext;
use anyhow::{Context, Result};
use serde_json::Value;

/// Value of an extra field reported for a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailValue {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub label: String,
    pub value: DetailValue,
}

/// A single matching resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMatch {
    /// ARN, or the stack id for CloudFormation
    pub reference: String,
    pub details: Vec<Detail>,
}

/// Result of probing one resource type
#[derive(Debug)]
pub struct ProbeOutcome<'a> {
    pub resource: &'a ResourceDef,
    pub result: Result<Vec<ResourceMatch>>,
}

/// Values available to ARN templates besides the record's own fields
struct TemplateContext<'a> {
    partition: &'a str,
    caller: Option<&'a CallerContext>,
}

/// Search one resource type for the term.
///
/// Matches keep the order the listing returned them in. The caller
/// identity is only requested when a match needs it for its ARN.
pub async fn probe(
    resource_def: &ResourceDef,
    api: &dyn ResourceApi,
    term: &str,
) -> Result<Vec<ResourceMatch>> {
    let records = fetch_resources(resource_def, api).await?;

    let hits: Vec<&Value> = records
        .iter()
        .filter(|record| {
            resource_def
                .include_only
                .as_ref()
                .map(|guard| guard.admits(record))
                .unwrap_or(true)
        })
        .filter(|record| record_matches(record, &resource_def.match_fields, term))
        .collect();

    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let caller = if resource_def.needs_caller_context() {
        Some(api.caller_context().await?)
    } else {
        None
    };

    let ctx = TemplateContext {
        partition: api.partition(),
        caller: caller.as_ref(),
    };

    hits.into_iter()
        .map(|record| build_match(resource_def, record, &ctx))
        .collect()
}

/// Run probes one after another in the given order.
///
/// A failing probe is recorded in its outcome and the remaining probes
/// still run, unless `fail_fast` is set.
pub async fn run_probes<'a>(
    resources: &[&'a ResourceDef],
    api: &dyn ResourceApi,
    term: &str,
    fail_fast: bool,
) -> Vec<ProbeOutcome<'a>> {
    let mut outcomes = Vec::with_capacity(resources.len());

    for &resource in resources {
        tracing::debug!("Probing {}", resource.key);

        let result = probe(resource, api, term).await;
        let failed = match &result {
            Ok(matches) => {
                tracing::info!("{}: {} matches", resource.key, matches.len());
                false
            }
            Err(e) => {
                tracing::warn!("{} failed: {:#}", resource.key, e);
                true
            }
        };

        outcomes.push(ProbeOutcome { resource, result });

        if failed && fail_fast {
            tracing::error!("Stopping after {} failed", resource.key);
            break;
        }
    }

    outcomes
}

fn build_match(
    resource_def: &ResourceDef,
    record: &Value,
    ctx: &TemplateContext<'_>,
) -> Result<ResourceMatch> {
    let reference = if let Some(field) = &resource_def.arn_field {
        required_str(record, field)
            .with_context(|| format!("{}: response is missing {}", resource_def.display_name, field))?
            .to_string()
    } else if let Some(template) = &resource_def.arn_template {
        render_template(template, record, ctx)
            .with_context(|| format!("{}: cannot build ARN", resource_def.display_name))?
    } else {
        return Err(anyhow::anyhow!(
            "{}: no ARN source configured",
            resource_def.display_name
        ));
    };

    let details = resource_def
        .details
        .iter()
        .filter_map(|def| detail_for(def, record))
        .collect();

    Ok(ResourceMatch { reference, details })
}

fn detail_for(def: &DetailDef, record: &Value) -> Option<Detail> {
    let value = match extract_json_value(record, &def.json_path) {
        Some(Value::Array(arr)) => {
            let list: Vec<String> = arr
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect();
            if list.is_empty() && def.omit_if_empty {
                return None;
            }
            DetailValue::List(list)
        }
        Some(other) => DetailValue::Text(value_texts(other).concat()),
        None if def.omit_if_empty => return None,
        None => DetailValue::Text("-".to_string()),
    };

    Some(Detail {
        label: def.label.clone(),
        value,
    })
}

fn required_str<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    extract_json_value(record, field).and_then(|v| v.as_str())
}

/// Expand `{name}` placeholders from the context or the record
fn render_template(template: &str, record: &Value, ctx: &TemplateContext<'_>) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .with_context(|| format!("Unclosed placeholder in template: {}", template))?;
        let name = &after[..end];

        let value = match name {
            "partition" => ctx.partition,
            "region" => ctx
                .caller
                .map(|c| c.region.as_str())
                .context("region is not available")?,
            "account" => ctx
                .caller
                .map(|c| c.account_id.as_str())
                .context("account id is not available")?,
            field => required_str(record, field)
                .with_context(|| format!("response is missing {}", field))?,
        };
        out.push_str(value);

        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}
