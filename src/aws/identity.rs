//! Caller identity
//!
//! Resolves the values needed to assemble ARNs the APIs don't return
//! directly: the partition, the active region and the account id.

use anyhow::{Context, Result};
use aws_config::SdkConfig;

/// Region and account of the active credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub region: String,
    pub account_id: String,
}

/// ARN partition for a region
pub fn partition_for_region(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else if region.starts_with("us-iso-") {
        "aws-iso"
    } else if region.starts_with("us-isob-") {
        "aws-iso-b"
    } else {
        "aws"
    }
}

/// Look up the configured region and ask STS who we are
pub async fn resolve_caller_context(config: &SdkConfig) -> Result<CallerContext> {
    let region = config
        .region()
        .map(|r| r.as_ref().to_string())
        .context("No AWS region configured. Set AWS_REGION or use --region")?;

    let sts = aws_sdk_sts::Client::new(config);
    let identity = sts
        .get_caller_identity()
        .send()
        .await
        .context("GetCallerIdentity failed")?;

    let account_id = identity
        .account()
        .map(|s| s.to_string())
        .context("GetCallerIdentity returned no account id")?;

    tracing::info!("Caller account {} in {}", account_id, region);

    Ok(CallerContext { region, account_id })
}
