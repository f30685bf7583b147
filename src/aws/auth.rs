//! AWS Authentication
//!
//! Builds the shared SDK configuration. Credentials always come from the
//! SDK's default provider chain (environment, shared config/credentials
//! files, SSO, web identity, instance metadata); only the profile and
//! region can be overridden here.

use anyhow::Result;
use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Validate an AWS region name such as `us-east-1` or `us-gov-west-1`.
/// Lowercase letters, digits and hyphens only; must start with a letter
/// and end with a digit.
pub fn validate_region(region: &str) -> bool {
    if region.len() < 4 || region.len() > 32 {
        return false;
    }

    match region.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {},
        _ => return false,
    }

    if !region.ends_with(|c: char| c.is_ascii_digit()) {
        return false;
    }

    region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Load the SDK configuration, applying optional profile and region overrides
pub async fn load_sdk_config(profile: Option<&str>, region: Option<&str>) -> Result<SdkConfig> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(profile) = profile {
        tracing::info!("Using AWS profile: {}", profile);
        loader = loader.profile_name(profile);
    }

    if let Some(region) = region {
        if !validate_region(region) {
            return Err(anyhow::anyhow!("Invalid AWS region: {}", region));
        }
        tracing::info!("Using AWS region: {}", region);
        loader = loader.region(Region::new(region.to_string()));
    }

    let config = loader.load().await;

    match config.region() {
        Some(region) => tracing::debug!("Resolved region: {}", region),
        None => tracing::warn!("No AWS region resolved from the environment"),
    }

    Ok(config)
}
