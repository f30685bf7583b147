//! AWS Client
//!
//! Main client for running resource probes against AWS. It owns an
//! explicitly constructed [`SdkConfig`] and caches the caller identity for
//! the lifetime of the process.

use super::auth;
use super::identity::{self, CallerContext};
use crate::resource::sdk_dispatch;
use anyhow::Result;
use async_trait::async_trait;
use aws_config::SdkConfig;
use serde_json::Value;
use tokio::sync::OnceCell;

/// Everything a resource probe needs from the provider
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Invoke a list/describe method and return its redacted JSON response
    async fn invoke(&self, service: &str, method: &str, params: &Value) -> Result<Value>;

    /// Region and account of the active credentials
    async fn caller_context(&self) -> Result<CallerContext>;

    /// ARN partition of the configured region
    fn partition(&self) -> &str;
}

/// Main AWS client
pub struct AwsClient {
    config: SdkConfig,
    partition: &'static str,
    caller: OnceCell<CallerContext>,
}

impl AwsClient {
    /// Create a new client from the default credential chain
    pub async fn new(profile: Option<&str>, region: Option<&str>) -> Result<Self> {
        let config = auth::load_sdk_config(profile, region).await?;
        Ok(Self::from_sdk_config(config))
    }

    /// Wrap an already built SDK configuration
    pub fn from_sdk_config(config: SdkConfig) -> Self {
        let partition = config
            .region()
            .map(|r| identity::partition_for_region(r.as_ref()))
            .unwrap_or("aws");

        Self {
            config,
            partition,
            caller: OnceCell::new(),
        }
    }

    /// Get the configured region, if any
    pub fn region(&self) -> Option<&str> {
        self.config.region().map(|r| r.as_ref())
    }
}

#[async_trait]
impl ResourceApi for AwsClient {
    async fn invoke(&self, service: &str, method: &str, params: &Value) -> Result<Value> {
        sdk_dispatch::invoke_sdk(service, method, &self.config, params).await
    }

    async fn caller_context(&self) -> Result<CallerContext> {
        self.caller
            .get_or_try_init(|| identity::resolve_caller_context(&self.config))
            .await
            .cloned()
    }

    fn partition(&self) -> &str {
        self.partition
    }
}
