//! AWS API interaction module
//!
//! This module provides the core functionality for talking to AWS: loading
//! the SDK configuration, resolving the caller identity, and the client that
//! resource probes are run against.
//!
//! # Module Structure
//!
//! - [`auth`] - SDK configuration from the default credential chain
//! - [`client`] - Main AWS client and the [`client::ResourceApi`] seam
//! - [`errors`] - User-facing formatting of SDK errors
//! - [`identity`] - Caller account and partition resolution
//!
//! # Example
//!
//! ```ignore
//! use awsfind::aws::client::{AwsClient, ResourceApi};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = AwsClient::new(None, Some("eu-west-1")).await?;
//!     let caller = client.caller_context().await?;
//!     println!("{}", caller.account_id);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod errors;
pub mod identity;
