//! Resource abstraction layer
//!
//! This module provides a data-driven approach to searching AWS resources.
//! Resource definitions are loaded from JSON at compile time; every resource
//! type is searched by the same probe, parameterized by its definition.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches resource definitions from embedded JSON
//! - [`fetcher`] - Fetches records and applies the substring predicate
//! - [`sdk_dispatch`] - Maps abstract SDK method names to concrete AWS SDK calls
//! - [`search`] - Runs probes and builds matches
//!
//! # Resource Definitions
//!
//! Resources are defined in `src/resources/aws.json`. Each entry names the
//! service and method to call, where the items live in the response, which
//! fields are searched and how the reported ARN is obtained.
//!
//! # Example
//!
//! ```ignore
//! use awsfind::aws::client::AwsClient;
//! use awsfind::resource::{get_resource, probe};
//!
//! async fn find_buckets(client: &AwsClient) -> anyhow::Result<()> {
//!     let resource = get_resource("s3-buckets").unwrap();
//!     for m in probe(resource, client, "logs").await? {
//!         println!("{}", m.reference);
//!     }
//!     Ok(())
//! }
//! ```

mod fetcher;
mod registry;
pub mod sdk_dispatch;
mod search;

pub use fetcher::{extract_json_value, fetch_resources, record_matches, value_texts};
pub use registry::*;
pub use search::{probe, run_probes, Detail, DetailValue, ProbeOutcome, ResourceMatch};
