//! Configuration Management
//!
//! Optional user defaults for awsfind, read from
//! `<config_dir>/awsfind/config.json`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// AWS profile to use when --profile is not given
    #[serde(default)]
    pub profile: Option<String>,
    /// AWS region to use when --region is not given
    #[serde(default)]
    pub region: Option<String>,
    /// Resource types to search when --only is not given (empty = all)
    #[serde(default)]
    pub resources: Vec<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("awsfind").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Cannot read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Get effective profile (CLI > config > SDK default chain)
    pub fn effective_profile(&self, cli: Option<&str>) -> Option<String> {
        cli.map(|s| s.to_string()).or_else(|| self.profile.clone())
    }

    /// Get effective region (CLI > config > SDK default chain)
    pub fn effective_region(&self, cli: Option<&str>) -> Option<String> {
        cli.map(|s| s.to_string()).or_else(|| self.region.clone())
    }

    /// Get effective resource selection (CLI > config > everything)
    pub fn effective_resources(&self, cli: &[String]) -> Vec<String> {
        if cli.is_empty() {
            self.resources.clone()
        } else {
            cli.to_vec()
        }
    }
}
