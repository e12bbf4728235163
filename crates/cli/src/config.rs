//! YAML configuration for a teardown run.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Fully resolved run configuration.
///
/// Loaded once at startup and passed by reference from then on; the
/// program performs no validation beyond what deserialization enforces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project and resource identifiers.
    pub basic: BasicConfig,
    /// Network-related switches.
    pub network: NetworkConfig,
}

/// Project and resource identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicConfig {
    /// Project ID or project number.
    pub project_id: String,
    /// Region holding the static IP address (e.g. "us-west3").
    pub region: String,
    /// Zone holding the instance (e.g. "us-west3-b").
    pub zone: String,
    /// Name of the instance to delete; also names the static IP.
    pub vm_name: String,
}

/// Network-related switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Whether to delete the reserved static IP after the instance.
    pub static_ip: bool,
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Render the resolved configuration as YAML.
    ///
    /// # Errors
    /// Returns error if the configuration cannot be serialized.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to render configuration")
    }
}
