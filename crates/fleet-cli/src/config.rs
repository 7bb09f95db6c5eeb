//! Fleet CLI Configuration Management
//!
//! Configuration is read from a TOML file when `--config` is given and
//! falls back to defaults otherwise. Command line flags are merged on top.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use fleet_core::AgentConfig;

use crate::error::Result;

// ----------------------------------------------------------------------------
// CLI Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for the fleet CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Engine configuration
    pub agent: AgentConfig,
    /// In-memory transport behavior during replay
    pub replay: ReplayConfig,
}

/// Behavior of the simulated transport
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Channels the transport refuses to subscribe to
    pub fail_channels: Vec<String>,
    /// Delay before each subscribe, in milliseconds
    pub subscribe_delay_ms: u64,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(raw)?;
        config.agent.validate().map_err(fleet_core::FleetError::from)?;
        Ok(config)
    }
}
