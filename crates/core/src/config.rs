//! Configuration management for the bootstrap security store.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Telemetry key used for resolver events unless configured otherwise.
pub const DEFAULT_TELEMETRY_KEY: &str = "transportLog";

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Settings for the bootstrap security store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapStoreConfig {
    /// Telemetry key attached to every resolver event
    pub telemetry_key: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for BootstrapStoreConfig {
    fn default() -> Self {
        Self {
            telemetry_key: DEFAULT_TELEMETRY_KEY.to_string(),
            log_format: LogFormat::Text,
            log_level: "info".to_string(),
        }
    }
}

impl BootstrapStoreConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the store cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.telemetry_key.trim().is_empty() {
            return Err(CoreError::Config(
                "telemetry_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
