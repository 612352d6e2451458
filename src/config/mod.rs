//! Configuration loading and management

mod io;
mod settings;

pub use settings::Settings;

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::share::DeviceDisplayName;
use crate::stats::AggregatorParams;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from a file, or defaults if it does not exist
    pub fn from_file_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn aggregator_params(&self) -> AggregatorParams {
        self.settings.aggregator_params()
    }

    pub fn display_name_provider(&self) -> DeviceDisplayName {
        DeviceDisplayName::new(self.settings.display_name.clone(), self.settings.device_id.clone())
    }
}
