//! Host node configuration

use serde::{Deserialize, Serialize};
use spotter_core::settings::{parse_document, read_document, SettingsError};
use spotter_core::CameraTopics;
use spotter_eye::LocatorConfig;
use std::path::Path;
use std::time::Duration;

/// Configuration of the object spotter node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Processing cycles per second
    pub rate_hz: f64,
    pub topics: CameraTopics,
    pub locator: LocatorConfig,
    /// Log every published candidate at info level
    pub verbose: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rate_hz: 10.0,
            topics: CameraTopics::default(),
            locator: LocatorConfig::default(),
            verbose: false,
        }
    }
}

impl NodeConfig {
    /// Load from a JSON, TOML or YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        read_document(path)
    }

    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        parse_document(content)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.rate_hz.is_finite() || self.rate_hz <= 0.0 {
            return Err(format!("rate_hz must be positive, got {}", self.rate_hz));
        }
        if self.rate_hz > 1000.0 {
            return Err(format!("rate_hz cannot exceed 1000, got {}", self.rate_hz));
        }
        self.topics.validate().map_err(|e| e.to_string())?;
        self.locator.validate()?;
        Ok(())
    }

    /// Time between processing cycles
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz)
    }
}
