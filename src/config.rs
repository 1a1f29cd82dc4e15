//! Configuration for the activation forecaster.

use crate::data::DeviceRegistry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of devices configured by default (`device_1`..`device_6`).
pub const DEFAULT_DEVICE_COUNT: usize = 6;

/// Main configuration for serving predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Devices predicted for by the serving variant
    pub devices: Vec<String>,

    /// Trained model bundle used by the serving variant
    pub model_path: Option<PathBuf>,

    /// Port the server binds to
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            devices: DeviceRegistry::numbered(DEFAULT_DEVICE_COUNT)
                .devices()
                .to_vec(),
            model_path: None,
            port: 5000,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("activation-forecast")
            .join("config.json")
    }

    /// The configured device registry.
    pub fn device_registry(&self) -> DeviceRegistry {
        DeviceRegistry::from_list(self.devices.iter().cloned())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
}
