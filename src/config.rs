use std::path::Path;

use tracing::warn;

use crate::checkpoint::{unix_millis, CheckpointManagerConfig, StampSource};
use crate::error::ConfigError;
use crate::training::{LinearConfig, TrainerConfig};

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub checkpoint: CheckpointManagerConfig,
    pub training: TrainerConfig,
    pub model: LinearConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let naming = self.checkpoint.naming()?;
        if let Some(width) = self.checkpoint.stamp_width {
            if width == 0 || width > 20 {
                return Err(ConfigError::Validation(
                    "checkpoint.stamp_width must be in [1, 20]".into(),
                ));
            }
        }
        if self.training.num_epochs == 0 {
            return Err(ConfigError::Validation(
                "training.num_epochs must be > 0".into(),
            ));
        }

        // The largest stamp this run will write must fit the padded width.
        let largest_stamp = match self.checkpoint.stamp {
            StampSource::Epoch => self.training.num_epochs as u64,
            StampSource::UnixMillis => unix_millis(),
        };
        if naming.id_for(largest_stamp).is_err() {
            return Err(ConfigError::Validation(format!(
                "checkpoint.stamp_width {} cannot hold stamp {}",
                naming.width(),
                largest_stamp
            )));
        }
        if self.model.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(
                "model.learning_rate must be > 0".into(),
            ));
        }
        if self.model.momentum < 0.0 || self.model.momentum >= 1.0 {
            return Err(ConfigError::Validation(
                "model.momentum must be in [0, 1)".into(),
            ));
        }
        if self.model.samples == 0 {
            return Err(ConfigError::Validation(
                "model.samples must be > 0".into(),
            ));
        }
        if self.model.noise < 0.0 {
            return Err(ConfigError::Validation(
                "model.noise must be >= 0".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}
