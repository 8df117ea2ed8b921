use std::path::Path;

use crate::agent::AgentConfig;
use crate::checkpoint::CheckpointManagerConfig;
use crate::error::ConfigError;
use crate::network::{validate_topology, NetworkConfig};
use crate::training::TrainerConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub training: TrainerConfig,
    pub agent: AgentConfig,
    pub checkpoint: CheckpointManagerConfig,
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
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_topology(&self.network.layer_widths)
            .map_err(|e| ConfigError::Validation(format!("network.layer_widths: {e}")))?;
        if self.network.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(
                "network.learning_rate must be > 0".into(),
            ));
        }

        if self.training.num_samples == 0 {
            return Err(ConfigError::Validation(
                "training.num_samples must be > 0".into(),
            ));
        }
        if self.training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be > 0".into(),
            ));
        }
        if self.training.pause_interval == 0 {
            return Err(ConfigError::Validation(
                "training.pause_interval must be > 0".into(),
            ));
        }
        if self.training.ratio_window == 0 {
            return Err(ConfigError::Validation(
                "training.ratio_window must be > 0".into(),
            ));
        }

        if self.agent.max_retries == 0 {
            return Err(ConfigError::Validation(
                "agent.max_retries must be >= 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.agent.activation_mutation_rate) {
            return Err(ConfigError::Validation(
                "agent.activation_mutation_rate must be in [0, 1]".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
