use crate::domain::{config::PollerConfig, error::{ScaleError, ScaleResult}};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Use the global configuration file under the user's home directory
    pub fn new() -> ScaleResult<Self> {
        Ok(Self {
            config_path: Self::get_global_config_path()?,
        })
    }

    /// Use an explicit configuration file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate the configuration file
    pub fn load_config(&self) -> ScaleResult<PollerConfig> {
        let content = fs::read_to_string(&self.config_path).map_err(|e| ScaleError::Config {
            message: format!(
                "Failed to read config file {}: {}",
                self.config_path.display(),
                e
            ),
        })?;

        let config: PollerConfig = toml::from_str(&content).map_err(|e| ScaleError::Config {
            message: format!(
                "Failed to parse config file {}: {}",
                self.config_path.display(),
                e
            ),
        })?;
        config.validate()?;

        debug!("Loaded poller configuration from {}", self.config_path.display());
        Ok(config)
    }

    /// Save configuration, creating parent directories as needed
    pub fn save_config(&self, config: &PollerConfig) -> ScaleResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ScaleError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| ScaleError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&self.config_path, content).map_err(|e| ScaleError::Config {
            message: format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ),
        })
    }

    /// Get global configuration path
    fn get_global_config_path() -> ScaleResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| ScaleError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join("scale-poller").join("config.toml"))
    }
}
