//! Configuration management for dbdmix CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Settings file used when none is given or configured
pub const DEFAULT_SETTINGS_PATH: &str = "settings.yaml";

/// Attachment definitions folder used when none is given or configured
pub const DEFAULT_ATTACHMENTS_DIR: &str = "attachments";

#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub settings_path: Option<PathBuf>,
    pub attachments_dir: Option<PathBuf>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("dbdmix");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Settings file: explicit argument, then configured default, then `settings.yaml`
    pub fn resolve_settings_path(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.settings_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH))
    }

    /// Attachments folder: explicit argument, then the settings file, then
    /// configured default, then `attachments`
    pub fn resolve_attachments_dir(
        &self,
        explicit: Option<PathBuf>,
        from_settings: Option<PathBuf>,
    ) -> PathBuf {
        explicit
            .or(from_settings)
            .or_else(|| self.attachments_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ATTACHMENTS_DIR))
    }
}
