//! Locating, loading and saving the user's configuration file.

use crate::config::Config;
use crate::error::{SettingsError, SettingsResult};
use std::path::PathBuf;

/// Owns the active configuration and the file it came from.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    config: Config,
    path: PathBuf,
}

impl SettingsManager {
    /// File name used inside the config directory.
    pub const FILE_NAME: &'static str = "settings.toml";

    /// Platform configuration directory for LabKit, e.g. `~/.config/labkit`.
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("labkit"))
            .ok_or_else(|| {
                SettingsError::NoConfigDir("no configuration directory on this platform".into())
            })
    }

    /// Create the configuration directory if missing.
    pub fn ensure_config_dir() -> SettingsResult<PathBuf> {
        let dir = Self::config_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Load from the default location, falling back to defaults when absent.
    pub fn load_default() -> SettingsResult<Self> {
        let path = Self::config_dir()?.join(Self::FILE_NAME);
        Self::load_or_default(path)
    }

    /// Load from `path`, or start from defaults when the file does not exist.
    pub fn load_or_default(path: PathBuf) -> SettingsResult<Self> {
        let config = if path.exists() {
            Config::load_from_file(&path)?
        } else {
            tracing::info!("No settings at {}, using defaults", path.display());
            Config::default()
        };
        Ok(Self { config, path })
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration after validating it.
    pub fn update(&mut self, config: Config) -> SettingsResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Write the configuration back to its file, creating parent directories.
    pub fn save(&self) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.config.save_to_file(&self.path)
    }
}
