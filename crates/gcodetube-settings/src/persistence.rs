//! Settings Persistence
//!
//! Locates the per-user configuration file and loads or saves it.
//! A missing file is not an error: defaults are used until the first save.

use crate::config::Config;
use crate::error::{ConfigError, SettingsError, SettingsResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory name under the platform config directory
const APP_DIR: &str = "gcodetube";
/// File name of the per-user configuration
const CONFIG_FILE: &str = "config.toml";

/// Settings persistence layer
#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    config: Config,
    path: PathBuf,
}

impl SettingsPersistence {
    /// Platform-specific location of the configuration file
    pub fn default_path() -> SettingsResult<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform("no configuration directory".to_string())
        })?;
        Ok(base.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the per-user configuration, or defaults when none exists
    pub fn load_or_default() -> SettingsResult<Self> {
        Self::load_or_default_from(&Self::default_path()?)
    }

    /// Load `path`, or defaults bound to `path` when the file does not exist
    pub fn load_or_default_from(path: &Path) -> SettingsResult<Self> {
        let config = if path.exists() {
            info!("Loading settings from {}", path.display());
            Config::load_from_file(path)?
        } else {
            debug!("No settings at {}, using defaults", path.display());
            Config::default()
        };

        Ok(Self {
            config,
            path: path.to_path_buf(),
        })
    }

    /// Write the configuration, creating its directory when needed
    pub fn save(&self) -> SettingsResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", dir.display(), e))
            })?;
        }
        self.config.save_to_file(&self.path)?;
        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }

    /// Get reference to config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable reference to config
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_config(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let persistence = SettingsPersistence::load_or_default_from(&path).unwrap();
        assert_eq!(persistence.config(), &Config::default());
        assert_eq!(persistence.path(), path.as_path());
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gcodetube").join("config.toml");

        let mut persistence = SettingsPersistence::load_or_default_from(&path).unwrap();
        persistence.config_mut().tube.travel_width = 0.0;
        persistence.save().unwrap();

        let reloaded = SettingsPersistence::load_or_default_from(&path).unwrap();
        assert_eq!(reloaded.config().tube.travel_width, 0.0);
    }
}
