//! Configuration directory and settings file handling

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

use super::settings::StoreSettings;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "CONNSTORE_CONFIG_DIR";

const APP_DIR: &str = "connstore";
const SETTINGS_FILE: &str = "settings.toml";
const PROFILES_FILE: &str = "profiles.json";
const STATE_FILE: &str = "state.json";

/// Resolves configuration file locations and loads/saves settings
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the default configuration directory.
    ///
    /// Uses `$CONNSTORE_CONFIG_DIR` when set, else `<config dir>/connstore`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` when no configuration directory can
    /// be determined for the current user.
    pub fn new() -> ConfigResult<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::with_config_dir(PathBuf::from(dir)));
        }
        let base = dirs::config_dir().ok_or_else(|| ConfigError::Validation {
            field: "config_dir".to_string(),
            reason: "no configuration directory for the current user".to_string(),
        })?;
        Ok(Self::with_config_dir(base.join(APP_DIR)))
    }

    /// Creates a manager rooted at an explicit directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of `settings.toml`
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Path of the persisted profiles and groups document
    #[must_use]
    pub fn profiles_path(&self) -> PathBuf {
        self.config_dir.join(PROFILES_FILE)
    }

    /// Path of the persisted process state document
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.config_dir.join(STATE_FILE)
    }

    /// Creates the configuration directory if needed
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> ConfigResult<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        Ok(())
    }

    /// Loads settings; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_settings(&self) -> ConfigResult<StoreSettings> {
        let path = self.settings_path();
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(StoreSettings::default());
        }
        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))
    }

    /// Saves settings, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_settings(&self, settings: &StoreSettings) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        let content =
            toml::to_string_pretty(settings).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(self.settings_path(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_settings_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(dir.path().join("nested"));
        let settings = manager.load_settings().unwrap();
        assert_eq!(settings, StoreSettings::default());
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(dir.path().to_path_buf());
        let mut settings = StoreSettings::default();
        settings.connections.max_recent_connections = 10;
        settings.credentials.prefix = "acme".to_string();
        manager.save_settings(&settings).unwrap();
        assert_eq!(manager.load_settings().unwrap(), settings);
    }

    #[test]
    fn test_corrupt_settings_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(dir.path().to_path_buf());
        std::fs::write(manager.settings_path(), "[connections\nmax = ").unwrap();
        assert!(matches!(
            manager.load_settings(),
            Err(ConfigError::Parse(_))
        ));
    }
}
