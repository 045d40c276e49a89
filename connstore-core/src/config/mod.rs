//! Configuration management
//!
//! This module provides the `ConfigManager` for locating configuration files
//! and loading/saving `settings.toml`, plus the settings reader the store
//! uses to look up individual values.

mod manager;
pub mod settings;

pub use manager::{CONFIG_DIR_ENV, ConfigManager};
pub use settings::{
    ConnectionSettings, CredentialSettings, DEFAULT_CREDENTIAL_PREFIX,
    DEFAULT_MAX_RECENT_CONNECTIONS, LegacyKeyRule, LoggingSettings,
    MAX_RECENT_CONNECTIONS_SETTING, SettingsReader, StoreSettings, max_recent_connections,
};
