//! Store settings
//!
//! Settings live in `settings.toml`. Every section and field has a default so
//! a missing or partial file is valid.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default capacity of the recent connections list
pub const DEFAULT_MAX_RECENT_CONNECTIONS: usize = 25;

/// Setting name for the recent connections capacity
pub const MAX_RECENT_CONNECTIONS_SETTING: &str = "connections.max_recent_connections";

/// Default leading segment of credential keys
pub const DEFAULT_CREDENTIAL_PREFIX: &str = "connstore";

/// Top-level settings document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Recent connection behavior
    pub connections: ConnectionSettings,
    /// Credential key formatting
    pub credentials: CredentialSettings,
    /// Logging
    pub logging: LoggingSettings,
}

/// Recent connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Maximum number of recent connections kept; 0 selects the default
    pub max_recent_connections: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            max_recent_connections: DEFAULT_MAX_RECENT_CONNECTIONS,
        }
    }
}

/// Credential key settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    /// Leading segment of every credential key
    pub prefix: String,
    /// Older key layouts still read (and migrated) on lookup
    pub legacy_keys: Vec<LegacyKeyRule>,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_CREDENTIAL_PREFIX.to_string(),
            legacy_keys: vec![LegacyKeyRule::default()],
        }
    }
}

/// An older credential key layout: the current key with one extra segment
/// inserted at `position` (counted in `|`-separated segments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyKeyRule {
    /// Provider whose profiles may still have secrets under the old layout
    pub provider: String,
    /// Segment index the extra segment was inserted at
    pub position: usize,
    /// The extra segment
    pub segment: String,
}

impl Default for LegacyKeyRule {
    fn default() -> Self {
        Self {
            provider: "MSSQL".to_string(),
            position: 3,
            segment: "applicationName:azdata".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default log level (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Read access to individual settings by dotted name
pub trait SettingsReader: Send + Sync {
    /// Returns the value of `setting` (e.g. `connections.max_recent_connections`)
    fn get_value(&self, setting: &str) -> Option<Value>;
}

impl SettingsReader for StoreSettings {
    fn get_value(&self, setting: &str) -> Option<Value> {
        let document = serde_json::to_value(self).ok()?;
        setting
            .split('.')
            .try_fold(&document, |node, segment| node.get(segment))
            .cloned()
    }
}

/// Reads the recent connections capacity, falling back to the default when
/// the setting is absent, zero or not a number
#[must_use]
pub fn max_recent_connections(reader: &dyn SettingsReader) -> usize {
    reader
        .get_value(MAX_RECENT_CONNECTIONS_SETTING)
        .and_then(|v| v.as_u64())
        .and_then(|v| usize::try_from(v).ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_MAX_RECENT_CONNECTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = StoreSettings::default();
        assert_eq!(settings.connections.max_recent_connections, 25);
        assert_eq!(settings.credentials.prefix, "connstore");
        assert_eq!(settings.credentials.legacy_keys.len(), 1);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: StoreSettings = toml::from_str(
            r#"
            [connections]
            max_recent_connections = 5
            "#,
        )
        .unwrap();
        assert_eq!(settings.connections.max_recent_connections, 5);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_get_value_by_dotted_name() {
        let settings = StoreSettings::default();
        assert_eq!(
            settings.get_value("credentials.prefix"),
            Some(Value::String("connstore".to_string()))
        );
        assert!(settings.get_value("connections.missing").is_none());
    }

    #[test]
    fn test_max_recent_connections_zero_means_default() {
        let mut settings = StoreSettings::default();
        settings.connections.max_recent_connections = 0;
        assert_eq!(max_recent_connections(&settings), DEFAULT_MAX_RECENT_CONNECTIONS);
        settings.connections.max_recent_connections = 7;
        assert_eq!(max_recent_connections(&settings), 7);
    }
}
