//! Connection profile model and login-target identity.
//!
//! A profile's *identity* is the string that names the login target: the
//! provider plus its server, database, authentication and user fields. It
//! never includes the password or the display name, so two profiles that log
//! into the same place share it regardless of how they were built.

use std::collections::BTreeMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::group::same_group_name;

/// Options key mirroring the profile password
pub const PASSWORD_OPTION: &str = "password";

/// Separator between identity components
pub const ID_SEPARATOR: char = '|';

/// Separator between an identity component name and its value
pub const NAME_VALUE_SEPARATOR: char = ':';

/// Leading identity component naming the provider
pub const PROVIDER_PROPERTY: &str = "providerName";

/// Identity component names that come from typed profile fields
const IDENTITY_FIELDS: [&str; 4] = ["authenticationType", "database", "server", "user"];

/// Authentication scheme of a connection profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AuthenticationType {
    /// User name and password
    #[default]
    #[serde(rename = "SqlLogin", alias = "Password")]
    Password,
    /// Operating-system integrated authentication
    Integrated,
    /// Interactive multi-factor sign-in
    #[serde(rename = "AzureMFA")]
    AzureMfa,
    /// Interactive multi-factor sign-in with explicit user
    #[serde(rename = "AzureMFAAndUser")]
    AzureMfaAndUser,
    /// Token service authentication, account-bound
    #[serde(rename = "dstsAuth")]
    DstsAuth,
    /// No authentication
    None,
}

impl AuthenticationType {
    /// Returns the wire name used in identities and persisted documents
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Password => "SqlLogin",
            Self::Integrated => "Integrated",
            Self::AzureMfa => "AzureMFA",
            Self::AzureMfaAndUser => "AzureMFAAndUser",
            Self::DstsAuth => "dstsAuth",
            Self::None => "None",
        }
    }
}

impl fmt::Display for AuthenticationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuthenticationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqllogin" | "password" => Ok(Self::Password),
            "integrated" => Ok(Self::Integrated),
            "azuremfa" => Ok(Self::AzureMfa),
            "azuremfaanduser" => Ok(Self::AzureMfaAndUser),
            "dstsauth" => Ok(Self::DstsAuth),
            "none" => Ok(Self::None),
            other => Err(format!("unknown authentication type '{other}'")),
        }
    }
}

/// Which fields go into a profile identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityScope {
    /// Provider, server, database, authentication type and user only.
    /// Used for credential keys so similar profiles share one secret.
    Basic,
    /// Basic fields plus every non-empty provider option except the password.
    /// Used to tell recent connections apart.
    Full,
}

/// A connection profile
///
/// The password is held as a [`SecretString`] and mirrored into the
/// `password` slot of [`options`](Self::options) so provider code that only
/// looks at options still sees it. Serialization skips the typed field; the
/// mirror is only present when a caller explicitly asked for a plaintext
/// write.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(from = "ProfileRecord")]
pub struct ConnectionProfile {
    /// Identifier assigned by the persistent configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<String>,
    /// Provider that understands this profile
    pub provider_name: String,
    /// Server / host
    pub server_name: String,
    /// Database or other target inside the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    /// Login name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Authentication scheme
    #[serde(default)]
    pub authentication_type: AuthenticationType,
    /// Account bound to token-based authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_account: Option<String>,
    #[serde(skip)]
    password: Option<SecretString>,
    /// Whether the password goes to the secret store
    #[serde(default)]
    pub save_password: bool,
    /// Whether the profile is persisted in the configuration
    #[serde(default)]
    pub save_profile: bool,
    /// Owning group id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Owning group full path name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_full_name: Option<String>,
    /// Provider-specific options
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

/// Serialized shape of a profile; rehydrates the password from options.
#[derive(Deserialize)]
struct ProfileRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    connection_name: Option<String>,
    provider_name: String,
    server_name: String,
    #[serde(default)]
    database_name: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    authentication_type: AuthenticationType,
    #[serde(default)]
    azure_account: Option<String>,
    #[serde(default)]
    save_password: bool,
    #[serde(default)]
    save_profile: bool,
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    group_full_name: Option<String>,
    #[serde(default)]
    options: BTreeMap<String, Value>,
}

impl From<ProfileRecord> for ConnectionProfile {
    fn from(record: ProfileRecord) -> Self {
        let password = match record.options.get(PASSWORD_OPTION) {
            Some(Value::String(p)) if !p.is_empty() => Some(SecretString::from(p.clone())),
            _ => None,
        };
        Self {
            id: record.id,
            connection_name: record.connection_name,
            provider_name: record.provider_name,
            server_name: record.server_name,
            database_name: record.database_name,
            user_name: record.user_name,
            authentication_type: record.authentication_type,
            azure_account: record.azure_account,
            password,
            save_password: record.save_password,
            save_profile: record.save_profile,
            group_id: record.group_id,
            group_full_name: record.group_full_name,
            options: record.options,
        }
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options: BTreeMap<&str, &Value> = self
            .options
            .iter()
            .filter(|(k, _)| k.as_str() != PASSWORD_OPTION)
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        f.debug_struct("ConnectionProfile")
            .field("id", &self.id)
            .field("connection_name", &self.connection_name)
            .field("provider_name", &self.provider_name)
            .field("server_name", &self.server_name)
            .field("database_name", &self.database_name)
            .field("user_name", &self.user_name)
            .field("authentication_type", &self.authentication_type)
            .field("has_password", &self.has_password())
            .field("save_password", &self.save_password)
            .field("save_profile", &self.save_profile)
            .field("group_id", &self.group_id)
            .field("group_full_name", &self.group_full_name)
            .field("options", &options)
            .finish_non_exhaustive()
    }
}

impl ConnectionProfile {
    /// Creates a profile for `server_name` handled by `provider_name`
    #[must_use]
    pub fn new(provider_name: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
            server_name: server_name.into(),
            ..Self::default()
        }
    }

    /// Sets the display name
    #[must_use]
    pub fn with_connection_name(mut self, name: impl Into<String>) -> Self {
        self.connection_name = Some(name.into());
        self
    }

    /// Sets the database name
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database_name = Some(database.into());
        self
    }

    /// Sets the login name
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user_name = Some(user.into());
        self
    }

    /// Sets the authentication scheme
    #[must_use]
    pub fn with_authentication(mut self, auth: AuthenticationType) -> Self {
        self.authentication_type = auth;
        self
    }

    /// Sets the password (and its options mirror)
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.set_password(Some(SecretString::from(password.into())));
        self
    }

    /// Sets the owning group id
    #[must_use]
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Marks the profile as persisted
    #[must_use]
    pub fn saved(mut self) -> Self {
        self.save_profile = true;
        self
    }

    /// Returns the password, if one is set
    #[must_use]
    pub const fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    /// Returns true if a non-empty password is set
    #[must_use]
    pub fn has_password(&self) -> bool {
        self.password
            .as_ref()
            .is_some_and(|p| !p.expose_secret().is_empty())
    }

    /// Replaces the password and keeps the options mirror in sync
    pub fn set_password(&mut self, password: Option<SecretString>) {
        match &password {
            Some(p) => {
                self.options.insert(
                    PASSWORD_OPTION.to_string(),
                    Value::String(p.expose_secret().to_string()),
                );
            }
            None => {
                self.options.remove(PASSWORD_OPTION);
            }
        }
        self.password = password;
    }

    /// Returns a copy of this profile with the password removed
    #[must_use]
    pub fn without_password(&self) -> Self {
        let mut stripped = self.clone();
        stripped.set_password(None);
        stripped
    }

    /// Returns the display name or an empty string
    #[must_use]
    pub fn name(&self) -> &str {
        self.connection_name.as_deref().unwrap_or_default()
    }

    /// Builds the identity string for this profile.
    ///
    /// Format: `providerName:P|authenticationType:A|database:D|server:S|user:U`,
    /// components after the provider sorted by name. [`IdentityScope::Full`]
    /// adds the remaining non-empty options in the same sorted order.
    #[must_use]
    pub fn connection_info_id(&self, scope: IdentityScope) -> String {
        let mut components: BTreeMap<String, String> = BTreeMap::new();
        components.insert(
            "authenticationType".to_string(),
            self.authentication_type.as_str().to_string(),
        );
        components.insert(
            "database".to_string(),
            self.database_name.clone().unwrap_or_default(),
        );
        components.insert("server".to_string(), self.server_name.clone());
        components.insert("user".to_string(), self.user_name.clone().unwrap_or_default());

        if scope == IdentityScope::Full {
            for (key, value) in &self.options {
                if key == PASSWORD_OPTION || IDENTITY_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                let rendered = match value {
                    Value::Null => continue,
                    Value::String(s) if s.is_empty() => continue,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                components.insert(key.clone(), rendered);
            }
        }

        let mut id = format!("{PROVIDER_PROPERTY}{NAME_VALUE_SEPARATOR}{}", self.provider_name);
        for (key, value) in components {
            id.push(ID_SEPARATOR);
            id.push_str(&key);
            id.push(NAME_VALUE_SEPARATOR);
            id.push_str(&value);
        }
        id
    }

    /// Returns true unless the authentication scheme never takes a password
    #[must_use]
    pub fn is_password_required(&self) -> bool {
        match self.authentication_type {
            AuthenticationType::Password => true,
            AuthenticationType::DstsAuth => self.azure_account.is_none(),
            AuthenticationType::Integrated
            | AuthenticationType::AzureMfa
            | AuthenticationType::AzureMfaAndUser
            | AuthenticationType::None => false,
        }
    }

    /// Returns true if both profiles sit in the same group, by id or by
    /// case-insensitive full name. Full names only decide when at least one
    /// side carries one.
    #[must_use]
    pub fn same_group(&self, other: &Self) -> bool {
        self.group_id == other.group_id
            || ((self.group_full_name.is_some() || other.group_full_name.is_some())
                && same_group_name(
                    self.group_full_name.as_deref(),
                    other.group_full_name.as_deref(),
                ))
    }

    /// Back-fills the standard fields a connection attempt expects
    pub fn fill_defaults(&mut self) {
        if self.database_name.is_none() {
            self.database_name = Some(String::new());
        }
        if self.user_name.is_none() {
            self.user_name = Some(String::new());
        }
        self.options
            .entry(PASSWORD_OPTION.to_string())
            .or_insert_with(|| Value::String(String::new()));
    }
}
