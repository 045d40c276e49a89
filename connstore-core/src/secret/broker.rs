//! Credential broker
//!
//! Maps profiles to credential keys and moves passwords between profiles and
//! the [`SecretStore`]. Keys have the form
//! `prefix|itemtype:Profile|id:<basic identity>`; the identity deliberately
//! leaves out the password, display name and group so every profile pointing
//! at the same login target shares one secret.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::config::{CredentialSettings, LegacyKeyRule};
use crate::error::SecretResult;
use crate::models::{AuthenticationType, ConnectionProfile, IdentityScope};

use super::backend::SecretStore;

/// Separator between credential key segments
pub const CREDENTIAL_SEPARATOR: char = '|';

/// Prefix of the identity segment
pub const CREDENTIAL_ID_PREFIX: &str = "id:";

/// Prefix of the item type segment
pub const CREDENTIAL_ITEMTYPE_PREFIX: &str = "itemtype:";

/// Item type for saved profile passwords
pub const PROFILE_ITEM_TYPE: &str = "Profile";

/// Outcome of [`CredentialBroker::resolve_password`]
#[derive(Debug, Clone)]
pub struct PasswordResolution {
    /// The profile, with its password filled in when one was found
    pub profile: ConnectionProfile,
    /// Whether the profile is ready to connect as far as credentials go
    pub found: bool,
}

/// Formats credential keys and reads/writes profile passwords
#[derive(Clone)]
pub struct CredentialBroker {
    secrets: Arc<dyn SecretStore>,
    prefix: String,
    legacy_keys: Vec<LegacyKeyRule>,
}

impl std::fmt::Debug for CredentialBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialBroker")
            .field("backend", &self.secrets.backend_id())
            .field("prefix", &self.prefix)
            .field("legacy_keys", &self.legacy_keys)
            .finish()
    }
}

impl CredentialBroker {
    /// Creates a broker over `secrets` using the given key settings
    #[must_use]
    pub fn new(secrets: Arc<dyn SecretStore>, settings: &CredentialSettings) -> Self {
        Self {
            secrets,
            prefix: settings.prefix.clone(),
            legacy_keys: settings.legacy_keys.clone(),
        }
    }

    /// Creates a broker with default key settings
    #[must_use]
    pub fn with_defaults(secrets: Arc<dyn SecretStore>) -> Self {
        Self::new(secrets, &CredentialSettings::default())
    }

    /// Returns the underlying secret store
    #[must_use]
    pub fn secret_store(&self) -> &Arc<dyn SecretStore> {
        &self.secrets
    }

    /// Builds the credential key for `profile`.
    ///
    /// `item_type` defaults to [`PROFILE_ITEM_TYPE`].
    #[must_use]
    pub fn format_credential_key(
        &self,
        profile: &ConnectionProfile,
        item_type: Option<&str>,
    ) -> String {
        let item_type = item_type.unwrap_or(PROFILE_ITEM_TYPE);
        format!(
            "{prefix}{sep}{CREDENTIAL_ITEMTYPE_PREFIX}{item_type}{sep}{CREDENTIAL_ID_PREFIX}{id}",
            prefix = self.prefix,
            sep = CREDENTIAL_SEPARATOR,
            id = profile.connection_info_id(IdentityScope::Basic),
        )
    }

    /// Rewrites a current-format key into the layout described by `rule`
    #[must_use]
    pub fn legacy_credential_key(key: &str, rule: &LegacyKeyRule) -> String {
        let mut parts: Vec<&str> = key.split(CREDENTIAL_SEPARATOR).collect();
        let position = rule.position.min(parts.len());
        parts.insert(position, &rule.segment);
        parts.join(&CREDENTIAL_SEPARATOR.to_string())
    }

    /// Returns true unless the profile's authentication never takes a password
    #[must_use]
    pub fn is_password_required(&self, profile: &ConnectionProfile) -> bool {
        profile.is_password_required()
    }

    /// Fills in a saved password for `profile`.
    ///
    /// Looks the secret up only when the profile asks for password saving,
    /// needs a password and has none. Providers with a legacy key layout get a
    /// second lookup under the old key; a hit there is moved to the current
    /// key so later calls take the direct path.
    ///
    /// # Errors
    ///
    /// Returns `SecretError` if the secret store fails. No retry is made.
    #[instrument(
        skip_all,
        fields(provider = %profile.provider_name, server = %profile.server_name)
    )]
    pub async fn resolve_password(
        &self,
        mut profile: ConnectionProfile,
    ) -> SecretResult<PasswordResolution> {
        if profile.save_password && profile.is_password_required() && !profile.has_password() {
            let key = self.format_credential_key(&profile, Some(PROFILE_ITEM_TYPE));
            if let Some(secret) = non_empty(self.secrets.read_secret(&key).await?) {
                profile.set_password(Some(secret));
                return Ok(PasswordResolution {
                    profile,
                    found: true,
                });
            }

            let found = match self.migrate_legacy_secret(&profile, &key).await? {
                Some(secret) => {
                    profile.set_password(Some(secret));
                    true
                }
                None => false,
            };
            debug!(found, "Resolved saved password");
            return Ok(PasswordResolution { profile, found });
        }

        let found = match profile.authentication_type {
            AuthenticationType::AzureMfa => true,
            AuthenticationType::DstsAuth if profile.azure_account.is_some() => true,
            AuthenticationType::None => true,
            _ => profile.save_password,
        };
        Ok(PasswordResolution { profile, found })
    }

    /// Looks for the secret under every legacy layout that applies to the
    /// profile's provider and moves the first hit to `current_key`.
    async fn migrate_legacy_secret(
        &self,
        profile: &ConnectionProfile,
        current_key: &str,
    ) -> SecretResult<Option<SecretString>> {
        let rules = self
            .legacy_keys
            .iter()
            .filter(|rule| rule.provider == profile.provider_name);

        for rule in rules {
            let legacy_key = Self::legacy_credential_key(current_key, rule);
            let Some(secret) = non_empty(self.secrets.read_secret(&legacy_key).await?) else {
                continue;
            };

            warn!(
                provider = %profile.provider_name,
                "Migrating saved password from legacy credential key"
            );
            self.secrets.save_secret(current_key, &secret).await?;
            self.secrets.delete_secret(&legacy_key).await?;
            return Ok(Some(secret));
        }

        Ok(None)
    }

    /// Stores the profile password if the profile asks for it.
    ///
    /// Returns `true` without touching the store when `save_password` is off
    /// or there is no password to save. Existing secrets are never deleted
    /// here.
    ///
    /// # Errors
    ///
    /// Returns `SecretError` if the secret store rejects the write.
    pub async fn save_password_if_needed(&self, profile: &ConnectionProfile) -> SecretResult<bool> {
        if !profile.save_password {
            return Ok(true);
        }
        self.save_password(profile).await
    }

    /// Stores the profile password under its credential key, overwriting any
    /// existing secret. A profile without a password is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns `SecretError` if the secret store rejects the write.
    pub async fn save_password(&self, profile: &ConnectionProfile) -> SecretResult<bool> {
        let Some(password) = profile.password().filter(|_| profile.has_password()) else {
            return Ok(true);
        };
        let key = self.format_credential_key(profile, None);
        debug!(key = %key, backend = self.secrets.backend_id(), "Saving profile password");
        self.secrets.save_secret(&key, password).await
    }

    /// Deletes the saved password for the profile's login target.
    ///
    /// This is an explicit administrative action; nothing in the store calls
    /// it implicitly, since other profiles may share the secret.
    ///
    /// # Errors
    ///
    /// Returns `SecretError` if the secret store rejects the delete.
    pub async fn delete_password(&self, profile: &ConnectionProfile) -> SecretResult<bool> {
        let key = self.format_credential_key(profile, None);
        self.secrets.delete_secret(&key).await
    }
}

fn non_empty(secret: Option<SecretString>) -> Option<SecretString> {
    secret.filter(|s| !s.expose_secret().is_empty())
}
