//! Secret store trait

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::SecretResult;

/// A key/value vault for secrets
///
/// Keys are opaque strings produced by the
/// [`CredentialBroker`](super::CredentialBroker). Implementations must not log
/// secret values.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Reads the secret stored under `key`
    ///
    /// # Returns
    /// `Ok(None)` when nothing is stored under the key
    ///
    /// # Errors
    /// Returns `SecretError` if the backend cannot be queried
    async fn read_secret(&self, key: &str) -> SecretResult<Option<SecretString>>;

    /// Stores `value` under `key`, replacing any existing secret
    ///
    /// # Errors
    /// Returns `SecretError` if the backend rejects the write
    async fn save_secret(&self, key: &str, value: &SecretString) -> SecretResult<bool>;

    /// Deletes the secret stored under `key`
    ///
    /// # Returns
    /// `true` if a secret was removed
    ///
    /// # Errors
    /// Returns `SecretError` if the backend rejects the delete
    async fn delete_secret(&self, key: &str) -> SecretResult<bool>;

    /// Backend identifier used in logs
    fn backend_id(&self) -> &'static str;
}
