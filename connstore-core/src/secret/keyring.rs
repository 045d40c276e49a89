//! System keyring storage via `secret-tool` (libsecret Secret Service API)
//!
//! Works with GNOME Keyring, KDE Wallet and any other Secret Service
//! provider. Every entry carries an `application` attribute so the store only
//! ever sees its own secrets.

use std::process::Stdio;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{SecretError, SecretResult};

use super::backend::SecretStore;

/// Default `application` attribute for keyring entries
pub const DEFAULT_APP_ID: &str = "connstore";

/// Checks whether the `secret-tool` binary is available on the system
pub async fn is_secret_tool_available() -> bool {
    Command::new("secret-tool")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Secret store backed by the system keyring
#[derive(Debug, Clone)]
pub struct KeyringSecretStore {
    app_id: String,
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        Self::new(DEFAULT_APP_ID)
    }
}

impl KeyringSecretStore {
    /// Creates a keyring store tagging entries with `app_id`
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }

    /// Returns the `application` attribute value
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

#[async_trait]
impl SecretStore for KeyringSecretStore {
    async fn read_secret(&self, key: &str) -> SecretResult<Option<SecretString>> {
        let output = Command::new("secret-tool")
            .args(["lookup", "application", &self.app_id, "key", key])
            .output()
            .await
            .map_err(|e| SecretError::LibSecret(format!("Failed to run secret-tool: {e}")))?;

        // secret-tool exits non-zero when nothing matches
        if !output.status.success() {
            return Ok(None);
        }

        let value = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(SecretString::from(value)))
        }
    }

    async fn save_secret(&self, key: &str, value: &SecretString) -> SecretResult<bool> {
        if !is_secret_tool_available().await {
            return Err(SecretError::BackendUnavailable(
                "secret-tool not found. Install libsecret-tools.".into(),
            ));
        }

        let label = format!("{} credential", self.app_id);
        let mut child = Command::new("secret-tool")
            .args([
                "store",
                "--label",
                &label,
                "application",
                &self.app_id,
                "key",
                key,
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SecretError::LibSecret(format!("Failed to spawn secret-tool: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(value.expose_secret().as_bytes())
                .await
                .map_err(|e| SecretError::LibSecret(format!("Failed to write secret: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SecretError::LibSecret(format!("Failed to wait for secret-tool: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SecretError::StoreFailed(format!(
                "secret-tool store failed: {stderr}"
            )));
        }

        debug!(key, "Stored secret in system keyring");
        Ok(true)
    }

    async fn delete_secret(&self, key: &str) -> SecretResult<bool> {
        if self.read_secret(key).await?.is_none() {
            return Ok(false);
        }

        let output = Command::new("secret-tool")
            .args(["clear", "application", &self.app_id, "key", key])
            .output()
            .await
            .map_err(|e| SecretError::LibSecret(format!("Failed to run secret-tool: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SecretError::DeleteFailed(format!(
                "secret-tool clear failed: {stderr}"
            )));
        }

        Ok(true)
    }

    fn backend_id(&self) -> &'static str {
        "libsecret"
    }
}
