//! In-process secret store

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::RwLock;

use crate::error::SecretResult;

use super::backend::SecretStore;

/// Secret store holding secrets in memory for the life of the process
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, SecretString>>,
}

impl MemorySecretStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a secret is stored under `key`
    pub async fn contains(&self, key: &str) -> bool {
        self.secrets.read().await.contains_key(key)
    }

    /// Returns the number of stored secrets
    pub async fn len(&self) -> usize {
        self.secrets.read().await.len()
    }

    /// Returns true if no secrets are stored
    pub async fn is_empty(&self) -> bool {
        self.secrets.read().await.is_empty()
    }

    /// Returns the stored keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.secrets.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for MemorySecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySecretStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn read_secret(&self, key: &str) -> SecretResult<Option<SecretString>> {
        Ok(self.secrets.read().await.get(key).cloned())
    }

    async fn save_secret(&self, key: &str, value: &SecretString) -> SecretResult<bool> {
        self.secrets
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(true)
    }

    async fn delete_secret(&self, key: &str) -> SecretResult<bool> {
        Ok(self.secrets.write().await.remove(key).is_some())
    }

    fn backend_id(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn test_save_read_delete() {
        let store = MemorySecretStore::new();
        assert!(store.read_secret("k").await.unwrap().is_none());

        store
            .save_secret("k", &SecretString::from("v1"))
            .await
            .unwrap();
        store
            .save_secret("k", &SecretString::from("v2"))
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.read_secret("k").await.unwrap().unwrap().expose_secret(),
            "v2"
        );

        assert!(store.delete_secret("k").await.unwrap());
        assert!(!store.delete_secret("k").await.unwrap());
        assert!(store.is_empty().await);
    }
}
