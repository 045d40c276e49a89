//! JSON file backed process state

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};

use super::{StateStore, StorageScope, StorageTarget, WillSaveHook};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateEntry {
    value: String,
    target: StorageTarget,
}

/// Values grouped by scope name
type StateDocument = BTreeMap<String, BTreeMap<String, StateEntry>>;

/// Process state held in memory and optionally persisted to a JSON file.
///
/// Nothing is written until [`persist`](Self::persist) runs; that call is the
/// checkpoint at which registered hooks flush their values.
pub struct JsonStateStore {
    path: Option<PathBuf>,
    values: RwLock<StateDocument>,
    hooks: Mutex<Vec<WillSaveHook>>,
}

impl std::fmt::Debug for JsonStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStateStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Default for JsonStateStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl JsonStateStore {
    /// Creates a store that is never written to disk
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: RwLock::new(StateDocument::new()),
            hooks: Mutex::new(Vec::new()),
        }
    }

    /// Opens the state file at `path`.
    ///
    /// A missing file starts empty. A file that cannot be parsed also starts
    /// empty; it is overwritten on the next [`persist`](Self::persist).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<StateDocument>(&content) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Discarding unreadable state file");
                    StateDocument::new()
                }
            }
        } else {
            StateDocument::new()
        };

        Ok(Self {
            path: Some(path),
            values: RwLock::new(values),
            hooks: Mutex::new(Vec::new()),
        })
    }

    /// Returns the backing file path, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs every registered hook, then writes the state file.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    pub fn persist(&self) -> ConfigResult<()> {
        {
            let hooks = self.hooks.lock().unwrap_or_else(PoisonError::into_inner);
            debug!(hooks = hooks.len(), "Running state will-save hooks");
            for hook in hooks.iter() {
                hook(self as &dyn StateStore);
            }
        }

        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = {
            let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
            serde_json::to_string_pretty(&*values)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Removes the value for `key` in `scope`
    pub fn remove(&self, key: &str, scope: StorageScope) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entries) = values.get_mut(scope.as_str()) {
            entries.remove(key);
        }
    }
}

impl StateStore for JsonStateStore {
    fn get(&self, key: &str, scope: StorageScope, default: &str) -> String {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values
            .get(scope.as_str())
            .and_then(|entries| entries.get(key))
            .map_or_else(|| default.to_string(), |entry| entry.value.clone())
    }

    fn store(&self, key: &str, value: &str, scope: StorageScope, target: StorageTarget) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.entry(scope.as_str().to_string()).or_default().insert(
            key.to_string(),
            StateEntry {
                value: value.to_string(),
                target,
            },
        );
    }

    fn on_will_save(&self, hook: WillSaveHook) {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hook);
    }
}
