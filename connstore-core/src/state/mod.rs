//! Process state storage
//!
//! Small string values that live across process restarts but are not user
//! configuration, such as the recent connections snapshot. Writers register a
//! hook that runs at the "about to persist" checkpoint instead of writing on
//! every change.

mod json;

pub use json::JsonStateStore;

use serde::{Deserialize, Serialize};

/// Scope a state value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageScope {
    /// Shared by every profile and workspace of the application
    Application,
    /// Per user profile
    Profile,
    /// Per workspace
    Workspace,
}

impl StorageScope {
    /// Returns the scope name used in persisted documents
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Profile => "profile",
            Self::Workspace => "workspace",
        }
    }
}

/// Where a value should roam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageTarget {
    /// Follows the user across machines
    User,
    /// Stays on this machine
    Machine,
}

/// Hook run right before state is persisted. It receives the store so it can
/// write its values without holding a reference to it.
pub type WillSaveHook = Box<dyn Fn(&dyn StateStore) + Send + Sync>;

/// Key/value store for process state
pub trait StateStore: Send + Sync {
    /// Returns the value for `key` in `scope`, or `default`
    fn get(&self, key: &str, scope: StorageScope, default: &str) -> String;

    /// Stores `value` for `key` in `scope`
    fn store(&self, key: &str, value: &str, scope: StorageScope, target: StorageTarget);

    /// Registers a hook for the "about to persist" checkpoint. Hooks stay
    /// registered for the life of the store and run in registration order.
    fn on_will_save(&self, hook: WillSaveHook);
}
