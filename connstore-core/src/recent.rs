//! Most recently used connections
//!
//! A bounded, most-recent-first list of profiles. Entries never carry a
//! password; the credential broker owns secrets. The list is loaded once from
//! process state and written back at the state store's persist checkpoint.

use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::models::{ConnectionProfile, IdentityScope};

/// Process state key holding the serialized list
pub const RECENT_CONNECTIONS_STATE_KEY: &str = "recentConnections";

/// Snapshot value used when nothing has been stored yet
pub const EMPTY_SNAPSHOT: &str = "[]";

/// Bounded most-recent-first list of profiles
#[derive(Debug, Clone, Default)]
pub struct RecentConnections {
    entries: Vec<ConnectionProfile>,
}

/// Two entries collide when their name and full identity are equal. Group
/// equality is only required when the incoming profile is a saved one, so an
/// unsaved profile replaces a saved entry from any group.
fn is_same_entry(existing: &ConnectionProfile, incoming: &ConnectionProfile) -> bool {
    existing.connection_name == incoming.connection_name
        && existing.connection_info_id(IdentityScope::Full)
            == incoming.connection_info_id(IdentityScope::Full)
        && (!incoming.save_profile || existing.same_group(incoming))
}

impl RecentConnections {
    /// Creates an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the list from a serialized snapshot.
    ///
    /// An unreadable snapshot yields an empty list.
    #[must_use]
    pub fn from_snapshot(snapshot: &str) -> Self {
        match serde_json::from_str::<Vec<ConnectionProfile>>(snapshot) {
            Ok(entries) => Self {
                entries: entries.iter().map(ConnectionProfile::without_password).collect(),
            },
            Err(e) => {
                warn!(error = %e, "Discarding unreadable recent connections snapshot");
                Self::default()
            }
        }
    }

    /// Serializes the list
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` if serialization fails.
    pub fn to_snapshot(&self) -> ConfigResult<String> {
        serde_json::to_string(&self.entries).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Moves `profile` to the front, dropping the entry it duplicates and
    /// anything past `capacity`
    pub fn add(&mut self, profile: &ConnectionProfile, capacity: usize) {
        let stripped = profile.without_password();
        self.entries.retain(|e| !is_same_entry(e, &stripped));
        self.entries.insert(0, stripped);
        if self.entries.len() > capacity {
            debug!(
                evicted = self.entries.len() - capacity,
                capacity, "Evicting least recent connections"
            );
            self.entries.truncate(capacity);
        }
    }

    /// Removes the entry `profile` duplicates; returns true if one was removed
    pub fn remove(&mut self, profile: &ConnectionProfile) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !is_same_entry(e, profile));
        before != self.entries.len()
    }

    /// Returns a copy of the entries, optionally limited to `providers`
    #[must_use]
    pub fn list(&self, providers: Option<&[String]>) -> Vec<ConnectionProfile> {
        self.entries
            .iter()
            .filter(|e| providers.is_none_or(|p| p.contains(&e.provider_name)))
            .cloned()
            .collect()
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces the entries, keeping their order
    pub fn replace(&mut self, entries: Vec<ConnectionProfile>) {
        self.entries = entries;
    }

    /// Returns the entries, most recent first
    #[must_use]
    pub fn entries(&self) -> &[ConnectionProfile] {
        &self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
