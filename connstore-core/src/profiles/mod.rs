//! Persistent profile configuration
//!
//! [`ProfileConfig`] is the durable home of named profiles and their groups.
//! The connection store never touches the storage format; it only calls the
//! operations below. [`JsonProfileConfig`] is the bundled implementation.

mod json;

pub use json::JsonProfileConfig;

use async_trait::async_trait;

use crate::error::ConfigResult;
use crate::models::{ConnectionProfile, GroupRecord, IdentityScope};

/// Decides whether two profiles are the same saved entry.
///
/// Called as `matcher(existing, candidate)`.
pub type ProfileMatcher = dyn Fn(&ConnectionProfile, &ConnectionProfile) -> bool + Send + Sync;

/// Matcher used when the caller supplies none: equal ids when both profiles
/// have one, otherwise equal connection name, full identity and group id.
#[must_use]
pub fn default_matcher(existing: &ConnectionProfile, candidate: &ConnectionProfile) -> bool {
    if let (Some(a), Some(b)) = (&existing.id, &candidate.id) {
        return a == b;
    }
    existing.connection_name == candidate.connection_name
        && existing.group_id == candidate.group_id
        && existing.connection_info_id(IdentityScope::Full)
            == candidate.connection_info_id(IdentityScope::Full)
}

/// Durable storage of named profiles and groups
#[async_trait]
pub trait ProfileConfig: Send + Sync {
    /// Adds `profile`, or replaces the stored profile `matcher` accepts.
    /// Returns the stored form carrying its assigned id and group.
    ///
    /// # Errors
    ///
    /// Returns an error if the target group is unknown or the write fails.
    async fn add_connection(
        &self,
        profile: &ConnectionProfile,
        matcher: Option<&ProfileMatcher>,
    ) -> ConfigResult<ConnectionProfile>;

    /// Returns true if saving `profile` would duplicate a different stored
    /// profile in the same group
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read.
    async fn is_duplicate_edit(
        &self,
        profile: &ConnectionProfile,
        matcher: Option<&ProfileMatcher>,
    ) -> ConfigResult<bool>;

    /// Returns every stored profile
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read.
    async fn get_connections(&self, flatten: bool) -> ConfigResult<Vec<ConnectionProfile>>;

    /// Returns every group record
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read.
    async fn get_all_groups(&self) -> ConfigResult<Vec<GroupRecord>>;

    /// Adds a group and returns its id
    ///
    /// # Errors
    ///
    /// Returns an error for an empty name, an unknown parent or a sibling
    /// with the same name.
    async fn add_group(&self, group: &GroupRecord) -> ConfigResult<String>;

    /// Updates name, parent, color and description of an existing group
    ///
    /// # Errors
    ///
    /// Returns an error if the group is unknown or the change is invalid.
    async fn edit_group(&self, group: &GroupRecord) -> ConfigResult<()>;

    /// Deletes a stored profile
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no stored profile matches.
    async fn delete_connection(&self, profile: &ConnectionProfile) -> ConfigResult<()>;

    /// Deletes a group with its subgroups and profiles
    ///
    /// # Errors
    ///
    /// Returns an error if the group is unknown or is the root group.
    async fn delete_group(&self, group: &GroupRecord) -> ConfigResult<()>;

    /// Moves a profile to another group
    ///
    /// # Errors
    ///
    /// Returns an error if either side is unknown or the move would
    /// duplicate a profile in the target group.
    async fn change_group_id_for_connection(
        &self,
        profile: &ConnectionProfile,
        new_group_id: &str,
    ) -> ConfigResult<()>;

    /// Moves `source` under `target`
    ///
    /// # Errors
    ///
    /// Returns an error if either group is unknown or the move would create
    /// a cycle.
    async fn change_group_id_for_connection_group(
        &self,
        source: &GroupRecord,
        target: &GroupRecord,
    ) -> ConfigResult<()>;

    /// Returns true if `profile` can move to `new_group_id` without
    /// duplicating a profile there
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read.
    async fn can_change_connection_config(
        &self,
        profile: &ConnectionProfile,
        new_group_id: &str,
    ) -> ConfigResult<bool>;
}
