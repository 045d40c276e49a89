//! Connection store
//!
//! Ties together the profile configuration, the credential broker, the
//! process state store and the settings reader. It owns two pieces of process
//! state: the recent connections list and the group id / full name index.
//!
//! Mutating calls on one store must not overlap. The internal mutexes only
//! exist so the recent list can be shared with the state store's will-save
//! hook; they are never held across an await.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{Instrument, debug, debug_span, info, instrument, warn};

use crate::config::{SettingsReader, max_recent_connections};
use crate::error::{ConfigResult, SecretResult, StoreResult};
use crate::groups::{GroupIndex, GroupTree};
use crate::models::{ConnectionProfile, GroupRecord};
use crate::profiles::{ProfileConfig, ProfileMatcher};
use crate::recent::{EMPTY_SNAPSHOT, RECENT_CONNECTIONS_STATE_KEY, RecentConnections};
use crate::secret::{CredentialBroker, PasswordResolution};
use crate::state::{StateStore, StorageScope, StorageTarget};
use crate::tracing::span_names;

/// Writes the recent list into `state`
fn write_snapshot(recent: &Mutex<RecentConnections>, state: &dyn StateStore) {
    let (snapshot, count) = {
        let recent = recent.lock().unwrap_or_else(PoisonError::into_inner);
        (recent.to_snapshot(), recent.len())
    };
    match snapshot {
        Ok(snapshot) => {
            state.store(
                RECENT_CONNECTIONS_STATE_KEY,
                &snapshot,
                StorageScope::Application,
                StorageTarget::Machine,
            );
            debug!(entries = count, "Stored recent connections snapshot");
        }
        Err(e) => warn!(error = %e, "Failed to serialize recent connections"),
    }
}

fn filter_providers(providers: Option<&[String]>) -> Option<&[String]> {
    providers.filter(|p| !p.is_empty())
}

/// Manages saved profiles, their groups, recent connections and passwords
pub struct ConnectionStore {
    config: Arc<dyn ProfileConfig>,
    credentials: CredentialBroker,
    state: Arc<dyn StateStore>,
    settings: Arc<dyn SettingsReader>,
    recent: Arc<Mutex<RecentConnections>>,
    group_index: Mutex<GroupIndex>,
}

impl std::fmt::Debug for ConnectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionStore")
            .field("credentials", &self.credentials)
            .field("recent", &self.recent_connections().len())
            .field("group_index", &self.index().len())
            .finish_non_exhaustive()
    }
}

impl ConnectionStore {
    /// Creates a store, loading the recent list from `state` and registering
    /// the hook that writes it back at the persist checkpoint.
    ///
    /// A state store serves one connection store. Hooks are never removed
    /// and run in registration order, so when several stores share `state`
    /// the last one created decides the persisted recent list.
    #[must_use]
    pub fn new(
        config: Arc<dyn ProfileConfig>,
        credentials: CredentialBroker,
        state: Arc<dyn StateStore>,
        settings: Arc<dyn SettingsReader>,
    ) -> Self {
        let snapshot = state.get(
            RECENT_CONNECTIONS_STATE_KEY,
            StorageScope::Application,
            EMPTY_SNAPSHOT,
        );
        let recent = Arc::new(Mutex::new(RecentConnections::from_snapshot(&snapshot)));

        let hook_recent = Arc::clone(&recent);
        state.on_will_save(Box::new(move |store: &dyn StateStore| {
            write_snapshot(&hook_recent, store);
        }));

        debug!(
            recent = recent.lock().unwrap_or_else(PoisonError::into_inner).len(),
            "Connection store ready"
        );

        Self {
            config,
            credentials,
            state,
            settings,
            recent,
            group_index: Mutex::new(GroupIndex::new()),
        }
    }

    fn recent_connections(&self) -> MutexGuard<'_, RecentConnections> {
        self.recent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn index(&self) -> MutexGuard<'_, GroupIndex> {
        self.group_index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the credential broker
    #[must_use]
    pub const fn credentials(&self) -> &CredentialBroker {
        &self.credentials
    }

    /// Returns the profile configuration
    #[must_use]
    pub fn config(&self) -> &Arc<dyn ProfileConfig> {
        &self.config
    }

    // ---- profiles ----

    /// Saves `profile` to the configuration when it is marked for saving,
    /// then stores its password when it asks for that.
    ///
    /// The configuration receives a copy without the password unless
    /// `force_write_plaintext` is set. The returned profile carries the id and
    /// group assigned by the configuration, plus the default fields a
    /// connection attempt expects.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the secret store fails.
    #[instrument(
        skip_all,
        fields(provider = %profile.provider_name, save_profile = profile.save_profile)
    )]
    pub async fn save_profile(
        &self,
        mut profile: ConnectionProfile,
        force_write_plaintext: bool,
        matcher: Option<&ProfileMatcher>,
    ) -> StoreResult<ConnectionProfile> {
        let to_save = if force_write_plaintext {
            profile.clone()
        } else {
            profile.without_password()
        };
        if to_save.save_profile {
            let saved = self.config.add_connection(&to_save, matcher).await?;
            profile.id = saved.id;
            profile.group_id = saved.group_id;
            profile.group_full_name = saved.group_full_name;
        }

        self.credentials.save_password_if_needed(&profile).await?;
        profile.fill_defaults();
        Ok(profile)
    }

    /// Stores the profile password if the profile asks for it
    ///
    /// # Errors
    ///
    /// Returns `SecretError` if the secret store rejects the write.
    pub async fn save_password(&self, profile: &ConnectionProfile) -> SecretResult<bool> {
        self.credentials.save_password_if_needed(profile).await
    }

    /// Returns true if saving `profile` would duplicate another saved profile
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read.
    pub async fn is_duplicate_edit(
        &self,
        profile: &ConnectionProfile,
        matcher: Option<&ProfileMatcher>,
    ) -> ConfigResult<bool> {
        self.config.is_duplicate_edit(profile, matcher).await
    }

    /// Returns every saved profile
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read.
    pub async fn get_all_connections_from_config(&self) -> ConfigResult<Vec<ConnectionProfile>> {
        self.config.get_connections(true).await
    }

    /// Deletes a saved profile. Its saved password is left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is unknown or the write fails.
    pub async fn delete_connection_from_configuration(
        &self,
        profile: &ConnectionProfile,
    ) -> ConfigResult<()> {
        self.config.delete_connection(profile).await
    }

    /// Moves a saved profile to another group
    ///
    /// # Errors
    ///
    /// Returns an error if the move is rejected by the configuration.
    pub async fn change_group_id_for_connection(
        &self,
        profile: &ConnectionProfile,
        new_group_id: &str,
    ) -> ConfigResult<()> {
        self.config
            .change_group_id_for_connection(profile, new_group_id)
            .await
    }

    /// Returns true if `profile` can move to `new_group_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read.
    pub async fn can_change_connection_config(
        &self,
        profile: &ConnectionProfile,
        new_group_id: &str,
    ) -> ConfigResult<bool> {
        self.config
            .can_change_connection_config(profile, new_group_id)
            .await
    }

    // ---- passwords ----

    /// Returns true unless the profile's authentication never takes a password
    #[must_use]
    pub fn is_password_required(&self, profile: &ConnectionProfile) -> bool {
        self.credentials.is_password_required(profile)
    }

    /// Fills in the saved password for `profile`
    ///
    /// # Errors
    ///
    /// Returns `SecretError` if the secret store fails.
    pub async fn resolve_password(
        &self,
        profile: ConnectionProfile,
    ) -> SecretResult<PasswordResolution> {
        self.credentials.resolve_password(profile).await
    }

    /// Returns a copy of `profile` without its password
    #[must_use]
    pub fn profile_without_password(&self, profile: &ConnectionProfile) -> ConnectionProfile {
        profile.without_password()
    }

    // ---- recent connections ----

    /// Moves `profile` to the front of the recent list, evicting past the
    /// configured capacity, then stores its password if it asks for that.
    ///
    /// The recent list is updated before the password write; a failed write
    /// does not undo it.
    ///
    /// # Errors
    ///
    /// Returns an error if group resolution or the password write fails.
    #[instrument(skip_all, fields(provider = %profile.provider_name))]
    pub async fn add_recent_connection(&self, profile: &ConnectionProfile) -> StoreResult<()> {
        let capacity = max_recent_connections(self.settings.as_ref());
        let current = self.recent_connections().list(None);
        let resolved = self.resolve_groups(current).await?;
        let len = {
            let mut recent = self.recent_connections();
            recent.replace(resolved);
            recent.add(profile, capacity);
            recent.len()
        };
        debug!(entries = len, capacity, "Added recent connection");

        if profile.save_password {
            self.credentials.save_password(profile).await?;
        }
        Ok(())
    }

    /// Removes `profile` from the recent list; a missing entry is not an error.
    /// Returns true if an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if group resolution fails.
    pub async fn remove_recent_connection(&self, profile: &ConnectionProfile) -> ConfigResult<bool> {
        let current = self.recent_connections().list(None);
        let resolved = self.resolve_groups(current).await?;
        let removed = {
            let mut recent = self.recent_connections();
            recent.replace(resolved);
            recent.remove(profile)
        };
        debug!(removed, "Removed recent connection");
        Ok(removed)
    }

    /// Empties the recent list. Saved passwords are untouched.
    pub fn clear_recently_used(&self) {
        self.recent_connections().clear();
        info!("Cleared recent connections");
    }

    /// Returns the recent list, most recent first, optionally limited to
    /// `providers`. Saved entries come back with both group id and group full
    /// name filled in where the group is known.
    ///
    /// # Errors
    ///
    /// Returns an error if the group index cannot be rebuilt.
    pub async fn get_recently_used_connections(
        &self,
        providers: Option<&[String]>,
    ) -> ConfigResult<Vec<ConnectionProfile>> {
        let entries = self
            .recent_connections()
            .list(filter_providers(providers));
        self.resolve_groups(entries).await
    }

    /// Writes the recent list into the state store now instead of waiting for
    /// the persist checkpoint
    pub fn flush_recent_connections(&self) {
        write_snapshot(&self.recent, self.state.as_ref());
    }

    /// Back-fills group id / full name on saved entries
    async fn resolve_groups(
        &self,
        entries: Vec<ConnectionProfile>,
    ) -> ConfigResult<Vec<ConnectionProfile>> {
        let mut resolved = Vec::with_capacity(entries.len());
        for mut entry in entries {
            if entry.save_profile {
                if entry.group_full_name.is_none()
                    && let Some(group_id) = entry.group_id.clone()
                {
                    entry.group_full_name = self
                        .group_full_name(&group_id)
                        .await?
                        .filter(|n| !n.is_empty());
                }
                if entry.group_id.is_none() {
                    let full_name = entry.group_full_name.clone().unwrap_or_default();
                    entry.group_id = self.group_id(&full_name).await?;
                }
            }
            resolved.push(entry);
        }
        Ok(resolved)
    }

    // ---- groups ----

    /// Builds the group tree. Profiles are attached unless
    /// `without_connections` is set, optionally limited to `providers`.
    /// Every node is recorded in the group index.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or the group
    /// hierarchy is nested too deeply.
    pub async fn get_connection_profile_groups(
        &self,
        without_connections: bool,
        providers: Option<&[String]>,
    ) -> ConfigResult<GroupTree> {
        let span = debug_span!(span_names::GROUP_TREE_BUILD, without_connections);
        self.build_group_tree(without_connections, providers)
            .instrument(span)
            .await
    }

    async fn build_group_tree(
        &self,
        without_connections: bool,
        providers: Option<&[String]>,
    ) -> ConfigResult<GroupTree> {
        let connections = if without_connections {
            None
        } else {
            let mut all = self.config.get_connections(true).await?;
            if let Some(providers) = filter_providers(providers) {
                all.retain(|c| providers.contains(&c.provider_name));
            }
            Some(all)
        };
        let groups = self.config.get_all_groups().await?;
        let tree = GroupTree::build(&groups, connections)?;
        self.index().record_tree(&tree);
        debug!(
            groups = tree.len(),
            connections = tree.connection_count(),
            "Built group tree"
        );
        Ok(tree)
    }

    /// Returns the group record with `group_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read.
    pub async fn get_group_from_id(&self, group_id: &str) -> ConfigResult<Option<GroupRecord>> {
        let groups = self.config.get_all_groups().await?;
        Ok(groups.into_iter().find(|g| g.id == group_id))
    }

    /// Adds a group and returns its id
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration rejects the group.
    pub async fn save_profile_group(&self, group: &GroupRecord) -> ConfigResult<String> {
        self.config.add_group(group).await
    }

    /// Updates an existing group
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration rejects the change.
    pub async fn edit_group(&self, group: &GroupRecord) -> ConfigResult<()> {
        self.config.edit_group(group).await
    }

    /// Deletes a group with its subgroups and profiles
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration rejects the delete.
    pub async fn delete_group_from_configuration(&self, group: &GroupRecord) -> ConfigResult<()> {
        self.config.delete_group(group).await
    }

    /// Moves `source` under `target`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration rejects the move.
    pub async fn change_group_id_for_connection_group(
        &self,
        source: &GroupRecord,
        target: &GroupRecord,
    ) -> ConfigResult<()> {
        self.config
            .change_group_id_for_connection_group(source, target)
            .await
    }

    /// Returns the full name of `group_id`, rebuilding the group index once
    /// on a miss. `None` means the group is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the group index cannot be rebuilt.
    pub async fn group_full_name(&self, group_id: &str) -> ConfigResult<Option<String>> {
        let cached = self.index().lookup_name_by_id(group_id).map(str::to_string);
        if cached.is_some() {
            return Ok(cached);
        }
        self.rebuild_group_index().await?;
        Ok(self.index().lookup_name_by_id(group_id).map(str::to_string))
    }

    /// Returns the id of the group named `full_name` (case-insensitive; the
    /// empty string and `/` name the root group), rebuilding the group index
    /// once on a miss. `None` means the group is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the group index cannot be rebuilt.
    pub async fn group_id(&self, full_name: &str) -> ConfigResult<Option<String>> {
        let cached = self.index().lookup_id_by_name(full_name).map(str::to_string);
        if cached.is_some() {
            return Ok(cached);
        }
        self.rebuild_group_index().await?;
        Ok(self.index().lookup_id_by_name(full_name).map(str::to_string))
    }

    async fn rebuild_group_index(&self) -> ConfigResult<()> {
        let groups = self
            .config
            .get_all_groups()
            .instrument(debug_span!(span_names::GROUP_INDEX_REBUILD))
            .await?;
        self.index().rebuild(&groups)
    }
}
