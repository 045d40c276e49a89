//! JSON document backed profile configuration

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ConfigError, ConfigResult};
use crate::groups::MAX_GROUP_DEPTH;
use crate::models::{
    ConnectionProfile, GROUP_NAME_SEPARATOR, GroupRecord, IdentityScope, ROOT_GROUP_ID,
    normalize_group_name, same_group_name, split_full_name,
};

use super::{ProfileConfig, ProfileMatcher, default_matcher};

/// On-disk layout: flat group records and flat profiles
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileDocument {
    #[serde(default)]
    groups: Vec<GroupRecord>,
    #[serde(default)]
    connections: Vec<ConnectionProfile>,
}

fn same_id(a: &ConnectionProfile, b: &ConnectionProfile) -> bool {
    matches!((&a.id, &b.id), (Some(x), Some(y)) if x == y)
}

fn validate_group_name(name: &str) -> ConfigResult<()> {
    if name.is_empty() {
        return Err(ConfigError::Validation {
            field: "name".to_string(),
            reason: "Group name cannot be empty".to_string(),
        });
    }
    if name.contains(GROUP_NAME_SEPARATOR) {
        return Err(ConfigError::Validation {
            field: "name".to_string(),
            reason: format!("Group name cannot contain '{GROUP_NAME_SEPARATOR}'"),
        });
    }
    Ok(())
}

impl ProfileDocument {
    /// Inserts the canonical root group if missing; returns true if inserted
    fn ensure_root(&mut self) -> bool {
        if self.groups.iter().any(GroupRecord::is_root) {
            return false;
        }
        self.groups.insert(0, GroupRecord::root());
        true
    }

    fn group(&self, id: &str) -> Option<&GroupRecord> {
        self.groups.iter().find(|g| g.id == id)
    }

    fn group_mut(&mut self, id: &str) -> Option<&mut GroupRecord> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// Full name of group `id`; `None` for unknown ids and broken parent chains
    fn full_name(&self, id: &str) -> Option<String> {
        let mut names = Vec::new();
        let mut current = self.group(id)?;
        for _ in 0..MAX_GROUP_DEPTH {
            if !current.is_root() {
                names.push(current.name.as_str());
            }
            match current.parent_id.as_deref() {
                None => {
                    names.reverse();
                    return Some(names.join(GROUP_NAME_SEPARATOR));
                }
                Some(parent) => current = self.group(parent)?,
            }
        }
        None
    }

    /// Returns true if `candidate` is `ancestor` or sits below it
    fn is_in_subtree(&self, candidate: &str, ancestor: &str) -> bool {
        let mut current = Some(candidate);
        for _ in 0..=MAX_GROUP_DEPTH {
            match current {
                Some(id) if id == ancestor => return true,
                Some(id) => current = self.group(id).and_then(|g| g.parent_id.as_deref()),
                None => return false,
            }
        }
        false
    }

    fn subtree_ids(&self, id: &str) -> HashSet<String> {
        self.groups
            .iter()
            .filter(|g| self.is_in_subtree(&g.id, id))
            .map(|g| g.id.clone())
            .collect()
    }

    fn sibling_named(
        &self,
        parent_id: Option<&str>,
        name: &str,
        exclude_id: Option<&str>,
    ) -> Option<&GroupRecord> {
        self.groups.iter().find(|g| {
            g.parent_id.as_deref() == parent_id
                && Some(g.id.as_str()) != exclude_id
                && same_group_name(Some(&g.name), Some(name))
        })
    }

    fn find_by_full_name(&self, full_name: &str) -> Option<&GroupRecord> {
        let wanted = normalize_group_name(Some(full_name));
        self.groups.iter().find(|g| {
            self.full_name(&g.id)
                .is_some_and(|n| normalize_group_name(Some(&n)) == wanted)
        })
    }

    /// Returns the id of the group named `full_name`, creating any missing
    /// segments under the root group
    fn ensure_group_path(&mut self, full_name: &str) -> String {
        if let Some(existing) = self.find_by_full_name(full_name) {
            return existing.id.clone();
        }
        let mut parent = ROOT_GROUP_ID.to_string();
        for segment in split_full_name(full_name) {
            let existing = self
                .sibling_named(Some(parent.as_str()), segment, None)
                .map(|g| g.id.clone());
            parent = match existing {
                Some(id) => id,
                None => {
                    let id = Uuid::new_v4().to_string();
                    self.groups.push(GroupRecord::with_parent(
                        id.clone(),
                        segment,
                        parent.as_str(),
                    ));
                    debug!(group_id = %id, name = segment, "Created group for profile");
                    id
                }
            };
        }
        parent
    }

    /// Resolves the group a profile is saved into: its group id, else the
    /// group named by its full name (created on demand), else the root group
    fn resolve_group(&mut self, profile: &ConnectionProfile) -> ConfigResult<String> {
        if let Some(id) = profile.group_id.as_deref().filter(|id| !id.is_empty()) {
            if self.group(id).is_some() {
                return Ok(id.to_string());
            }
            if profile.group_full_name.is_none() {
                return Err(ConfigError::NotFound(format!("group '{id}'")));
            }
        }
        Ok(match profile.group_full_name.as_deref() {
            Some(full_name) => self.ensure_group_path(full_name),
            None => ROOT_GROUP_ID.to_string(),
        })
    }

    /// Like [`resolve_group`](Self::resolve_group) without creating anything
    fn existing_group(&self, profile: &ConnectionProfile) -> Option<String> {
        if let Some(id) = profile.group_id.as_deref().filter(|id| !id.is_empty()) {
            if self.group(id).is_some() {
                return Some(id.to_string());
            }
            if profile.group_full_name.is_none() {
                return None;
            }
        }
        match profile.group_full_name.as_deref() {
            Some(full_name) => self.find_by_full_name(full_name).map(|g| g.id.clone()),
            None => Some(ROOT_GROUP_ID.to_string()),
        }
    }

    /// Returns true if a stored profile other than `profile` (as decided by
    /// `is_self`) lives in `group_id` with the same name and full identity
    fn has_twin(
        &self,
        profile: &ConnectionProfile,
        group_id: &str,
        is_self: impl Fn(&ConnectionProfile) -> bool,
    ) -> bool {
        let identity = profile.connection_info_id(IdentityScope::Full);
        self.connections.iter().any(|c| {
            !is_self(c)
                && c.group_id.as_deref() == Some(group_id)
                && c.connection_name == profile.connection_name
                && c.connection_info_id(IdentityScope::Full) == identity
        })
    }

    fn position_of(&self, profile: &ConnectionProfile) -> Option<usize> {
        if profile.id.is_some() {
            self.connections.iter().position(|c| same_id(c, profile))
        } else {
            self.connections
                .iter()
                .position(|c| default_matcher(c, profile))
        }
    }

    /// Refreshes `group_full_name` from the current group records
    fn stamp(&self, profile: &mut ConnectionProfile) {
        profile.group_full_name = profile
            .group_id
            .as_deref()
            .and_then(|id| self.full_name(id))
            .filter(|n| !n.is_empty());
    }
}

/// Profile configuration kept in memory and written through to a JSON file.
///
/// Without a path it behaves as a purely in-memory configuration.
#[derive(Debug)]
pub struct JsonProfileConfig {
    path: Option<PathBuf>,
    document: RwLock<ProfileDocument>,
}

impl Default for JsonProfileConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl JsonProfileConfig {
    /// Creates an empty configuration that is never written to disk
    #[must_use]
    pub fn in_memory() -> Self {
        let mut document = ProfileDocument::default();
        document.ensure_root();
        Self {
            path: None,
            document: RwLock::new(document),
        }
    }

    /// Loads the configuration at `path`; a missing file starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let mut document = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str::<ProfileDocument>(&content)
                .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?
        } else {
            ProfileDocument::default()
        };
        if document.ensure_root() {
            debug!(path = %path.display(), "Added root group to profile configuration");
        }
        Ok(Self {
            path: Some(path),
            document: RwLock::new(document),
        })
    }

    /// Returns the backing file path, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn write(&self, document: &ProfileDocument) -> ConfigResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileConfig for JsonProfileConfig {
    async fn add_connection(
        &self,
        profile: &ConnectionProfile,
        matcher: Option<&ProfileMatcher>,
    ) -> ConfigResult<ConnectionProfile> {
        let fallback: &ProfileMatcher = &default_matcher;
        let matcher = matcher.unwrap_or(fallback);

        let mut doc = self.document.write().await;
        let group_id = doc.resolve_group(profile)?;
        let mut stored = profile.clone();
        stored.group_id = Some(group_id);
        stored.save_profile = true;
        doc.stamp(&mut stored);

        match doc.connections.iter().position(|c| matcher(c, &stored)) {
            Some(index) => {
                stored.id = doc.connections[index]
                    .id
                    .clone()
                    .or_else(|| Some(Uuid::new_v4().to_string()));
                doc.connections[index] = stored.clone();
            }
            None => {
                let requested = stored.id.take().filter(|id| {
                    doc.connections
                        .iter()
                        .all(|c| c.id.as_deref() != Some(id.as_str()))
                });
                stored.id = Some(requested.unwrap_or_else(|| Uuid::new_v4().to_string()));
                doc.connections.push(stored.clone());
            }
        }

        self.write(&doc).await?;
        info!(
            profile_id = ?stored.id,
            group_id = ?stored.group_id,
            "Saved connection profile"
        );
        Ok(stored)
    }

    async fn is_duplicate_edit(
        &self,
        profile: &ConnectionProfile,
        matcher: Option<&ProfileMatcher>,
    ) -> ConfigResult<bool> {
        let doc = self.document.read().await;
        let Some(group_id) = doc.existing_group(profile) else {
            return Ok(false);
        };
        let is_self = |c: &ConnectionProfile| {
            matcher.map_or_else(|| same_id(c, profile), |m| m(c, profile))
        };
        Ok(doc.has_twin(profile, &group_id, is_self))
    }

    async fn get_connections(&self, _flatten: bool) -> ConfigResult<Vec<ConnectionProfile>> {
        let doc = self.document.read().await;
        Ok(doc
            .connections
            .iter()
            .cloned()
            .map(|mut c| {
                doc.stamp(&mut c);
                c
            })
            .collect())
    }

    async fn get_all_groups(&self) -> ConfigResult<Vec<GroupRecord>> {
        Ok(self.document.read().await.groups.clone())
    }

    async fn add_group(&self, group: &GroupRecord) -> ConfigResult<String> {
        let name = group.name.trim();
        validate_group_name(name)?;

        let mut doc = self.document.write().await;
        if let Some(parent) = group.parent_id.as_deref()
            && doc.group(parent).is_none()
        {
            return Err(ConfigError::NotFound(format!("parent group '{parent}'")));
        }
        if doc
            .sibling_named(group.parent_id.as_deref(), name, None)
            .is_some()
        {
            return Err(ConfigError::Duplicate(format!(
                "group '{name}' already exists here"
            )));
        }

        let id = if !group.id.is_empty() && doc.group(&group.id).is_none() {
            group.id.clone()
        } else {
            Uuid::new_v4().to_string()
        };
        doc.groups.push(GroupRecord {
            id: id.clone(),
            name: name.to_string(),
            ..group.clone()
        });

        self.write(&doc).await?;
        info!(group_id = %id, name, "Added group");
        Ok(id)
    }

    async fn edit_group(&self, group: &GroupRecord) -> ConfigResult<()> {
        let name = group.name.trim();
        validate_group_name(name)?;

        let mut doc = self.document.write().await;
        let existing = doc
            .group(&group.id)
            .cloned()
            .ok_or_else(|| ConfigError::NotFound(format!("group '{}'", group.id)))?;

        if existing.is_root() && (name != existing.name || group.parent_id.is_some()) {
            return Err(ConfigError::Validation {
                field: "id".to_string(),
                reason: "The root group cannot be renamed or moved".to_string(),
            });
        }
        if group.parent_id != existing.parent_id
            && let Some(parent) = group.parent_id.as_deref()
        {
            if doc.group(parent).is_none() {
                return Err(ConfigError::NotFound(format!("parent group '{parent}'")));
            }
            if doc.is_in_subtree(parent, &group.id) {
                return Err(ConfigError::InvalidMove(format!(
                    "group '{}' cannot move into its own subtree",
                    group.id
                )));
            }
        }
        if doc
            .sibling_named(group.parent_id.as_deref(), name, Some(&group.id))
            .is_some()
        {
            return Err(ConfigError::Duplicate(format!(
                "group '{name}' already exists here"
            )));
        }

        if let Some(record) = doc.group_mut(&group.id) {
            record.name = name.to_string();
            record.parent_id.clone_from(&group.parent_id);
            record.color.clone_from(&group.color);
            record.description.clone_from(&group.description);
        }

        self.write(&doc).await?;
        info!(group_id = %group.id, name, "Updated group");
        Ok(())
    }

    async fn delete_connection(&self, profile: &ConnectionProfile) -> ConfigResult<()> {
        let mut doc = self.document.write().await;
        let index = doc
            .position_of(profile)
            .ok_or_else(|| ConfigError::NotFound(format!("connection '{}'", profile.name())))?;
        let removed = doc.connections.remove(index);

        self.write(&doc).await?;
        info!(profile_id = ?removed.id, "Deleted connection profile");
        Ok(())
    }

    async fn delete_group(&self, group: &GroupRecord) -> ConfigResult<()> {
        let mut doc = self.document.write().await;
        let Some(record) = doc.group(&group.id) else {
            return Err(ConfigError::NotFound(format!("group '{}'", group.id)));
        };
        if record.is_root() {
            return Err(ConfigError::Validation {
                field: "id".to_string(),
                reason: "The root group cannot be deleted".to_string(),
            });
        }

        let doomed = doc.subtree_ids(&group.id);
        doc.groups.retain(|g| !doomed.contains(&g.id));
        let before = doc.connections.len();
        doc.connections
            .retain(|c| c.group_id.as_ref().is_none_or(|id| !doomed.contains(id)));
        let removed_connections = before - doc.connections.len();

        self.write(&doc).await?;
        info!(
            group_id = %group.id,
            groups = doomed.len(),
            connections = removed_connections,
            "Deleted group"
        );
        Ok(())
    }

    async fn change_group_id_for_connection(
        &self,
        profile: &ConnectionProfile,
        new_group_id: &str,
    ) -> ConfigResult<()> {
        let mut doc = self.document.write().await;
        if doc.group(new_group_id).is_none() {
            return Err(ConfigError::NotFound(format!("group '{new_group_id}'")));
        }
        let index = doc
            .position_of(profile)
            .ok_or_else(|| ConfigError::NotFound(format!("connection '{}'", profile.name())))?;
        let current = doc.connections[index].clone();
        if doc.has_twin(&current, new_group_id, |c| same_id(c, &current)) {
            return Err(ConfigError::Duplicate(format!(
                "connection '{}' already exists in the target group",
                current.name()
            )));
        }

        let full_name = doc.full_name(new_group_id).filter(|n| !n.is_empty());
        let moved = &mut doc.connections[index];
        moved.group_id = Some(new_group_id.to_string());
        moved.group_full_name = full_name;

        self.write(&doc).await?;
        info!(profile_id = ?current.id, group_id = new_group_id, "Moved connection profile");
        Ok(())
    }

    async fn change_group_id_for_connection_group(
        &self,
        source: &GroupRecord,
        target: &GroupRecord,
    ) -> ConfigResult<()> {
        let mut doc = self.document.write().await;
        let Some(record) = doc.group(&source.id).cloned() else {
            return Err(ConfigError::NotFound(format!("group '{}'", source.id)));
        };
        if doc.group(&target.id).is_none() {
            return Err(ConfigError::NotFound(format!("group '{}'", target.id)));
        }
        if record.is_root() {
            return Err(ConfigError::InvalidMove(
                "The root group cannot be moved".to_string(),
            ));
        }
        if doc.is_in_subtree(&target.id, &source.id) {
            return Err(ConfigError::InvalidMove(format!(
                "group '{}' cannot move under itself or its descendants",
                source.id
            )));
        }
        if doc
            .sibling_named(Some(&target.id), &record.name, Some(&record.id))
            .is_some()
        {
            return Err(ConfigError::Duplicate(format!(
                "group '{}' already exists in the target group",
                record.name
            )));
        }

        if let Some(moved) = doc.group_mut(&source.id) {
            moved.parent_id = Some(target.id.clone());
        }

        self.write(&doc).await?;
        info!(group_id = %source.id, parent_id = %target.id, "Moved group");
        Ok(())
    }

    async fn can_change_connection_config(
        &self,
        profile: &ConnectionProfile,
        new_group_id: &str,
    ) -> ConfigResult<bool> {
        let doc = self.document.read().await;
        Ok(!doc.has_twin(profile, new_group_id, |c| same_id(c, profile)))
    }
}
