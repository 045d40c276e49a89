//! Connection profile group records
//!
//! Groups are stored flat, each pointing at its parent by id. The tree is
//! rebuilt from this flat list on every read (see [`crate::groups`]).

use serde::{Deserialize, Serialize};

/// Separator between group names in a full path name
pub const GROUP_NAME_SEPARATOR: &str = "/";

/// Id of the canonical root group
pub const ROOT_GROUP_ID: &str = "root";

/// Name of the canonical root group
pub const ROOT_GROUP_NAME: &str = "ROOT";

/// A persisted group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Unique id, assigned by the persistent configuration
    pub id: String,
    /// Group name (a single path segment)
    pub name: String,
    /// Parent group id; `None` for top-level groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Display color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GroupRecord {
    /// Creates a top-level group record
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            color: None,
            description: None,
        }
    }

    /// Creates a group record under `parent_id`
    #[must_use]
    pub fn with_parent(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::new(id, name)
        }
    }

    /// Creates the canonical root group
    #[must_use]
    pub fn root() -> Self {
        Self::new(ROOT_GROUP_ID, ROOT_GROUP_NAME)
    }

    /// Returns true for the canonical root group
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.id == ROOT_GROUP_ID && self.parent_id.is_none()
    }
}

/// Normalizes a group full name for comparison and lookup.
///
/// `None`, the empty string and the bare separator all denote the root group
/// and normalize to the empty string. Other names are upper-cased.
#[must_use]
pub fn normalize_group_name(full_name: Option<&str>) -> String {
    match full_name {
        None => String::new(),
        Some(name) if name == GROUP_NAME_SEPARATOR => String::new(),
        Some(name) => name.to_uppercase(),
    }
}

/// Case-insensitive full name comparison
#[must_use]
pub fn same_group_name(a: Option<&str>, b: Option<&str>) -> bool {
    normalize_group_name(a) == normalize_group_name(b)
}

/// Joins a parent full name and a child name
#[must_use]
pub fn join_full_name(parent_full_name: &str, name: &str) -> String {
    if parent_full_name.is_empty() {
        name.to_string()
    } else {
        format!("{parent_full_name}{GROUP_NAME_SEPARATOR}{name}")
    }
}

/// Splits a full name into its non-empty segments
#[must_use]
pub fn split_full_name(full_name: &str) -> Vec<&str> {
    full_name
        .split(GROUP_NAME_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
