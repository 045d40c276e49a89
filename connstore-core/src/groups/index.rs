//! Bidirectional group id / full name cache
//!
//! The index is a cache over the persisted groups, never the source of
//! truth. It is not invalidated when groups change; callers rebuild it when a
//! lookup misses, so a rename done elsewhere can be served stale until then.

use std::collections::HashMap;

use tracing::debug;

use crate::error::ConfigResult;
use crate::models::{GroupRecord, normalize_group_name};

use super::tree::GroupTree;

/// Two-way map between group ids and full names.
///
/// Name keys are case-insensitive: they are stored upper-cased, and the bare
/// separator maps to the empty root name.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    names_by_id: HashMap<String, String>,
    ids_by_name: HashMap<String, String>,
    rebuilds: usize,
}

impl GroupIndex {
    /// Creates an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id <-> full_name`
    pub fn record_mapping(&mut self, id: &str, full_name: &str) {
        if !id.is_empty() {
            self.names_by_id
                .insert(id.to_string(), full_name.to_string());
        }
        self.ids_by_name
            .insert(normalize_group_name(Some(full_name)), id.to_string());
    }

    /// Returns the full name recorded for `id`
    #[must_use]
    pub fn lookup_name_by_id(&self, id: &str) -> Option<&str> {
        self.names_by_id.get(id).map(String::as_str)
    }

    /// Returns the id recorded for `full_name`, compared case-insensitively
    #[must_use]
    pub fn lookup_id_by_name(&self, full_name: &str) -> Option<&str> {
        self.ids_by_name
            .get(&normalize_group_name(Some(full_name)))
            .map(String::as_str)
    }

    /// Records every node of a built tree
    pub fn record_tree(&mut self, tree: &GroupTree) {
        for (id, full_name) in tree.mappings() {
            self.record_mapping(id, full_name);
        }
    }

    /// Replaces the contents with the mappings of `groups`.
    ///
    /// # Errors
    ///
    /// Returns an error if the group hierarchy is too deep to build.
    pub fn rebuild(&mut self, groups: &[GroupRecord]) -> ConfigResult<()> {
        let tree = GroupTree::build(groups, None)?;
        self.clear();
        self.record_tree(&tree);
        self.rebuilds += 1;
        debug!(
            groups = tree.len(),
            rebuilds = self.rebuilds,
            "Rebuilt group index"
        );
        Ok(())
    }

    /// Removes every mapping
    pub fn clear(&mut self) {
        self.names_by_id.clear();
        self.ids_by_name.clear();
    }

    /// Number of ids recorded
    #[must_use]
    pub fn len(&self) -> usize {
        self.names_by_id.len()
    }

    /// Returns true if nothing is recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names_by_id.is_empty()
    }

    /// Number of completed rebuilds
    #[must_use]
    pub const fn rebuild_count(&self) -> usize {
        self.rebuilds
    }
}
