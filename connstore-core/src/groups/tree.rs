//! Group tree construction
//!
//! Groups are persisted as a flat list with parent ids. [`GroupTree::build`]
//! turns that list into an index-linked arena: every node knows its parent
//! and children by position, so walking the tree never chases owning
//! pointers and a malformed parent chain cannot loop.

use std::collections::{HashMap, HashSet};

use crate::error::{ConfigError, ConfigResult};
use crate::models::{ConnectionProfile, GroupRecord, join_full_name, normalize_group_name};

/// Deepest nesting accepted before the configuration is treated as corrupt
pub const MAX_GROUP_DEPTH: usize = 64;

/// A group in a built tree
#[derive(Debug, Clone)]
pub struct GroupNode {
    /// Group id
    pub id: String,
    /// Group name
    pub name: String,
    /// Separator-joined names from the top of the tree; empty for the
    /// canonical root group
    pub full_name: String,
    /// Display color
    pub color: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Nesting depth, 0 for top-level groups
    pub depth: usize,
    /// Arena index of the parent node
    pub parent: Option<usize>,
    /// Arena indices of child nodes, in configuration order
    pub children: Vec<usize>,
    /// Member profiles, each stamped with this group's full name
    pub connections: Vec<ConnectionProfile>,
}

/// Arena-backed forest of groups
#[derive(Debug, Clone, Default)]
pub struct GroupTree {
    nodes: Vec<GroupNode>,
    roots: Vec<usize>,
}

impl GroupTree {
    /// Builds the forest rooted at groups without a parent.
    ///
    /// When `connections` is given, each profile is attached to the node whose
    /// id equals its `group_id` after its `group_full_name` is stamped.
    /// Profiles pointing at unknown groups are dropped. Groups whose parent
    /// chain never reaches a top-level group (dangling or cyclic parents) are
    /// left out of the tree.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::GroupDepthExceeded` when nesting goes past
    /// [`MAX_GROUP_DEPTH`].
    pub fn build(
        groups: &[GroupRecord],
        connections: Option<Vec<ConnectionProfile>>,
    ) -> ConfigResult<Self> {
        let mut children_of: HashMap<Option<&str>, Vec<usize>> = HashMap::new();
        for (index, group) in groups.iter().enumerate() {
            children_of
                .entry(group.parent_id.as_deref())
                .or_default()
                .push(index);
        }

        let mut members: HashMap<String, Vec<ConnectionProfile>> = HashMap::new();
        for profile in connections.into_iter().flatten() {
            if let Some(group_id) = profile.group_id.clone() {
                members.entry(group_id).or_default().push(profile);
            }
        }

        let mut tree = Self::default();
        let mut visited: HashSet<usize> = HashSet::new();
        // (record index, parent node index, depth)
        let mut stack: Vec<(usize, Option<usize>, usize)> = children_of
            .get(&None)
            .map(|roots| roots.iter().rev().map(|&r| (r, None, 0)).collect())
            .unwrap_or_default();

        while let Some((record_index, parent, depth)) = stack.pop() {
            if !visited.insert(record_index) {
                continue;
            }
            let record = &groups[record_index];
            if depth >= MAX_GROUP_DEPTH {
                return Err(ConfigError::GroupDepthExceeded {
                    group_id: record.id.clone(),
                    depth,
                });
            }

            let full_name = if record.is_root() {
                String::new()
            } else {
                let parent_full_name = parent.map_or("", |p| tree.nodes[p].full_name.as_str());
                join_full_name(parent_full_name, &record.name)
            };

            let mut connections = members.remove(&record.id).unwrap_or_default();
            for profile in &mut connections {
                profile.group_full_name = (!full_name.is_empty()).then(|| full_name.clone());
            }

            let node_index = tree.nodes.len();
            tree.nodes.push(GroupNode {
                id: record.id.clone(),
                name: record.name.clone(),
                full_name,
                color: record.color.clone(),
                description: record.description.clone(),
                depth,
                parent,
                children: Vec::new(),
                connections,
            });
            match parent {
                Some(p) => tree.nodes[p].children.push(node_index),
                None => tree.roots.push(node_index),
            }

            if let Some(children) = children_of.get(&Some(record.id.as_str())) {
                stack.extend(
                    children
                        .iter()
                        .rev()
                        .map(|&child| (child, Some(node_index), depth + 1)),
                );
            }
        }

        Ok(tree)
    }

    /// Returns the top-level nodes in configuration order
    pub fn roots(&self) -> impl Iterator<Item = &GroupNode> {
        self.roots.iter().map(|&i| &self.nodes[i])
    }

    /// Returns the arena indices of the top-level nodes
    #[must_use]
    pub fn root_indices(&self) -> &[usize] {
        &self.roots
    }

    /// Returns every node in build order (pre-order)
    #[must_use]
    pub fn nodes(&self) -> &[GroupNode] {
        &self.nodes
    }

    /// Returns the node at `index`
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&GroupNode> {
        self.nodes.get(index)
    }

    /// Returns the children of the node at `index`
    pub fn children(&self, index: usize) -> impl Iterator<Item = &GroupNode> {
        self.nodes
            .get(index)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.nodes[i])
    }

    /// Returns the parent of the node at `index`
    #[must_use]
    pub fn parent(&self, index: usize) -> Option<&GroupNode> {
        self.nodes
            .get(index)
            .and_then(|n| n.parent)
            .map(|p| &self.nodes[p])
    }

    /// Finds a node by group id
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&GroupNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Finds a node by case-insensitive full name
    #[must_use]
    pub fn find_by_full_name(&self, full_name: &str) -> Option<&GroupNode> {
        let wanted = normalize_group_name(Some(full_name));
        self.nodes
            .iter()
            .find(|n| normalize_group_name(Some(&n.full_name)) == wanted)
    }

    /// Number of groups in the tree
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no groups
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of attached profiles
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.nodes.iter().map(|n| n.connections.len()).sum()
    }

    /// Returns `(id, full name)` for every node
    pub fn mappings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes
            .iter()
            .map(|n| (n.id.as_str(), n.full_name.as_str()))
    }
}
