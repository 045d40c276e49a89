//! Group hierarchy: tree construction and the id / full name index

mod index;
mod tree;

pub use index::GroupIndex;
pub use tree::{GroupNode, GroupTree, MAX_GROUP_DEPTH};
