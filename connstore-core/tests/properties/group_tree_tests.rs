//! Property-based tests for group tree construction

use connstore_core::{GroupRecord, GroupTree, MAX_GROUP_DEPTH, ROOT_GROUP_ID};
use proptest::prelude::*;

// ========== Strategies ==========

/// Groups under the root where each group's parent is an earlier group
fn arb_groups() -> impl Strategy<Value = Vec<GroupRecord>> {
    prop::collection::vec(("[A-Za-z]{1,8}", any::<prop::sample::Index>()), 0..30).prop_map(
        |specs| {
            let mut groups = vec![GroupRecord::root()];
            for (i, (name, parent)) in specs.into_iter().enumerate() {
                let parent_id = groups[parent.index(groups.len())].id.clone();
                groups.push(GroupRecord::with_parent(format!("g{i}"), name, parent_id));
            }
            groups
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn full_names_join_parent_names(groups in arb_groups()) {
        let tree = GroupTree::build(&groups, None).unwrap();
        prop_assert_eq!(tree.len(), groups.len());

        for (index, node) in tree.nodes().iter().enumerate() {
            match tree.parent(index) {
                None => prop_assert_eq!(&node.id, ROOT_GROUP_ID),
                Some(parent) if parent.full_name.is_empty() => {
                    prop_assert_eq!(&node.full_name, &node.name);
                }
                Some(parent) => {
                    prop_assert_eq!(
                        &node.full_name,
                        &format!("{}/{}", parent.full_name, node.name)
                    );
                }
            }
        }
    }

    #[test]
    fn depth_matches_parent_chain(groups in arb_groups()) {
        let tree = GroupTree::build(&groups, None).unwrap();
        for (index, node) in tree.nodes().iter().enumerate() {
            prop_assert!(node.depth <= MAX_GROUP_DEPTH);
            let expected = tree.parent(index).map_or(0, |p| p.depth + 1);
            prop_assert_eq!(node.depth, expected);
        }
    }

    #[test]
    fn every_child_points_back_at_its_parent(groups in arb_groups()) {
        let tree = GroupTree::build(&groups, None).unwrap();
        for (index, node) in tree.nodes().iter().enumerate() {
            for child in &node.children {
                prop_assert_eq!(tree.nodes()[*child].parent, Some(index));
            }
        }
    }
}
