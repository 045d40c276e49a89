mod group_tree_tests;
mod identity_tests;
mod recent_tests;
