//! Property-based tests for the recent connection list

use connstore_core::{ConnectionProfile, RecentConnections};
use proptest::prelude::*;

// ========== Strategies ==========

/// Small name and server pools so duplicates are common
fn arb_entry() -> impl Strategy<Value = ConnectionProfile> {
    ("[a-d]", "s[1-3]").prop_map(|(name, server)| {
        ConnectionProfile::new("MSSQL", server).with_connection_name(name)
    })
}

fn key(profile: &ConnectionProfile) -> (String, String) {
    (profile.name().to_string(), profile.server_name.clone())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn list_never_exceeds_capacity(
        entries in prop::collection::vec(arb_entry(), 0..40),
        capacity in 1usize..10,
    ) {
        let mut recent = RecentConnections::new();
        for entry in &entries {
            recent.add(entry, capacity);
            prop_assert!(recent.len() <= capacity);
        }
    }

    #[test]
    fn entries_are_unique_and_latest_first(
        entries in prop::collection::vec(arb_entry(), 1..40),
    ) {
        let mut recent = RecentConnections::new();
        for entry in &entries {
            recent.add(entry, 25);
        }

        let keys: Vec<_> = recent.entries().iter().map(key).collect();
        let mut deduped = keys.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), keys.len());

        let last = entries.last().map(key);
        prop_assert_eq!(keys.first().cloned(), last);
    }

    #[test]
    fn snapshot_restores_same_order(
        entries in prop::collection::vec(arb_entry(), 0..20),
    ) {
        let mut recent = RecentConnections::new();
        for entry in &entries {
            recent.add(entry, 25);
        }
        let restored = RecentConnections::from_snapshot(&recent.to_snapshot().unwrap());
        let before: Vec<_> = recent.entries().iter().map(key).collect();
        let after: Vec<_> = restored.entries().iter().map(key).collect();
        prop_assert_eq!(before, after);
    }
}
