//! Recent connection list behavior through the connection store

use connstore_core::{GroupRecord, ROOT_GROUP_ID, StoreSettings};

use super::{harness, mssql};

fn with_capacity(capacity: usize) -> StoreSettings {
    let mut settings = StoreSettings::default();
    settings.connections.max_recent_connections = capacity;
    settings
}

#[tokio::test]
async fn test_reconnecting_moves_entry_to_front() {
    let h = harness(StoreSettings::default());
    h.store.add_recent_connection(&mssql("A", "s1")).await.unwrap();
    h.store.add_recent_connection(&mssql("B", "s2")).await.unwrap();
    h.store.add_recent_connection(&mssql("A", "s1")).await.unwrap();

    let names: Vec<_> = h
        .store
        .get_recently_used_connections(None)
        .await
        .unwrap()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[tokio::test]
async fn test_saved_profiles_in_different_groups_both_kept() {
    let h = harness(StoreSettings::default());
    let g1 = h
        .store
        .save_profile_group(&GroupRecord::with_parent("", "One", ROOT_GROUP_ID))
        .await
        .unwrap();
    let g2 = h
        .store
        .save_profile_group(&GroupRecord::with_parent("", "Two", ROOT_GROUP_ID))
        .await
        .unwrap();

    h.store
        .add_recent_connection(&mssql("A", "s1").saved().with_group_id(&g1))
        .await
        .unwrap();
    h.store
        .add_recent_connection(&mssql("A", "s1").saved().with_group_id(&g2))
        .await
        .unwrap();

    let recent = h.store.get_recently_used_connections(None).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].group_full_name.as_deref(), Some("Two"));
    assert_eq!(recent[1].group_full_name.as_deref(), Some("One"));
}

#[tokio::test]
async fn test_saved_profiles_with_unknown_group_ids_both_kept() {
    let h = harness(StoreSettings::default());
    let first = mssql("A", "s1").saved().with_group_id("g1");
    let second = mssql("A", "s1").saved().with_group_id("g2");

    h.store.add_recent_connection(&first).await.unwrap();
    h.store.add_recent_connection(&second).await.unwrap();

    let recent = h.store.get_recently_used_connections(None).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].group_id.as_deref(), Some("g2"));
    assert_eq!(recent[1].group_id.as_deref(), Some("g1"));
    assert!(recent.iter().all(|p| p.group_full_name.is_none()));

    h.store.add_recent_connection(&first).await.unwrap();
    let recent = h.store.get_recently_used_connections(None).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].group_id.as_deref(), Some("g1"));
}

#[tokio::test]
async fn test_capacity_comes_from_settings() {
    let h = harness(with_capacity(2));
    for name in ["A", "B", "C"] {
        h.store.add_recent_connection(&mssql(name, "s")).await.unwrap();
    }
    let recent = h.store.get_recently_used_connections(None).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].name(), "C");
    assert_eq!(recent[1].name(), "B");
}

#[tokio::test]
async fn test_remove_and_clear() {
    let h = harness(StoreSettings::default());
    h.store.add_recent_connection(&mssql("A", "s1")).await.unwrap();

    assert!(!h.store.remove_recent_connection(&mssql("Z", "s9")).await.unwrap());
    assert!(h.store.remove_recent_connection(&mssql("A", "s1")).await.unwrap());
    assert!(h.store.get_recently_used_connections(None).await.unwrap().is_empty());

    h.store.add_recent_connection(&mssql("B", "s2")).await.unwrap();
    h.store.clear_recently_used();
    assert!(h.store.get_recently_used_connections(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_password_saved_but_not_listed() {
    let h = harness(StoreSettings::default());
    let mut profile = mssql("A", "s1").with_password("hunter2");
    profile.save_password = true;
    h.store.add_recent_connection(&profile).await.unwrap();

    let recent = h.store.get_recently_used_connections(None).await.unwrap();
    assert!(recent[0].password().is_none());
    assert_eq!(h.secrets.len().await, 1);
}
