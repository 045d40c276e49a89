//! Group hierarchy editing through the connection store

use connstore_core::{ConfigError, GroupRecord, ROOT_GROUP_ID, StoreSettings};

use super::{Harness, harness, mssql};

async fn add(h: &Harness, name: &str, parent: &str) -> GroupRecord {
    let id = h
        .store
        .save_profile_group(&GroupRecord::with_parent("", name, parent))
        .await
        .unwrap();
    h.store.get_group_from_id(&id).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_tree_reflects_nested_groups_and_members() {
    let h = harness(StoreSettings::default());
    let prod = add(&h, "Prod", ROOT_GROUP_ID).await;
    let eu = add(&h, "EU", &prod.id).await;
    h.store
        .save_profile(mssql("eu-db", "eu01").saved().with_group_id(&eu.id), false, None)
        .await
        .unwrap();

    let tree = h.store.get_connection_profile_groups(false, None).await.unwrap();
    let node = tree.find_by_id(&eu.id).unwrap();
    assert_eq!(node.full_name, "Prod/EU");
    assert_eq!(node.depth, 2);
    assert_eq!(node.connections.len(), 1);
    assert_eq!(node.connections[0].group_full_name.as_deref(), Some("Prod/EU"));
    assert_eq!(tree.find_by_full_name("prod/eu").unwrap().id, eu.id);

    let bare = h.store.get_connection_profile_groups(true, None).await.unwrap();
    assert_eq!(bare.connection_count(), 0);
    assert_eq!(bare.len(), tree.len());
}

#[tokio::test]
async fn test_index_lookups_follow_renames() {
    let h = harness(StoreSettings::default());
    let prod = add(&h, "Prod", ROOT_GROUP_ID).await;

    assert_eq!(
        h.store.group_full_name(&prod.id).await.unwrap().as_deref(),
        Some("Prod")
    );
    assert_eq!(
        h.store.group_id("PROD").await.unwrap().as_deref(),
        Some(prod.id.as_str())
    );
    assert_eq!(
        h.store.group_id("/").await.unwrap().as_deref(),
        Some(ROOT_GROUP_ID)
    );

    let mut renamed = prod.clone();
    renamed.name = "Production".to_string();
    h.store.edit_group(&renamed).await.unwrap();
    assert_eq!(
        h.store.group_id("Production").await.unwrap().as_deref(),
        Some(prod.id.as_str())
    );
    assert!(h.store.group_id("Nowhere").await.unwrap().is_none());
}

#[tokio::test]
async fn test_move_group_and_reject_cycles() {
    let h = harness(StoreSettings::default());
    let a = add(&h, "A", ROOT_GROUP_ID).await;
    let b = add(&h, "B", &a.id).await;
    let c = add(&h, "C", ROOT_GROUP_ID).await;

    let err = h
        .store
        .change_group_id_for_connection_group(&a, &b)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMove(_)));

    let err = h
        .store
        .change_group_id_for_connection_group(&a, &a)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMove(_)));

    h.store
        .change_group_id_for_connection_group(&b, &c)
        .await
        .unwrap();
    let tree = h.store.get_connection_profile_groups(true, None).await.unwrap();
    assert_eq!(tree.find_by_id(&b.id).unwrap().full_name, "C/B");
}

#[tokio::test]
async fn test_sibling_names_are_unique() {
    let h = harness(StoreSettings::default());
    add(&h, "Dev", ROOT_GROUP_ID).await;
    let err = h
        .store
        .save_profile_group(&GroupRecord::with_parent("", "dev", ROOT_GROUP_ID))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Duplicate(_)));
}

#[tokio::test]
async fn test_move_connection_between_groups() {
    let h = harness(StoreSettings::default());
    let a = add(&h, "A", ROOT_GROUP_ID).await;
    let b = add(&h, "B", ROOT_GROUP_ID).await;
    let in_a = h
        .store
        .save_profile(mssql("db", "s1").saved().with_group_id(&a.id), false, None)
        .await
        .unwrap();
    h.store
        .save_profile(mssql("db", "s1").saved().with_group_id(&b.id), false, None)
        .await
        .unwrap();

    assert!(!h.store.can_change_connection_config(&in_a, &b.id).await.unwrap());
    let err = h
        .store
        .change_group_id_for_connection(&in_a, &b.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Duplicate(_)));

    let c = add(&h, "C", ROOT_GROUP_ID).await;
    h.store.change_group_id_for_connection(&in_a, &c.id).await.unwrap();
    let moved = h
        .store
        .get_all_connections_from_config()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.id == in_a.id)
        .unwrap();
    assert_eq!(moved.group_full_name.as_deref(), Some("C"));
}

#[tokio::test]
async fn test_delete_group_cascades_but_keeps_secrets() {
    let h = harness(StoreSettings::default());
    let a = add(&h, "A", ROOT_GROUP_ID).await;
    let nested = add(&h, "Nested", &a.id).await;
    let mut profile = mssql("db", "s1")
        .saved()
        .with_group_id(&nested.id)
        .with_password("pw");
    profile.save_password = true;
    h.store.save_profile(profile, false, None).await.unwrap();
    let outside = h
        .store
        .save_profile(mssql("other", "s2").saved(), false, None)
        .await
        .unwrap();

    h.store.delete_group_from_configuration(&a).await.unwrap();

    assert!(h.store.get_group_from_id(&nested.id).await.unwrap().is_none());
    let remaining = h.store.get_all_connections_from_config().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, outside.id);
    assert_eq!(h.secrets.len().await, 1);
}

#[tokio::test]
async fn test_root_group_is_protected() {
    let h = harness(StoreSettings::default());
    let root = GroupRecord::root();
    let err = h
        .store
        .delete_group_from_configuration(&root)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Validation { .. }));

    let a = add(&h, "A", ROOT_GROUP_ID).await;
    let err = h
        .store
        .change_group_id_for_connection_group(&root, &a)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMove(_)));
}
