//! Profiles, settings and recent connections survive a restart

use std::sync::Arc;

use connstore_core::{
    ConfigManager, ConnectionStore, CredentialBroker, JsonProfileConfig, JsonStateStore,
    MemorySecretStore, RECENT_CONNECTIONS_STATE_KEY, StateStore, StorageScope, StorageTarget,
};
use secrecy::ExposeSecret;
use tempfile::TempDir;

use super::mssql;

struct Opened {
    store: ConnectionStore,
    state: Arc<JsonStateStore>,
}

fn open(manager: &ConfigManager, secrets: &Arc<MemorySecretStore>) -> Opened {
    let settings = manager.load_settings().unwrap();
    let config = Arc::new(JsonProfileConfig::open(manager.profiles_path()).unwrap());
    let state = Arc::new(JsonStateStore::open(manager.state_path()).unwrap());
    let store = ConnectionStore::new(
        config,
        CredentialBroker::new(secrets.clone(), &settings.credentials),
        state.clone(),
        Arc::new(settings),
    );
    Opened { store, state }
}

#[tokio::test]
async fn test_restart_restores_profiles_and_recent_list() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(dir.path().join("connstore"));
    manager.ensure_config_dir().unwrap();
    std::fs::write(
        manager.settings_path(),
        "[connections]\nmax_recent_connections = 2\n\n[credentials]\nprefix = \"acme\"\n",
    )
    .unwrap();
    let secrets = Arc::new(MemorySecretStore::new());

    {
        let opened = open(&manager, &secrets);
        let mut profile = mssql("prod", "db01").saved().with_password("hunter2");
        profile.save_password = true;
        profile.group_full_name = Some("Team/Prod".to_string());
        opened.store.save_profile(profile.clone(), false, None).await.unwrap();

        opened.store.add_recent_connection(&mssql("one", "s1")).await.unwrap();
        opened.store.add_recent_connection(&mssql("two", "s2")).await.unwrap();
        opened.store.add_recent_connection(&profile).await.unwrap();
        opened.state.persist().unwrap();
    }

    for path in [manager.profiles_path(), manager.state_path()] {
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("hunter2"), "{} leaks a password", path.display());
    }
    let keys = secrets.keys().await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("acme|itemtype:Profile|"));

    let reopened = open(&manager, &secrets);
    let recent = reopened.store.get_recently_used_connections(None).await.unwrap();
    let names: Vec<_> = recent.iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["prod", "two"]);
    assert_eq!(recent[0].group_full_name.as_deref(), Some("Team/Prod"));
    assert!(recent[0].group_id.is_some());

    let stored = reopened.store.get_all_connections_from_config().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].password().is_none());

    let resolved = reopened.store.resolve_password(stored[0].clone()).await.unwrap();
    assert!(resolved.found);
    assert_eq!(resolved.profile.password().unwrap().expose_secret(), "hunter2");
}

#[tokio::test]
async fn test_unreadable_recent_snapshot_starts_empty() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(dir.path().to_path_buf());
    let secrets = Arc::new(MemorySecretStore::new());

    {
        let state = JsonStateStore::open(manager.state_path()).unwrap();
        state.store(
            RECENT_CONNECTIONS_STATE_KEY,
            "{not a list",
            StorageScope::Application,
            StorageTarget::Machine,
        );
        state.persist().unwrap();
    }

    let opened = open(&manager, &secrets);
    assert!(
        opened
            .store
            .get_recently_used_connections(None)
            .await
            .unwrap()
            .is_empty()
    );

    opened.store.add_recent_connection(&mssql("fresh", "s1")).await.unwrap();
    opened.state.persist().unwrap();
    let snapshot = opened
        .state
        .get(RECENT_CONNECTIONS_STATE_KEY, StorageScope::Application, "[]");
    assert!(snapshot.contains("fresh"));
}
