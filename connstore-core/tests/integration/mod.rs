mod credential_migration;
mod group_management;
mod persistence_roundtrip;
mod recent_connections;

use std::sync::Arc;

use connstore_core::{
    ConnectionProfile, ConnectionStore, CredentialBroker, JsonProfileConfig, JsonStateStore,
    MemorySecretStore, StoreSettings,
};

/// A store over in-memory collaborators, with the secret store exposed
pub struct Harness {
    pub store: ConnectionStore,
    pub secrets: Arc<MemorySecretStore>,
}

pub fn harness(settings: StoreSettings) -> Harness {
    let secrets = Arc::new(MemorySecretStore::new());
    let store = ConnectionStore::new(
        Arc::new(JsonProfileConfig::in_memory()),
        CredentialBroker::new(secrets.clone(), &settings.credentials),
        Arc::new(JsonStateStore::in_memory()),
        Arc::new(settings),
    );
    Harness { store, secrets }
}

pub fn mssql(name: &str, server: &str) -> ConnectionProfile {
    ConnectionProfile::new("MSSQL", server)
        .with_connection_name(name)
        .with_database("master")
        .with_user("sa")
}
