//! Saved password lookup and legacy credential key migration

use connstore_core::{AuthenticationType, CredentialBroker, LegacyKeyRule, SecretStore, StoreSettings};
use secrecy::{ExposeSecret, SecretString};

use super::{harness, mssql};

#[tokio::test]
async fn test_legacy_key_is_migrated_once() {
    let h = harness(StoreSettings::default());
    let mut profile = mssql("prod", "db01");
    profile.save_password = true;

    let key = h.store.credentials().format_credential_key(&profile, None);
    let legacy = CredentialBroker::legacy_credential_key(&key, &LegacyKeyRule::default());
    assert!(legacy.contains("|applicationName:azdata|"));
    h.secrets
        .save_secret(&legacy, &SecretString::from("old-secret".to_string()))
        .await
        .unwrap();

    let first = h.store.resolve_password(profile.clone()).await.unwrap();
    assert!(first.found);
    assert_eq!(
        first.profile.password().unwrap().expose_secret(),
        "old-secret"
    );
    assert!(h.secrets.contains(&key).await);
    assert!(!h.secrets.contains(&legacy).await);

    let second = h.store.resolve_password(profile).await.unwrap();
    assert!(second.found);
    assert_eq!(h.secrets.len().await, 1);
}

#[tokio::test]
async fn test_other_providers_skip_legacy_lookup() {
    let h = harness(StoreSettings::default());
    let mut profile = connstore_core::ConnectionProfile::new("PGSQL", "db01")
        .with_connection_name("pg")
        .with_user("postgres");
    profile.save_password = true;

    let key = h.store.credentials().format_credential_key(&profile, None);
    let legacy = CredentialBroker::legacy_credential_key(&key, &LegacyKeyRule::default());
    h.secrets
        .save_secret(&legacy, &SecretString::from("old".to_string()))
        .await
        .unwrap();

    let resolution = h.store.resolve_password(profile).await.unwrap();
    assert!(!resolution.found);
    assert!(resolution.profile.password().is_none());
    assert!(h.secrets.contains(&legacy).await);
}

#[tokio::test]
async fn test_profiles_sharing_a_login_target_share_the_secret() {
    let h = harness(StoreSettings::default());
    let mut first = mssql("first name", "db01").with_password("shared");
    first.save_password = true;
    h.store.save_password(&first).await.unwrap();

    let mut second = mssql("second name", "db01");
    second.save_password = true;
    let resolution = h.store.resolve_password(second).await.unwrap();
    assert!(resolution.found);
    assert_eq!(
        resolution.profile.password().unwrap().expose_secret(),
        "shared"
    );
}

#[tokio::test]
async fn test_no_lookup_for_passwordless_auth() {
    let h = harness(StoreSettings::default());
    for auth in [AuthenticationType::AzureMfa, AuthenticationType::None] {
        let mut profile = mssql("p", "db01").with_authentication(auth);
        profile.save_password = true;
        let resolution = h.store.resolve_password(profile).await.unwrap();
        assert!(resolution.found);
    }

    let mut integrated = mssql("p", "db01").with_authentication(AuthenticationType::Integrated);
    integrated.save_password = false;
    assert!(!h.store.resolve_password(integrated).await.unwrap().found);
    assert!(h.secrets.is_empty().await);
}

#[tokio::test]
async fn test_custom_prefix_from_settings() {
    let mut settings = StoreSettings::default();
    settings.credentials.prefix = "acme".to_string();
    let h = harness(settings);
    let key = h.store.credentials().format_credential_key(&mssql("p", "db01"), None);
    assert!(key.starts_with("acme|itemtype:Profile|id:providerName:MSSQL|"));
}
