//! Property-based tests for profile identity and credential keys

use std::sync::Arc;

use connstore_core::{
    AuthenticationType, ConnectionProfile, CredentialBroker, IdentityScope, MemorySecretStore,
};
use proptest::prelude::*;

// ========== Strategies ==========

fn arb_provider() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("MSSQL".to_string()),
        Just("PGSQL".to_string()),
        Just("MySQL".to_string()),
    ]
}

fn arb_auth() -> impl Strategy<Value = AuthenticationType> {
    prop_oneof![
        Just(AuthenticationType::Password),
        Just(AuthenticationType::Integrated),
        Just(AuthenticationType::AzureMfa),
        Just(AuthenticationType::None),
    ]
}

fn arb_profile() -> impl Strategy<Value = ConnectionProfile> {
    (
        arb_provider(),
        "[a-z]{3,10}\\.[a-z]{2,5}",
        proptest::option::of("[a-z_]{1,12}"),
        proptest::option::of("[a-z]{3,8}"),
        arb_auth(),
    )
        .prop_map(|(provider, server, database, user, auth)| {
            let mut profile = ConnectionProfile::new(provider, server).with_authentication(auth);
            profile.database_name = database;
            profile.user_name = user;
            profile
        })
}

fn broker() -> CredentialBroker {
    CredentialBroker::with_defaults(Arc::new(MemorySecretStore::new()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn credential_key_ignores_name_group_and_password(
        profile in arb_profile(),
        name in "[A-Za-z ]{1,20}",
        group in "[a-f0-9]{8}",
        password in "[ -~]{1,20}",
    ) {
        let broker = broker();
        let renamed = profile
            .clone()
            .with_connection_name(name)
            .with_group_id(group)
            .with_password(password);

        prop_assert_eq!(
            broker.format_credential_key(&profile, None),
            broker.format_credential_key(&renamed, None)
        );
    }

    #[test]
    fn identity_lists_components_in_sorted_order(profile in arb_profile()) {
        let id = profile.connection_info_id(IdentityScope::Basic);
        let keys: Vec<&str> = id
            .split('|')
            .skip(1)
            .filter_map(|part| part.split_once(':').map(|(k, _)| k))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();

        prop_assert!(id.starts_with("providerName:"));
        prop_assert_eq!(keys, sorted);
    }

    #[test]
    fn full_identity_extends_basic_identity(
        profile in arb_profile(),
        option in "[a-z]{4,10}",
        value in "[a-z0-9]{1,10}",
    ) {
        let mut with_option = profile.clone();
        with_option.options.insert(format!("x{option}"), serde_json::Value::String(value));

        let basic = profile.connection_info_id(IdentityScope::Basic);
        prop_assert_eq!(&basic, &profile.connection_info_id(IdentityScope::Full));
        prop_assert!(with_option.connection_info_id(IdentityScope::Full).len() > basic.len());
        prop_assert_eq!(basic, with_option.connection_info_id(IdentityScope::Basic));
    }
}
