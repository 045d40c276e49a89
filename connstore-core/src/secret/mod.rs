//! Secret management
//!
//! Passwords never live in the profile configuration. The
//! [`CredentialBroker`] derives a credential key from each profile and keeps
//! the password in a [`SecretStore`]:
//! - [`MemorySecretStore`] for tests and ephemeral sessions
//! - [`KeyringSecretStore`] for GNOME Keyring / KDE Wallet via libsecret

mod backend;
mod broker;
pub mod keyring;
mod memory;

pub use backend::SecretStore;
pub use broker::{
    CREDENTIAL_ID_PREFIX, CREDENTIAL_ITEMTYPE_PREFIX, CREDENTIAL_SEPARATOR, CredentialBroker,
    PROFILE_ITEM_TYPE, PasswordResolution,
};
pub use keyring::{KeyringSecretStore, is_secret_tool_available};
pub use memory::MemorySecretStore;
