//! `ConnStore` Core Library
//!
//! The connection-profile store: named profiles and their group hierarchy,
//! a bounded list of recently used connections, and credential indirection
//! so passwords never live in the profile configuration.
//!
//! # Crate Structure
//!
//! - [`models`] - Connection profiles, group records and profile identity
//! - [`config`] - Store settings and configuration file locations
//! - [`profiles`] - Persistent profile configuration (trait + JSON document)
//! - [`secret`] - Secret stores and the credential broker
//! - [`state`] - Process state with a will-save checkpoint
//! - [`groups`] - Group tree builder and the id / full name index
//! - [`recent`] - Most recently used connections
//! - [`store`] - The [`ConnectionStore`] tying it all together

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod groups;
pub mod models;
pub mod profiles;
pub mod recent;
pub mod secret;
pub mod state;
pub mod store;
pub mod tracing;

// =============================================================================
// Convenience re-exports
// =============================================================================

pub use config::{
    CONFIG_DIR_ENV, ConfigManager, CredentialSettings, LegacyKeyRule, SettingsReader,
    StoreSettings, max_recent_connections,
};
pub use error::{ConfigError, ConfigResult, SecretError, SecretResult, StoreError, StoreResult};
pub use groups::{GroupIndex, GroupNode, GroupTree, MAX_GROUP_DEPTH};
pub use models::{
    AuthenticationType, ConnectionProfile, GroupRecord, IdentityScope, ROOT_GROUP_ID,
};
pub use profiles::{JsonProfileConfig, ProfileConfig, ProfileMatcher, default_matcher};
pub use recent::{RECENT_CONNECTIONS_STATE_KEY, RecentConnections};
pub use secret::{
    CredentialBroker, KeyringSecretStore, MemorySecretStore, PasswordResolution, SecretStore,
};
pub use state::{JsonStateStore, StateStore, StorageScope, StorageTarget};
pub use store::ConnectionStore;
pub use crate::tracing::{
    TracingConfig, TracingError, TracingLevel, TracingOutput, TracingResult, init_tracing,
    is_tracing_initialized, span_names,
};
