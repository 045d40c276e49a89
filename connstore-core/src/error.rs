//! Error types for the connection store
//!
//! Each collaborator has its own error enum; [`StoreError`] wraps them for
//! orchestrator operations that touch more than one collaborator.

use thiserror::Error;

/// Errors raised by the persistent profile configuration and settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing a configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A configuration document could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// A value failed validation
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Offending field
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The referenced profile or group does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation would create a duplicate profile or group
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// The group hierarchy is nested deeper than the store accepts
    #[error("Group '{group_id}' is nested {depth} levels deep; the group configuration is corrupt")]
    GroupDepthExceeded {
        /// Group at which the limit was hit
        group_id: String,
        /// Depth reached
        depth: usize,
    },

    /// A group move would detach it from the tree or create a cycle
    #[error("Invalid group move: {0}")]
    InvalidMove(String),
}

/// Errors raised by secret store backends
#[derive(Debug, Error)]
pub enum SecretError {
    /// No usable backend
    #[error("Secret backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Writing a secret failed
    #[error("Failed to store secret: {0}")]
    StoreFailed(String),

    /// Reading a secret failed
    #[error("Failed to retrieve secret: {0}")]
    RetrieveFailed(String),

    /// Deleting a secret failed
    #[error("Failed to delete secret: {0}")]
    DeleteFailed(String),

    /// libsecret / `secret-tool` failure
    #[error("libsecret error: {0}")]
    LibSecret(String),
}

/// Umbrella error for [`crate::store::ConnectionStore`] operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration adapter failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Secret store failure
    #[error(transparent)]
    Secret(#[from] SecretError),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for secret operations
pub type SecretResult<T> = Result<T, SecretError>;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
