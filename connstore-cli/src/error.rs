//! CLI error types and exit codes.

use connstore_core::{ConfigError, SecretError, StoreError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// Any failure: configuration, validation, secret store or I/O
    pub const GENERAL_ERROR: i32 = 1;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Group error
    #[error("Group error: {0}")]
    Group(String),

    /// Profile error
    #[error("Profile error: {0}")]
    Profile(String),

    /// Secret store error
    #[error("Secret error: {0}")]
    Secret(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => Self::Io(e),
            ConfigError::NotFound(_)
            | ConfigError::Duplicate(_)
            | ConfigError::InvalidMove(_)
            | ConfigError::GroupDepthExceeded { .. } => Self::Group(err.to_string()),
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<SecretError> for CliError {
    fn from(err: SecretError) -> Self {
        Self::Secret(err.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Config(e) => e.into(),
            StoreError::Secret(e) => e.into(),
        }
    }
}

impl CliError {
    /// Returns the exit code for this error.
    ///
    /// Every failure maps to 1; 0 is success.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Group(_) | Self::Profile(_) | Self::Secret(_) | Self::Io(_) => {
                exit_codes::GENERAL_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Config("x".into()).exit_code(), 1);
        assert_eq!(CliError::Secret("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_group_errors_are_grouped() {
        let err: CliError = ConfigError::Duplicate("group 'A'".into()).into();
        assert!(matches!(err, CliError::Group(_)));
        let err: CliError = StoreError::Config(ConfigError::Parse("bad".into())).into();
        assert!(matches!(err, CliError::Config(_)));
    }
}
