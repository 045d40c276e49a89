//! Shared utility functions used across command modules.

use std::path::Path;
use std::sync::Arc;

use connstore_core::secret::is_secret_tool_available;
use connstore_core::{
    ConfigManager, ConnectionProfile, ConnectionStore, CredentialBroker, JsonProfileConfig,
    JsonStateStore, KeyringSecretStore, MemorySecretStore, SecretStore, TracingLevel,
};
use tracing::{debug, warn};

use crate::cli::{GlobalOptions, ProfileArgs, SecretStoreArg};
use crate::error::CliError;

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Log level from `settings.toml`, or `warn` when it cannot be read
pub fn configured_log_level(config_path: Option<&Path>) -> TracingLevel {
    create_config_manager(config_path)
        .ok()
        .and_then(|manager| manager.load_settings().ok())
        .and_then(|settings| settings.logging.level.parse().ok())
        .unwrap_or(TracingLevel::Warn)
}

/// Picks the secret store for `selection`; the flag is true when secrets
/// outlive the process
async fn open_secret_store(
    selection: SecretStoreArg,
) -> Result<(Arc<dyn SecretStore>, bool), CliError> {
    let keyring_available = match selection {
        SecretStoreArg::Memory => false,
        SecretStoreArg::Auto | SecretStoreArg::Keyring => is_secret_tool_available().await,
    };
    match selection {
        SecretStoreArg::Keyring if !keyring_available => Err(CliError::Secret(
            "secret-tool not found; install libsecret-tools or use --secret-store memory"
                .to_string(),
        )),
        _ if keyring_available => Ok((Arc::new(KeyringSecretStore::default()), true)),
        SecretStoreArg::Auto => {
            warn!("secret-tool not found, passwords will not be saved");
            Ok((Arc::new(MemorySecretStore::new()), false))
        }
        _ => Ok((Arc::new(MemorySecretStore::new()), false)),
    }
}

/// An opened store plus the state checkpoint it writes its recent list at
pub struct Session {
    pub store: ConnectionStore,
    state: Arc<JsonStateStore>,
    persistent_secrets: bool,
}

impl Session {
    /// Opens the configuration, state and secret store for one invocation
    pub async fn open(options: &GlobalOptions) -> Result<Self, CliError> {
        let manager = create_config_manager(options.config.as_deref())?;
        let settings = manager.load_settings()?;
        let config = Arc::new(JsonProfileConfig::open(manager.profiles_path())?);
        let state = Arc::new(JsonStateStore::open(manager.state_path())?);

        let (secrets, persistent_secrets) = open_secret_store(options.secret_store).await?;
        debug!(
            config_dir = %manager.config_dir().display(),
            backend = secrets.backend_id(),
            persistent_secrets,
            "Opening connection store"
        );

        let store = ConnectionStore::new(
            config,
            CredentialBroker::new(secrets, &settings.credentials),
            state.clone(),
            Arc::new(settings),
        );
        Ok(Self {
            store,
            state,
            persistent_secrets,
        })
    }

    /// Rejects a request to save a password the secret store would lose
    pub fn check_password_saving(&self, profile: &ConnectionProfile) -> Result<(), CliError> {
        if profile.save_password && profile.has_password() && !self.persistent_secrets {
            return Err(CliError::Secret(
                "--save-password needs the system keyring; the selected secret store \
                 keeps passwords in memory only"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Writes process state, including the recent list
    pub fn finish(self) -> Result<(), CliError> {
        self.state.persist()?;
        Ok(())
    }
}

/// Builds a profile from command line fields
pub fn profile_from_args(args: &ProfileArgs) -> Result<ConnectionProfile, CliError> {
    if args.server.trim().is_empty() {
        return Err(CliError::Profile("server name must not be empty".to_string()));
    }
    let mut profile = ConnectionProfile::new(args.provider.as_str(), args.server.trim())
        .with_authentication(args.auth.into());
    profile.connection_name.clone_from(&args.name);
    profile.database_name.clone_from(&args.database);
    profile.user_name.clone_from(&args.user);
    profile.group_full_name.clone_from(&args.group);
    profile.save_password = args.save_password;
    if let Some(password) = &args.password {
        profile = profile.with_password(password.as_str());
    }
    Ok(profile)
}

/// One-line description of a profile for listings
pub fn describe(profile: &ConnectionProfile) -> String {
    let name = if profile.name().is_empty() {
        profile.server_name.as_str()
    } else {
        profile.name()
    };
    let mut target = profile.server_name.clone();
    if let Some(database) = profile.database_name.as_deref().filter(|d| !d.is_empty()) {
        target = format!("{target}/{database}");
    }
    if let Some(user) = profile.user_name.as_deref().filter(|u| !u.is_empty()) {
        target = format!("{user}@{target}");
    }
    format!("{name} [{}] {target}", profile.provider_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::AuthArg;
    use connstore_core::AuthenticationType;

    fn args(server: &str) -> ProfileArgs {
        ProfileArgs {
            server: server.to_string(),
            provider: "MSSQL".to_string(),
            name: Some("prod".to_string()),
            database: Some("sales".to_string()),
            user: Some("sa".to_string()),
            auth: AuthArg::Integrated,
            group: Some("Team/Prod".to_string()),
            password: None,
            save_password: false,
        }
    }

    #[test]
    fn test_profile_from_args() {
        let profile = profile_from_args(&args(" db01 ")).unwrap();
        assert_eq!(profile.server_name, "db01");
        assert_eq!(profile.authentication_type, AuthenticationType::Integrated);
        assert_eq!(profile.group_full_name.as_deref(), Some("Team/Prod"));
        assert!(!profile.has_password());
    }

    #[test]
    fn test_empty_server_rejected() {
        assert!(matches!(
            profile_from_args(&args("  ")),
            Err(CliError::Profile(_))
        ));
    }

    #[test]
    fn test_describe() {
        let profile = profile_from_args(&args("db01")).unwrap();
        assert_eq!(describe(&profile), "prod [MSSQL] sa@db01/sales");
    }
}
