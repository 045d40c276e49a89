//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use connstore_core::{AuthenticationType, CONFIG_DIR_ENV};

/// `ConnStore` command-line interface for connection profiles
#[derive(Parser)]
#[command(name = "connstore-cli")]
#[command(author, version, about = "ConnStore command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true, env = CONFIG_DIR_ENV)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Where saved passwords go
    #[arg(
        long,
        global = true,
        env = "CONNSTORE_SECRET_STORE",
        default_value = "auto",
        value_enum
    )]
    pub secret_store: SecretStoreArg,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Configuration directory override
    pub config: Option<PathBuf>,
    /// Secret store selection
    pub secret_store: SecretStoreArg,
}

impl Cli {
    /// Extracts the options every command handler needs
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            config: self.config.clone(),
            secret_store: self.secret_store,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Recently used connections
    #[command(subcommand)]
    Recent(RecentCommands),

    /// Print the group tree
    #[command(about = "Print the group hierarchy with its connections")]
    Groups {
        /// Print groups only
        #[arg(long)]
        without_connections: bool,

        /// Only include connections for this provider (repeatable)
        #[arg(short, long = "provider", value_name = "PROVIDER")]
        providers: Vec<String>,
    },

    /// Group management
    #[command(subcommand)]
    Group(GroupCommands),

    /// Save a connection profile
    #[command(about = "Save a connection profile to the configuration")]
    Save {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Write the password into the configuration file as well
        #[arg(long)]
        plaintext: bool,
    },
}

/// Recent connection subcommands
#[derive(Subcommand)]
pub enum RecentCommands {
    /// List recent connections, most recent first
    List {
        /// Only include this provider (repeatable)
        #[arg(short, long = "provider", value_name = "PROVIDER")]
        providers: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Record a connection as just used
    Add {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Treat the profile as one saved in the configuration
        #[arg(long)]
        saved: bool,
    },

    /// Remove a connection from the list
    Remove {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Match the saved profile in the given group
        #[arg(long)]
        saved: bool,
    },

    /// Empty the list
    Clear,
}

/// Group subcommands
#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a group
    Add {
        /// Group name
        name: String,

        /// Full name of the parent group (defaults to the root group)
        #[arg(short, long)]
        parent: Option<String>,

        /// Display color
        #[arg(long)]
        color: Option<String>,

        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a group with its subgroups and connections
    Delete {
        /// Full name of the group, e.g. `Prod/EU`
        full_name: String,
    },
}

/// Fields describing a connection profile
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Server / host name
    #[arg(short = 'S', long)]
    pub server: String,

    /// Provider handling the connection
    #[arg(short = 'P', long, default_value = "MSSQL")]
    pub provider: String,

    /// Display name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Database name
    #[arg(short, long)]
    pub database: Option<String>,

    /// Login name
    #[arg(short, long)]
    pub user: Option<String>,

    /// Authentication scheme
    #[arg(short, long, default_value = "password", value_enum)]
    pub auth: AuthArg,

    /// Full name of the owning group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Password for the connection
    #[arg(long)]
    pub password: Option<String>,

    /// Keep the password in the secret store
    #[arg(long)]
    pub save_password: bool,
}

/// Authentication scheme argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthArg {
    /// User name and password
    Password,
    /// Operating-system integrated authentication
    Integrated,
    /// Interactive multi-factor sign-in
    AzureMfa,
    /// Interactive multi-factor sign-in with explicit user
    AzureMfaAndUser,
    /// Token service authentication
    Dsts,
    /// No authentication
    None,
}

impl From<AuthArg> for AuthenticationType {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::Password => Self::Password,
            AuthArg::Integrated => Self::Integrated,
            AuthArg::AzureMfa => Self::AzureMfa,
            AuthArg::AzureMfaAndUser => Self::AzureMfaAndUser,
            AuthArg::Dsts => Self::DstsAuth,
            AuthArg::None => Self::None,
        }
    }
}

/// Secret store selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SecretStoreArg {
    /// The system keyring when `secret-tool` is installed, else process memory
    #[default]
    Auto,
    /// The system keyring; fails when `secret-tool` is missing
    Keyring,
    /// Process memory; nothing outlives the command
    Memory,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON
    Json,
}
