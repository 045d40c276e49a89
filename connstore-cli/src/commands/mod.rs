//! Command handler modules for the CLI.

mod group;
mod profile;
mod recent;

use connstore_core::span_names;
use tracing::{Instrument, info_span};

use crate::cli::{Commands, GlobalOptions};
use crate::error::CliError;
use crate::util::Session;

/// Dispatch a CLI command to the appropriate handler.
///
/// Every command runs against a freshly opened store. The process state is
/// persisted after the handler returns, whether or not it succeeded.
pub fn dispatch(options: &GlobalOptions, command: Commands) -> Result<(), CliError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Config(format!("Runtime error: {e}")))?;

    let span = info_span!(span_names::CLI_COMMAND, command = command_name(&command));
    runtime.block_on(
        async move {
            let session = Session::open(options).await?;
            let outcome = run(&session, command).await;
            let persisted = session.finish();
            outcome.and(persisted)
        }
        .instrument(span),
    )
}

async fn run(session: &Session, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Recent(subcmd) => recent::cmd_recent(session, subcmd).await,
        Commands::Groups {
            without_connections,
            providers,
        } => group::cmd_groups(session, without_connections, &providers).await,
        Commands::Group(subcmd) => group::cmd_group(session, subcmd).await,
        Commands::Save { profile, plaintext } => {
            profile::cmd_save(session, &profile, plaintext).await
        }
    }
}

const fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Recent(_) => "recent",
        Commands::Groups { .. } => "groups",
        Commands::Group(_) => "group",
        Commands::Save { .. } => "save",
    }
}

/// `None` for an empty provider filter
fn provider_filter(providers: &[String]) -> Option<&[String]> {
    (!providers.is_empty()).then_some(providers)
}
