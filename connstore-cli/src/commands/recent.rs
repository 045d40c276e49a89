//! Recent connection commands.

use connstore_core::ConnectionProfile;

use super::provider_filter;
use crate::cli::{OutputFormat, ProfileArgs, RecentCommands};
use crate::error::CliError;
use crate::util::{Session, describe, profile_from_args};

/// Recent command handler
pub async fn cmd_recent(session: &Session, subcmd: RecentCommands) -> Result<(), CliError> {
    match subcmd {
        RecentCommands::List { providers, format } => {
            cmd_recent_list(session, &providers, format).await
        }
        RecentCommands::Add { profile, saved } => cmd_recent_add(session, &profile, saved).await,
        RecentCommands::Remove { profile, saved } => {
            cmd_recent_remove(session, &profile, saved).await
        }
        RecentCommands::Clear => {
            session.store.clear_recently_used();
            println!("Recent connections cleared.");
            Ok(())
        }
    }
}

async fn cmd_recent_list(
    session: &Session,
    providers: &[String],
    format: OutputFormat,
) -> Result<(), CliError> {
    let recent = session
        .store
        .get_recently_used_connections(provider_filter(providers))
        .await?;

    match format {
        OutputFormat::Table => print_recent_table(&recent),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&recent)
                .map_err(|e| CliError::Config(format!("Failed to serialize: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn print_recent_table(recent: &[ConnectionProfile]) {
    if recent.is_empty() {
        println!("No recent connections.");
        return;
    }
    for (i, profile) in recent.iter().enumerate() {
        let group = profile.group_full_name.as_deref().unwrap_or("-");
        println!("{:>2}. {}  ({group})", i + 1, describe(profile));
    }
}

fn recent_profile(args: &ProfileArgs, saved: bool) -> Result<ConnectionProfile, CliError> {
    let mut profile = profile_from_args(args)?;
    profile.save_profile = saved;
    Ok(profile)
}

async fn cmd_recent_add(session: &Session, args: &ProfileArgs, saved: bool) -> Result<(), CliError> {
    let profile = recent_profile(args, saved)?;
    session.check_password_saving(&profile)?;
    session.store.add_recent_connection(&profile).await?;
    println!("Added {} to recent connections.", describe(&profile));
    Ok(())
}

async fn cmd_recent_remove(
    session: &Session,
    args: &ProfileArgs,
    saved: bool,
) -> Result<(), CliError> {
    let profile = recent_profile(args, saved)?;
    if session.store.remove_recent_connection(&profile).await? {
        println!("Removed {} from recent connections.", describe(&profile));
    } else {
        println!("No matching recent connection.");
    }
    Ok(())
}
