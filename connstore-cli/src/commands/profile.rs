//! Profile commands.

use crate::cli::ProfileArgs;
use crate::error::CliError;
use crate::util::{Session, describe, profile_from_args};

/// Saves a profile to the configuration and its password to the secret store
pub async fn cmd_save(session: &Session, args: &ProfileArgs, plaintext: bool) -> Result<(), CliError> {
    let mut profile = profile_from_args(args)?;
    profile.save_profile = true;
    if profile.save_password && !profile.has_password() && profile.is_password_required() {
        return Err(CliError::Profile(
            "--save-password needs --password for this authentication type".to_string(),
        ));
    }

    session.check_password_saving(&profile)?;

    let saved = session.store.save_profile(profile, plaintext, None).await?;
    println!("Saved {}", describe(&saved));
    println!("  ID:    {}", saved.id.as_deref().unwrap_or("-"));
    println!(
        "  Group: {}",
        saved.group_full_name.as_deref().unwrap_or("(root)")
    );
    Ok(())
}
