//! `ConnStore` CLI - Command-line interface for the connection profile store
//!
//! Provides commands for the recent connections list, the group hierarchy
//! and saved profiles.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use connstore_core::{TracingConfig, TracingLevel, init_tracing};

fn main() {
    let cli = Cli::parse();

    let base = if cli.quiet {
        TracingLevel::Error
    } else {
        util::configured_log_level(cli.config.as_deref())
    };
    let tracing_config = TracingConfig::new()
        .with_level(TracingLevel::from_verbosity(base, cli.verbose))
        .with_ansi(!cli.no_color);
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("Warning: {e}");
    }

    let result = commands::dispatch(&cli.global_options(), cli.command);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
