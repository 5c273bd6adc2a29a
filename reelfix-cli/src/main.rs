//! reelfix CLI
//!
//! Fills missing movie and show metadata in a record database from IMDb
//! and TMDB.

mod cli_types;
mod commands;
mod error;

use std::io::Write;

use clap::Parser;
use log::{Level, LevelFilter};

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = match cli.command {
        Commands::Fix { db, shards, limits } => {
            commands::fix::run_fix(cli.config.as_deref(), db, shards, limits, cli.quiet)
        }
        Commands::Resolve {
            query,
            r#type,
            year,
            season,
            episode,
            parsed,
        } => commands::resolve::run_resolve(
            cli.config.as_deref(),
            commands::resolve::ResolveArgs {
                query,
                media_type: r#type,
                year,
                season,
                episode,
                parsed,
            },
        ),
        Commands::Stats { db } => commands::stats::run_stats(cli.config.as_deref(), db),
        Commands::Import { file, db } => {
            commands::import::run_import(cli.config.as_deref(), &file, db)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(cli.config.as_deref()),
            ConfigAction::Path => commands::config::run_config_path(),
        },
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}

/// Install the logger. `RUST_LOG` overrides the level picked from flags.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module("reelfix", level)
        .target(env_logger::Target::Stdout);

    if verbose {
        builder.format_timestamp_millis();
    } else {
        // Plain lines for normal output; level prefix only for problems
        builder.format(|buf, record| match record.level() {
            Level::Info | Level::Debug | Level::Trace => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "{level}: {}", record.args()),
        });
    }

    builder.parse_default_env();
    builder.init();
}

/// Emit a blank line at info level.
pub(crate) fn log_blank() {
    log::info!("");
}

/// Build the multi-thread runtime used by async commands.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {e}")))
}
