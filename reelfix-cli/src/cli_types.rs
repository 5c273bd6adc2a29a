//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use reelfix_core::MediaType;

#[derive(Parser)]
#[command(name = "reelfix")]
#[command(about = "Fill missing movie and show metadata from IMDb and TMDB", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read configuration from this file instead of ~/.config/reelfix/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the `[limits]` config section.
#[derive(Args, Clone, Default)]
pub(crate) struct LimitArgs {
    /// Maximum provider requests in flight across the whole process
    #[arg(long, value_parser = positive)]
    pub concurrency: Option<usize>,

    /// Records processed concurrently
    #[arg(long, value_parser = positive)]
    pub fan_out: Option<usize>,

    /// Episodes processed concurrently per show (default: fan-out / 4)
    #[arg(long, value_parser = positive)]
    pub episode_fan_out: Option<usize>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Reconcile every stored record against the metadata providers
    Fix {
        /// Path to the record database (default: ~/.local/share/reelfix/records.db)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Number of shards to walk (default: discovered from the database)
        #[arg(long)]
        shards: Option<u32>,

        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Resolve a single title, URL, or provider id and print it as JSON
    Resolve {
        /// Title, IMDb/TMDB URL, or id (tt0137523, 550).
        /// With --parsed, a JSON object from the filename parser
        query: String,

        /// Media type: movie or tv (default: tv when --season/--episode is given)
        #[arg(long, short = 't')]
        r#type: Option<MediaType>,

        /// Release year to narrow the search
        #[arg(long)]
        year: Option<u32>,

        /// Season number for an episode lookup
        #[arg(long, requires = "episode")]
        season: Option<u32>,

        /// Episode number for an episode lookup
        #[arg(long)]
        episode: Option<u32>,

        /// Treat QUERY as parsed filename attributes in JSON
        #[arg(long, conflicts_with_all = ["type", "year", "season", "episode"])]
        parsed: bool,
    },

    /// Show per-shard record counts
    Stats {
        /// Path to the record database
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Load stored records from a JSON array file into the database
    Import {
        /// JSON file containing an array of records
        file: PathBuf,

        /// Path to the record database
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Inspect provider configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current settings and their sources
    Show,

    /// Print the config file path
    Path,
}

fn positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
