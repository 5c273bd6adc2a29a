use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use reelfix_store::SqliteStore;

use crate::CliError;

pub(crate) fn run_stats(config_path: Option<&Path>, db: Option<PathBuf>) -> Result<(), CliError> {
    let config = super::load_config(config_path)?;
    let db_path = super::db_path(db, &config);

    if !db_path.exists() {
        log::warn!("No record database found at {}", db_path.display());
        log::info!("Run 'reelfix import <file>' to create one.");
        return Ok(());
    }

    let store = SqliteStore::open(&db_path, None)
        .map_err(|e| CliError::database(format!("Failed to open record database: {e}")))?;
    let stats = store
        .stats()
        .map_err(|e| CliError::database(format!("Failed to query record stats: {e}")))?;

    log::info!(
        "{}",
        "Record Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", db_path.display());
    crate::log_blank();

    if stats.shards.is_empty() {
        log::info!("  No records.");
        return Ok(());
    }

    log::info!(
        "  {:<12} {:>8} {:>8} {:>12}",
        "Shard", "Movies", "Shows", "Incomplete"
    );
    for shard in &stats.shards {
        let incomplete = shard.incomplete_shows.to_string();
        log::info!(
            "  {:<12} {:>8} {:>8} {:>12}",
            format!("storage_{}", shard.shard),
            shard.movies,
            shard.shows,
            if shard.incomplete_shows > 0 {
                incomplete.if_supports_color(Stdout, |t| t.yellow()).to_string()
            } else {
                incomplete
            },
        );
    }
    crate::log_blank();
    log::info!("  Total records: {:>8}", stats.total());

    Ok(())
}
