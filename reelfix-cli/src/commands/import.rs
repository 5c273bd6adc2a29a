use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use reelfix_core::StoredRecord;
use reelfix_store::SqliteStore;

use crate::CliError;

/// Parse a JSON array of stored records.
fn read_records(path: &Path) -> Result<Vec<StoredRecord>, CliError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub(crate) fn run_import(
    config_path: Option<&Path>,
    file: &Path,
    db: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = super::load_config(config_path)?;
    let db_path = super::db_path(db, &config);

    let records = read_records(file)?;
    log::info!(
        "Importing {} records from {}",
        records.len(),
        file.display().if_supports_color(Stdout, |t| t.cyan()),
    );

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = SqliteStore::open(&db_path, None)
        .map_err(|e| CliError::database(format!("Failed to open record database: {e}")))?;
    let imported = store
        .import(&records)
        .map_err(|e| CliError::database(format!("Import failed: {e}")))?;

    log::info!(
        "{} Imported {} records into {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        imported,
        db_path.display(),
    );

    Ok(())
}
