pub(crate) mod config;
pub(crate) mod fix;
pub(crate) mod import;
pub(crate) mod resolve;
pub(crate) mod stats;

use std::path::{Path, PathBuf};

use reelfix_provider::Config;

use crate::CliError;

/// `~/.local/share/reelfix/records.db`, or `./records.db` without a data dir.
pub(crate) fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("reelfix"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("records.db")
}

/// Load configuration from `path`, or from the default location.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    let loaded = match path {
        Some(p) => Config::load_from(p),
        None => Config::load(),
    };
    loaded.map_err(|e| CliError::config(e.to_string()))
}

/// Database path priority: `--db` flag, then configuration, then the default.
pub(crate) fn db_path(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.or_else(|| config.store_path.clone())
        .unwrap_or_else(default_db_path)
}
