use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use reelfix_provider::{ConfigSource, config_path, config_sources};

use crate::CliError;

fn mask_value(s: &str) -> String {
    if s.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", s.chars().take(4).collect::<String>())
    }
}

/// Show effective settings and where each one came from.
pub(crate) fn run_config_show(path: Option<&Path>) -> Result<(), CliError> {
    let file = path.map(Path::to_path_buf).or_else(config_path);
    let config = super::load_config(path)?;
    let sources = config_sources();

    log::info!(
        "{}",
        "reelfix Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    match &file {
        Some(p) if p.exists() => log::info!(
            "  Config file: {} {}",
            p.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        ),
        Some(p) => log::info!(
            "  Config file: {} {}",
            p.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        ),
        None => log::info!(
            "  Config file: {}",
            "could not determine path".if_supports_color(Stdout, |t| t.red()),
        ),
    }
    crate::log_blank();

    let limits = &config.limits;
    let db = super::db_path(None, &config);
    let fields: [(&str, &ConfigSource, Option<String>); 5] = [
        (
            "tmdb.api_key",
            &sources.tmdb_api_key,
            config.tmdb_api_key.as_deref().map(mask_value),
        ),
        (
            "tmdb.language",
            &sources.tmdb_language,
            Some(config.tmdb_language.clone()),
        ),
        (
            "imdb.base_url",
            &sources.imdb_base_url,
            config.imdb_base_url.clone(),
        ),
        (
            "limits",
            &sources.limits,
            Some(format!(
                "concurrency {}, fan-out {}, episode fan-out {}, timeout {}s",
                limits.provider_concurrency,
                limits.fan_out,
                limits.episode_fan_out(),
                limits.request_timeout.as_secs(),
            )),
        ),
        ("store.path", &sources.store_path, Some(db.display().to_string())),
    ];

    for (name, source, value) in fields {
        let source_str = format!("({source})");
        let label = format!("{name}:");
        match value {
            Some(v) => log::info!(
                "  {} {} {}",
                label.if_supports_color(Stdout, |t| t.cyan()),
                v,
                source_str.if_supports_color(Stdout, |t| t.dimmed()),
            ),
            None => log::info!(
                "  {} {} {}",
                label.if_supports_color(Stdout, |t| t.cyan()),
                "not set".if_supports_color(Stdout, |t| t.yellow()),
                source_str.if_supports_color(Stdout, |t| t.dimmed()),
            ),
        }
    }

    Ok(())
}

/// Print the config file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    match config_path() {
        Some(p) => {
            println!("{}", p.display());
            Ok(())
        }
        None => Err(CliError::config("Could not determine config directory")),
    }
}
