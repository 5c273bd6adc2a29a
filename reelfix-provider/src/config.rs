//! Configuration for providers, limits and the store location.
//!
//! Values come from environment variables, then
//! `~/.config/reelfix/config.toml`, then built-in defaults.

use std::path::{Path, PathBuf};

use tokio::time::Duration;

use crate::error::ConfigError;
use crate::limiter::DEFAULT_MAX_CONCURRENT;

pub const ENV_TMDB_API_KEY: &str = "REELFIX_TMDB_API_KEY";
pub const ENV_IMDB_BASE_URL: &str = "REELFIX_IMDB_BASE_URL";
pub const ENV_DB: &str = "REELFIX_DB";

pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_FAN_OUT: usize = 20;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Concurrency and pacing limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Upper bound on concurrent provider calls
    pub provider_concurrency: usize,
    /// Records in flight during a batch run
    pub fan_out: usize,
    /// Episodes in flight per show; derived from `fan_out` when unset
    pub episode_fan_out: Option<usize>,
    pub request_timeout: Duration,
    pub min_request_interval: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            provider_concurrency: DEFAULT_MAX_CONCURRENT,
            fan_out: DEFAULT_FAN_OUT,
            episode_fan_out: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            min_request_interval: Duration::ZERO,
        }
    }
}

impl Limits {
    pub fn episode_fan_out(&self) -> usize {
        self.episode_fan_out
            .unwrap_or(self.fan_out / 4)
            .max(1)
    }
}

/// Effective configuration after merging all sources.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub tmdb_api_key: Option<String>,
    pub tmdb_language: String,
    pub imdb_base_url: Option<String>,
    pub limits: Limits,
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            tmdb_language: DEFAULT_LANGUAGE.to_string(),
            imdb_base_url: None,
            limits: Limits::default(),
            store_path: None,
        }
    }
}

/// Where a configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    EnvVar(&'static str),
    ConfigFile,
    Default,
    Missing,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${var}"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each configurable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSources {
    pub tmdb_api_key: ConfigSource,
    pub tmdb_language: ConfigSource,
    pub imdb_base_url: ConfigSource,
    pub limits: ConfigSource,
    pub store_path: ConfigSource,
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
struct ConfigFile {
    tmdb: TmdbSection,
    imdb: ImdbSection,
    limits: LimitsSection,
    store: StoreSection,
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
struct TmdbSection {
    api_key: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
struct ImdbSection {
    base_url: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
struct LimitsSection {
    provider_concurrency: Option<usize>,
    fan_out: Option<usize>,
    episode_fan_out: Option<usize>,
    request_timeout_secs: Option<u64>,
    min_request_interval_ms: Option<u64>,
}

impl LimitsSection {
    fn is_set(&self) -> bool {
        self.provider_concurrency.is_some()
            || self.fan_out.is_some()
            || self.episode_fan_out.is_some()
            || self.request_timeout_secs.is_some()
            || self.min_request_interval_ms.is_some()
    }
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
struct StoreSection {
    path: Option<PathBuf>,
}

/// Path to the configuration file: `~/.config/reelfix/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reelfix").join("config.toml"))
}

impl Config {
    /// Load from the environment and the default config file.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match config_path() {
            Some(path) if path.exists() => read_file(&path)?,
            _ => ConfigFile::default(),
        };
        Self::merge(file, env_var)
    }

    /// Load from the environment and an explicit config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::merge(read_file(path)?, env_var)
    }

    fn merge(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Limits::default();
        let l = &file.limits;

        let provider_concurrency = l.provider_concurrency.unwrap_or(defaults.provider_concurrency);
        if provider_concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.provider_concurrency",
                message: "must be at least 1".to_string(),
            });
        }
        let fan_out = l.fan_out.unwrap_or(defaults.fan_out);
        if fan_out == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.fan_out",
                message: "must be at least 1".to_string(),
            });
        }

        let limits = Limits {
            provider_concurrency,
            fan_out,
            episode_fan_out: l.episode_fan_out.filter(|&n| n > 0),
            request_timeout: l
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            min_request_interval: l
                .min_request_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.min_request_interval),
        };

        Ok(Self {
            tmdb_api_key: env(ENV_TMDB_API_KEY).or(file.tmdb.api_key),
            tmdb_language: file
                .tmdb
                .language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            imdb_base_url: env(ENV_IMDB_BASE_URL).or(file.imdb.base_url),
            limits,
            store_path: env(ENV_DB).map(PathBuf::from).or(file.store.path),
        })
    }
}

/// Determine where each configuration value is coming from.
pub fn config_sources() -> ConfigSources {
    let file = config_path()
        .and_then(|p| read_file(&p).ok())
        .unwrap_or_default();
    sources_for(&file, env_var)
}

fn sources_for(file: &ConfigFile, env: impl Fn(&str) -> Option<String>) -> ConfigSources {
    let pick = |var: &'static str, in_file: bool, fallback: ConfigSource| {
        if env(var).is_some() {
            ConfigSource::EnvVar(var)
        } else if in_file {
            ConfigSource::ConfigFile
        } else {
            fallback
        }
    };

    ConfigSources {
        tmdb_api_key: pick(ENV_TMDB_API_KEY, file.tmdb.api_key.is_some(), ConfigSource::Missing),
        tmdb_language: if file.tmdb.language.is_some() {
            ConfigSource::ConfigFile
        } else {
            ConfigSource::Default
        },
        imdb_base_url: pick(ENV_IMDB_BASE_URL, file.imdb.base_url.is_some(), ConfigSource::Missing),
        limits: if file.limits.is_set() {
            ConfigSource::ConfigFile
        } else {
            ConfigSource::Default
        },
        store_path: pick(ENV_DB, file.store.path.is_some(), ConfigSource::Default),
    }
}

fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
