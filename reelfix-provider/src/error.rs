use std::time::Duration;

/// Errors a provider call can produce.
///
/// A definitive "no such title" is not an error: providers return `Ok(None)`
/// for it. Everything here is absorbed at the adapter boundary and turned
/// into "no result", but only `Ok` outcomes are ever cached.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Rate limiter closed")]
    LimiterClosed,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Network-level failures that may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout(_) | Self::RateLimited | Self::Server { .. }
        )
    }
}

/// Errors loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}
