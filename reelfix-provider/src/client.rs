//! Shared HTTP plumbing for the provider clients.

use serde::de::DeserializeOwned;
use tokio::time::Duration;

use crate::config::Config;
use crate::error::ProviderError;
use crate::imdb::ImdbClient;
use crate::resolve::{IdentityResolver, ResolverServices};
use crate::tmdb::TmdbClient;

/// Resolver over the two HTTP providers.
pub type DefaultResolver = IdentityResolver<ImdbClient, TmdbClient>;

/// A `reqwest::Client` with a base URL and status-code mapping.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reelfix/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}{path}` and decode the JSON body.
    ///
    /// A 404 is a definitive miss and yields `Ok(None)`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {url}");

        let resp = self.http.get(&url).query(query).send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::InvalidCredentials(format!(
                "{path} rejected with HTTP {}",
                status.as_u16()
            )));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        let text = resp.text().await?;
        if status.is_server_error() || !status.is_success() {
            return Err(ProviderError::Server {
                status: status.as_u16(),
                message: snippet(&text),
            });
        }

        serde_json::from_str(&text).map(Some).map_err(|e| {
            ProviderError::Malformed(format!("{path}: {e}. Response: {}", snippet(&text)))
        })
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(200).collect()
}

/// Build a resolver from configuration. Both providers share one rate
/// limiter and one cache.
pub fn connect(config: &Config) -> Result<DefaultResolver, ProviderError> {
    let base_url = config.imdb_base_url.clone().ok_or_else(|| {
        ProviderError::Config(
            "Missing IMDb base URL. Set REELFIX_IMDB_BASE_URL or [imdb] base_url".to_string(),
        )
    })?;
    let api_key = config.tmdb_api_key.clone().ok_or_else(|| {
        ProviderError::Config(
            "Missing TMDB API key. Set REELFIX_TMDB_API_KEY or [tmdb] api_key".to_string(),
        )
    })?;

    let timeout = config.limits.request_timeout;
    let imdb = ImdbClient::new(base_url, timeout)?;
    let tmdb = TmdbClient::new(api_key, &config.tmdb_language, timeout)?;

    let services = ResolverServices::from_limits(&config.limits);
    Ok(IdentityResolver::with_services(imdb, tmdb, &services))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_char_bounded() {
        let long = "é".repeat(500);
        assert_eq!(snippet(&long).chars().count(), 200);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = HttpClient::new("https://api.example/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://api.example");
    }

    #[test]
    fn connect_requires_both_providers() {
        let config = Config {
            tmdb_api_key: Some("key".into()),
            ..Config::default()
        };
        assert!(matches!(connect(&config), Err(ProviderError::Config(_))));

        let config = Config {
            imdb_base_url: Some("https://imdb.example".into()),
            ..Config::default()
        };
        assert!(matches!(connect(&config), Err(ProviderError::Config(_))));
    }
}
