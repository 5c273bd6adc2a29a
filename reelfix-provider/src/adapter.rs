//! Rate-limited, cached, time-bounded access to one provider.

use std::future::Future;
use std::sync::Arc;

use reelfix_core::{CanonicalRecord, EpisodeRecord, MediaType};
use tokio::time::Duration;

use crate::cache::{CacheKey, CachedValue, Operation, ResolutionCache};
use crate::error::ProviderError;
use crate::limiter::RateLimiter;
use crate::provider::{MetadataProvider, ProviderKind};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Wraps a [`MetadataProvider`] with the shared limiter and cache.
///
/// Every call returns `Option`: failures are logged and reported as "no
/// result" so the resolver's fallback logic only ever sees present/absent.
pub struct ProviderAdapter<P> {
    provider: P,
    limiter: Arc<RateLimiter>,
    cache: Arc<ResolutionCache>,
    timeout: Duration,
}

impl<P: MetadataProvider> ProviderAdapter<P> {
    pub fn new(provider: P, limiter: Arc<RateLimiter>, cache: Arc<ResolutionCache>) -> Self {
        Self {
            provider,
            limiter,
            cache,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    pub fn name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn search_by_title(
        &self,
        title: &str,
        media_type: MediaType,
        year: Option<u32>,
    ) -> Option<String> {
        let fingerprint = format!(
            "{}::{}::{:?}",
            media_type.short_name(),
            title.trim().to_lowercase(),
            year
        );
        let key = CacheKey::new(Operation::Search, self.kind(), fingerprint);
        let provider = &self.provider;
        let value = self
            .cached(key, || async move {
                provider
                    .search(title, media_type, year)
                    .await
                    .map(CachedValue::Search)
            })
            .await?;
        match value {
            CachedValue::Search(id) => id,
            _ => None,
        }
    }

    pub async fn details_by_id(&self, id: &str, media_type: MediaType) -> Option<CanonicalRecord> {
        let fingerprint = format!("{}::{}", media_type.short_name(), id.trim());
        let key = CacheKey::new(Operation::Details, self.kind(), fingerprint);
        let provider = &self.provider;
        let value = self
            .cached(key, || async move {
                provider
                    .details(id, media_type)
                    .await
                    .map(CachedValue::Details)
            })
            .await?;
        match value {
            CachedValue::Details(record) => record,
            _ => None,
        }
    }

    pub async fn episode_details(
        &self,
        show_id: &str,
        season: u32,
        episode: u32,
    ) -> Option<EpisodeRecord> {
        let fingerprint = format!("{}::{season}::{episode}", show_id.trim());
        let key = CacheKey::new(Operation::Episode, self.kind(), fingerprint);
        let provider = &self.provider;
        let value = self
            .cached(key, || async move {
                provider
                    .episode(show_id, season, episode)
                    .await
                    .map(CachedValue::Episode)
            })
            .await?;
        match value {
            CachedValue::Episode(ep) => ep,
            _ => None,
        }
    }

    /// Run `call` through the cache. The permit is taken inside the
    /// computation so cache hits never wait on the limiter.
    async fn cached<F, Fut>(&self, key: CacheKey, call: F) -> Option<CachedValue>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CachedValue, ProviderError>>,
    {
        let timeout = self.timeout;
        let limiter = &self.limiter;
        let result = self
            .cache
            .get_or_compute(key.clone(), || async move {
                let _permit = limiter.acquire().await?;
                match tokio::time::timeout(timeout, call()).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout(timeout)),
                }
            })
            .await;

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!(
                    "{} {:?} lookup failed for '{}': {}",
                    self.name(),
                    key.operation,
                    key.fingerprint,
                    e
                );
                None
            }
        }
    }
}
