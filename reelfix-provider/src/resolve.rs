use std::sync::Arc;

use reelfix_core::{CanonicalRecord, EpisodeRecord, IdHint, MediaIdentity, ResolveRequest};
use tokio::time::Duration;

use crate::adapter::{DEFAULT_REQUEST_TIMEOUT, ProviderAdapter};
use crate::cache::ResolutionCache;
use crate::config::Limits;
use crate::limiter::RateLimiter;
use crate::provider::{MetadataProvider, ProviderKind};

/// How an identity was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMethod {
    /// Direct primary lookup by a known IMDb id
    ImdbHint,
    /// Direct secondary lookup by a known TMDB id
    TmdbHint,
    /// Title search against the primary provider
    PrimarySearch,
    /// Title search against the secondary provider after the primary missed
    SecondarySearch,
}

impl std::fmt::Display for ResolveMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImdbHint => write!(f, "imdb id"),
            Self::TmdbHint => write!(f, "tmdb id"),
            Self::PrimarySearch => write!(f, "primary search"),
            Self::SecondarySearch => write!(f, "secondary search"),
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub record: CanonicalRecord,
    /// Present for episode requests, even when only a placeholder is known
    pub episode: Option<EpisodeRecord>,
    pub provider: ProviderKind,
    pub method: ResolveMethod,
    pub warnings: Vec<String>,
}

/// Shared limiter and cache handed to both adapters.
#[derive(Debug, Clone)]
pub struct ResolverServices {
    pub limiter: Arc<RateLimiter>,
    pub cache: Arc<ResolutionCache>,
    pub timeout: Duration,
}

impl ResolverServices {
    pub fn new(limiter: Arc<RateLimiter>, cache: Arc<ResolutionCache>) -> Self {
        Self {
            limiter,
            cache,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_limits(limits: &Limits) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::with_interval(
                limits.provider_concurrency,
                limits.min_request_interval,
            )),
            cache: Arc::new(ResolutionCache::new()),
            timeout: limits.request_timeout,
        }
    }

    pub fn adapter<P: MetadataProvider>(&self, provider: P) -> ProviderAdapter<P> {
        ProviderAdapter::new(provider, self.limiter.clone(), self.cache.clone())
            .with_timeout(self.timeout)
    }
}

/// Chooses which provider to ask and in what order.
///
/// The primary is always tried to completion before the secondary; the two
/// are never queried concurrently for the same request.
pub struct IdentityResolver<A, B> {
    primary: ProviderAdapter<A>,
    secondary: ProviderAdapter<B>,
}

impl<A: MetadataProvider, B: MetadataProvider> IdentityResolver<A, B> {
    pub fn new(primary: ProviderAdapter<A>, secondary: ProviderAdapter<B>) -> Self {
        Self { primary, secondary }
    }

    pub fn with_services(primary: A, secondary: B, services: &ResolverServices) -> Self {
        Self::new(services.adapter(primary), services.adapter(secondary))
    }

    pub fn primary(&self) -> &ProviderAdapter<A> {
        &self.primary
    }

    pub fn secondary(&self) -> &ProviderAdapter<B> {
        &self.secondary
    }

    /// Resolve a request to canonical metadata, or `None` if neither
    /// provider knows the item.
    pub async fn resolve(&self, request: &ResolveRequest) -> Option<Resolved> {
        let identity = &request.identity;
        let mut resolved = self.resolve_identity(identity).await?;

        if let Some((season, episode)) = request.episode {
            let ep = self
                .episode_for(resolved.provider, &resolved.record, season, episode)
                .await;
            if ep.is_none() {
                resolved.warnings.push(format!(
                    "No episode data for '{}' S{season}E{episode}",
                    identity.title
                ));
            }
            resolved.episode =
                Some(ep.unwrap_or_else(|| EpisodeRecord::placeholder(season, episode)));
        }

        Some(resolved)
    }

    async fn resolve_identity(&self, identity: &MediaIdentity) -> Option<Resolved> {
        let mut warnings = Vec::new();
        let media_type = identity.media_type;
        let mut had_hint = false;

        // Tier 1: IMDb id
        if let Some(raw) = identity.imdb_id.as_deref() {
            match IdHint::parse(raw) {
                IdHint::Imdb(id) => {
                    had_hint = true;
                    if let Some(record) = self.primary.details_by_id(&id, media_type).await {
                        return Some(found(record, ProviderKind::Primary, ResolveMethod::ImdbHint, warnings));
                    }
                    warnings.push(format!("IMDb id '{id}' returned no details"));
                }
                other => {
                    log::warn!("Ignoring malformed IMDb id '{raw}' for '{}'", identity.title);
                    warnings.push(format!("Ignored id hint {other:?}"));
                }
            }
        }

        // Tier 2: TMDB id
        if let Some(id) = identity.tmdb_id {
            had_hint = true;
            let id = id.to_string();
            if let Some(record) = self.secondary.details_by_id(&id, media_type).await {
                return Some(found(record, ProviderKind::Secondary, ResolveMethod::TmdbHint, warnings));
            }
            warnings.push(format!("TMDB id '{id}' returned no details"));
        }

        // Tier 3: primary search, only without usable hints
        if !had_hint {
            if let Some(record) = self
                .search_then_details(&self.primary, identity, &mut warnings)
                .await
            {
                return Some(found(record, ProviderKind::Primary, ResolveMethod::PrimarySearch, warnings));
            }
            log::info!(
                "No {} result for '{}', trying {}",
                self.primary.name(),
                identity.title,
                self.secondary.name()
            );
        }

        // Tier 4: secondary search
        if let Some(record) = self
            .search_then_details(&self.secondary, identity, &mut warnings)
            .await
        {
            return Some(found(record, ProviderKind::Secondary, ResolveMethod::SecondarySearch, warnings));
        }

        for w in &warnings {
            log::debug!("{}: {w}", identity.title);
        }
        log::warn!("Unresolved: '{}' ({})", identity.title, media_type);
        None
    }

    async fn search_then_details<P: MetadataProvider>(
        &self,
        adapter: &ProviderAdapter<P>,
        identity: &MediaIdentity,
        warnings: &mut Vec<String>,
    ) -> Option<CanonicalRecord> {
        let Some(id) = adapter
            .search_by_title(&identity.title, identity.media_type, identity.year)
            .await
        else {
            warnings.push(format!("{} search found nothing", adapter.name()));
            return None;
        };
        let record = adapter.details_by_id(&id, identity.media_type).await;
        if record.is_none() {
            warnings.push(format!("{} id '{id}' returned no details", adapter.name()));
        }
        record
    }

    /// Fetch one episode from the provider that resolved the show.
    ///
    /// Returns `None` when the show has no id for that provider or the
    /// provider has no such episode.
    pub async fn episode_for(
        &self,
        provider: ProviderKind,
        show: &CanonicalRecord,
        season: u32,
        episode: u32,
    ) -> Option<EpisodeRecord> {
        match provider {
            ProviderKind::Primary => {
                let id = show.imdb_id.as_deref()?;
                self.primary.episode_details(id, season, episode).await
            }
            ProviderKind::Secondary => {
                let id = show.tmdb_id?.to_string();
                self.secondary.episode_details(&id, season, episode).await
            }
        }
    }
}

fn found(
    record: CanonicalRecord,
    provider: ProviderKind,
    method: ResolveMethod,
    warnings: Vec<String>,
) -> Resolved {
    log::debug!("Resolved '{}' via {method} ({provider})", record.title);
    Resolved {
        record,
        episode: None,
        provider,
        method,
        warnings,
    }
}
