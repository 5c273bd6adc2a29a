//! The raw provider contract.
//!
//! A [`MetadataProvider`] wraps one external API. It reports a definitive
//! miss as `Ok(None)` and everything else (timeouts, HTTP failures, bodies
//! that don't parse) as `Err`. Callers never use providers directly; they go
//! through [`ProviderAdapter`](crate::ProviderAdapter), which adds the rate
//! limit, the cache and the timeout, and flattens errors into "no result".

use std::future::Future;

use reelfix_core::{CanonicalRecord, EpisodeRecord, MediaType};

use crate::error::ProviderError;

/// Which slot in the fallback chain a provider occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Free-text / IMDb id search source, tried first
    Primary,
    /// Structured catalog (TMDB) with logos and per-episode data
    Secondary,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

pub trait MetadataProvider: Send + Sync + 'static {
    fn kind(&self) -> ProviderKind;

    /// Short lowercase name for logs (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Search by title and return the provider-native id of the best match.
    fn search(
        &self,
        title: &str,
        media_type: MediaType,
        year: Option<u32>,
    ) -> impl Future<Output = Result<Option<String>, ProviderError>> + Send;

    /// Fetch and normalize full details for a provider-native id.
    fn details(
        &self,
        id: &str,
        media_type: MediaType,
    ) -> impl Future<Output = Result<Option<CanonicalRecord>, ProviderError>> + Send;

    /// Fetch and normalize one episode of a show.
    fn episode(
        &self,
        show_id: &str,
        season: u32,
        episode: u32,
    ) -> impl Future<Output = Result<Option<EpisodeRecord>, ProviderError>> + Send;
}
