//! Run-lifetime memoization of provider lookups with single-flight.
//!
//! Each key maps to a `OnceCell`. The first caller runs the computation;
//! concurrent callers for the same key await that same cell instead of
//! issuing their own remote call. `Ok` outcomes, including a definitive
//! `None`, are memoized for the rest of the run. `Err` outcomes leave the
//! cell empty, so the next caller tries again.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use reelfix_core::{CanonicalRecord, EpisodeRecord};
use tokio::sync::OnceCell;
use tokio::time::{Duration, Instant};

use crate::error::ProviderError;
use crate::provider::ProviderKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Search,
    Details,
    Episode,
}

/// `(operation, provider, arguments fingerprint)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: Operation,
    pub provider: ProviderKind,
    pub fingerprint: String,
}

impl CacheKey {
    pub fn new(operation: Operation, provider: ProviderKind, fingerprint: impl Into<String>) -> Self {
        Self {
            operation,
            provider,
            fingerprint: fingerprint.into(),
        }
    }
}

/// A memoized outcome. `None` inside a variant is a recorded absence.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Search(Option<String>),
    Details(Option<CanonicalRecord>),
    Episode(Option<EpisodeRecord>),
}

#[derive(Debug)]
struct Entry {
    value: CachedValue,
    stored_at: Instant,
}

type Slot = Arc<OnceCell<Entry>>;

/// Counters for a cache instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
pub struct ResolutionCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries older than `ttl` are recomputed on next access.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    /// Return the cached value for `key`, computing it at most once
    /// concurrently.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> Result<CachedValue, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CachedValue, ProviderError>>,
    {
        let slot = self.slot(&key);
        let computed = AtomicBool::new(false);
        let computed_ref = &computed;

        let entry = slot
            .get_or_try_init(|| async move {
                computed_ref.store(true, Ordering::Relaxed);
                let value = compute().await?;
                Ok::<_, ProviderError>(Entry {
                    value,
                    stored_at: Instant::now(),
                })
            })
            .await?;

        if computed.load(Ordering::Relaxed) {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Ok(entry.value.clone())
    }

    pub fn stats(&self) -> CacheStats {
        let entries = match self.slots.lock() {
            Ok(slots) => slots.values().filter(|s| s.initialized()).count(),
            Err(poisoned) => poisoned
                .into_inner()
                .values()
                .filter(|s| s.initialized())
                .count(),
        };
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }

    /// Find or create the cell for `key`, replacing it if its entry expired.
    fn slot(&self, key: &CacheKey) -> Slot {
        let mut slots = match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let expired = match (self.ttl, slots.get(key).and_then(|s| s.get())) {
            (Some(ttl), Some(entry)) => entry.stored_at.elapsed() >= ttl,
            _ => false,
        };
        if expired {
            slots.remove(key);
        }
        slots.entry(key.clone()).or_default().clone()
    }
}

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod tests;
