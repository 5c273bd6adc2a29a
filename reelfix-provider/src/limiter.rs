//! Process-wide gate on outstanding provider calls.
//!
//! Independent of how many records the batch driver has in flight: every
//! search, details and episode request takes a permit first, so aggregate
//! load on the providers stays bounded no matter how many consumers are
//! resolving at once.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::{Duration, Instant};

use crate::error::ProviderError;

/// Default number of concurrent provider calls.
pub const DEFAULT_MAX_CONCURRENT: usize = 12;

/// Counting gate with an optional minimum spacing between request starts.
#[derive(Debug)]
pub struct RateLimiter {
    permits: Arc<Semaphore>,
    max: usize,
    min_interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

/// Held for the duration of one remote call; released on drop.
#[derive(Debug)]
pub struct RatePermit {
    _permit: OwnedSemaphorePermit,
}

impl RateLimiter {
    pub fn new(max_concurrent: usize) -> Self {
        Self::with_interval(max_concurrent, Duration::ZERO)
    }

    pub fn with_interval(max_concurrent: usize, min_interval: Duration) -> Self {
        let max = max_concurrent.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max)),
            max,
            min_interval,
            last_start: Mutex::new(None),
        }
    }

    /// Wait for a free slot, then for the minimum interval since the last
    /// request start (if one is configured).
    pub async fn acquire(&self) -> Result<RatePermit, ProviderError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ProviderError::LimiterClosed)?;

        if !self.min_interval.is_zero() {
            let mut last = self.last_start.lock().await;
            if let Some(started) = *last {
                let elapsed = started.elapsed();
                if elapsed < self.min_interval {
                    tokio::time::sleep(self.min_interval - elapsed).await;
                }
            }
            *last = Some(Instant::now());
        }

        Ok(RatePermit { _permit: permit })
    }

    /// Calls currently holding a permit.
    pub fn in_flight(&self) -> usize {
        self.max - self.permits.available_permits()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max
    }

    /// Refuse all further acquisitions. Outstanding permits stay valid.
    pub fn close(&self) {
        self.permits.close();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn permits_are_released_on_drop() {
        let limiter = RateLimiter::new(2);
        let a = limiter.acquire().await.unwrap();
        let _b = limiter.acquire().await.unwrap();
        assert_eq!(limiter.in_flight(), 2);
        drop(a);
        assert_eq!(limiter.in_flight(), 1);
    }

    #[tokio::test]
    async fn third_caller_waits_for_a_slot() {
        let limiter = Arc::new(RateLimiter::new(2));
        let a = limiter.acquire().await.unwrap();
        let _b = limiter.acquire().await.unwrap();

        let waiting = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.acquire().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(a);
        let result = tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn closed_limiter_rejects() {
        let limiter = RateLimiter::new(1);
        limiter.close();
        assert!(matches!(
            limiter.acquire().await,
            Err(ProviderError::LimiterClosed)
        ));
    }

    #[test]
    fn zero_bound_is_clamped() {
        assert_eq!(RateLimiter::new(0).max_concurrent(), 1);
    }
}
