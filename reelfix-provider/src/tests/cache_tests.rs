use super::*;

use std::sync::atomic::AtomicUsize;

fn key(fp: &str) -> CacheKey {
    CacheKey::new(Operation::Search, ProviderKind::Primary, fp)
}

#[tokio::test]
async fn concurrent_callers_share_one_computation() {
    let cache = Arc::new(ResolutionCache::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cache
                    .get_or_compute(key("movie::inception::2010"), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Ok(CachedValue::Search(Some("tt1375666".into())))
                    })
                    .await
            })
        })
        .collect();

    for task in tasks {
        let value = task.await.unwrap().unwrap();
        assert_eq!(value, CachedValue::Search(Some("tt1375666".into())));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 7);
}

#[tokio::test]
async fn definitive_absence_is_memoized() {
    let cache = ResolutionCache::new();
    let calls = AtomicUsize::new(0);

    for _ in 0..3 {
        let value = cache
            .get_or_compute(key("movie::nothing"), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(CachedValue::Search(None))
            })
            .await
            .unwrap();
        assert_eq!(value, CachedValue::Search(None));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn errors_are_not_cached() {
    let cache = ResolutionCache::new();
    let calls = AtomicUsize::new(0);

    let first = cache
        .get_or_compute(key("movie::flaky"), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::RateLimited)
        })
        .await;
    assert!(first.is_err());

    let second = cache
        .get_or_compute(key("movie::flaky"), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(CachedValue::Search(Some("tt0000001".into())))
        })
        .await
        .unwrap();
    assert_eq!(second, CachedValue::Search(Some("tt0000001".into())));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.stats().entries, 1);
}

#[tokio::test]
async fn distinct_keys_compute_separately() {
    let cache = ResolutionCache::new();
    let primary = CacheKey::new(Operation::Details, ProviderKind::Primary, "tt1");
    let secondary = CacheKey::new(Operation::Details, ProviderKind::Secondary, "tt1");

    cache
        .get_or_compute(primary, || async { Ok(CachedValue::Details(None)) })
        .await
        .unwrap();
    cache
        .get_or_compute(secondary, || async { Ok(CachedValue::Details(None)) })
        .await
        .unwrap();
    assert_eq!(cache.stats().misses, 2);
}

#[tokio::test]
async fn expired_entries_are_recomputed() {
    let cache = ResolutionCache::with_ttl(Duration::from_millis(10));
    let calls = AtomicUsize::new(0);

    for _ in 0..2 {
        cache
            .get_or_compute(key("tv::show"), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(CachedValue::Search(Some("1399".into())))
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
