use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use reelfix_core::{CanonicalRecord, EpisodeRecord, MediaType};
use reelfix_provider::{MetadataProvider, ProviderError, ProviderKind};

/// Scripted provider that records every call it receives.
pub struct MockProvider {
    kind: ProviderKind,
    searches: HashMap<String, String>,
    details: HashMap<String, CanonicalRecord>,
    episodes: HashMap<(String, u32, u32), EpisodeRecord>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    hook: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

impl MockProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            searches: HashMap::new(),
            details: HashMap::new(),
            episodes: HashMap::new(),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            hook: None,
        }
    }

    pub fn with_search(mut self, title: &str, id: &str) -> Self {
        self.searches.insert(title.to_lowercase(), id.to_string());
        self
    }

    pub fn with_details(mut self, id: &str, record: CanonicalRecord) -> Self {
        self.details.insert(id.to_string(), record);
        self
    }

    pub fn with_episode(mut self, show_id: &str, record: EpisodeRecord) -> Self {
        self.episodes.insert(
            (show_id.to_string(), record.season_number, record.episode_number),
            record,
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Run `hook` with the call description on every call.
    pub fn with_hook(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        if let Some(hook) = &self.hook {
            hook(&call);
        }
        self.calls.lock().unwrap().push(call);
    }
}

impl MetadataProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        match self.kind {
            ProviderKind::Primary => "mock-primary",
            ProviderKind::Secondary => "mock-secondary",
        }
    }

    async fn search(
        &self,
        title: &str,
        _media_type: MediaType,
        _year: Option<u32>,
    ) -> Result<Option<String>, ProviderError> {
        self.record(format!("search:{title}"));
        tokio::time::sleep(self.delay).await;
        Ok(self.searches.get(&title.to_lowercase()).cloned())
    }

    async fn details(
        &self,
        id: &str,
        _media_type: MediaType,
    ) -> Result<Option<CanonicalRecord>, ProviderError> {
        self.record(format!("details:{id}"));
        tokio::time::sleep(self.delay).await;
        Ok(self.details.get(id).cloned())
    }

    async fn episode(
        &self,
        show_id: &str,
        season: u32,
        episode: u32,
    ) -> Result<Option<EpisodeRecord>, ProviderError> {
        self.record(format!("episode:{show_id}:{season}:{episode}"));
        Ok(self
            .episodes
            .get(&(show_id.to_string(), season, episode))
            .cloned())
    }
}

pub fn record(title: &str, imdb_id: Option<&str>, tmdb_id: Option<u64>) -> CanonicalRecord {
    CanonicalRecord {
        imdb_id: imdb_id.map(String::from),
        tmdb_id,
        title: title.to_string(),
        ..CanonicalRecord::default()
    }
}

pub mod store {
    use reelfix_core::{Collection, RecordRef, ShardId, StoredRecord};
    use reelfix_store::{
        EpisodePatch, MemoryStore, RecordPatch, RecordStore, StoreError, UpdateAck,
    };
    use futures::stream::{BoxStream, StreamExt};
    use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

    /// Wraps a `MemoryStore`, failing the first `failures` record updates
    /// and counting records handed out by `records()`.
    pub struct FlakyStore {
        pub inner: MemoryStore,
        failures: AtomicU32,
        reads: AtomicU64,
    }

    impl FlakyStore {
        pub fn new(inner: MemoryStore, failures: u32) -> Self {
            Self {
                inner,
                failures: AtomicU32::new(failures),
                reads: AtomicU64::new(0),
            }
        }

        pub fn reads(&self) -> u64 {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl RecordStore for FlakyStore {
        fn shard_count(&self) -> u32 {
            self.inner.shard_count()
        }

        async fn count(&self, shard: ShardId, collection: Collection) -> Result<u64, StoreError> {
            self.inner.count(shard, collection).await
        }

        fn records(
            &self,
            shard: ShardId,
            collection: Collection,
        ) -> BoxStream<'_, Result<StoredRecord, StoreError>> {
            self.inner
                .records(shard, collection)
                .inspect(|_| {
                    self.reads.fetch_add(1, Ordering::SeqCst);
                })
                .boxed()
        }

        async fn get_record(&self, target: &RecordRef) -> Result<Option<StoredRecord>, StoreError> {
            self.inner.get_record(target).await
        }

        async fn update_record(
            &self,
            target: &RecordRef,
            patch: &RecordPatch,
        ) -> Result<UpdateAck, StoreError> {
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(StoreError::Unavailable("connection reset".into()));
            }
            self.inner.update_record(target, patch).await
        }

        async fn update_episode(
            &self,
            target: &RecordRef,
            season: u32,
            episode: u32,
            patch: &EpisodePatch,
        ) -> Result<UpdateAck, StoreError> {
            self.inner.update_episode(target, season, episode, patch).await
        }

        async fn insert_record(&self, record: StoredRecord) -> Result<(), StoreError> {
            self.inner.insert_record(record).await
        }
    }
}
