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

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
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
