//! Normalized provider records and the persisted record shape.

use serde::{Deserialize, Serialize};

use crate::empty::IsEmpty;
use crate::media_type::MediaType;

/// Metadata for a movie or show, normalized from either provider.
///
/// Ids are optional; every other field uses its empty sentinel (`""`, `0`,
/// empty list) when the provider had nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalRecord {
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<u64>,
    pub title: String,
    pub year: u32,
    pub rating: f64,
    pub description: String,
    pub poster: String,
    pub backdrop: String,
    pub logo: String,
    pub cast: Vec<String>,
    pub genres: Vec<String>,
    pub runtime: String,
    pub media_type: Option<MediaType>,
}

/// Per-episode metadata fetched alongside a show.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeRecord {
    pub season_number: u32,
    pub episode_number: u32,
    pub episode_title: String,
    pub episode_overview: String,
    pub episode_backdrop: String,
    pub episode_released_at: String,
}

impl EpisodeRecord {
    /// An episode with only its position known; the title is synthesized.
    pub fn placeholder(season: u32, episode: u32) -> Self {
        Self {
            season_number: season,
            episode_number: episode,
            episode_title: format!("S{season}E{episode}"),
            ..Self::default()
        }
    }
}

/// Shard index in the document store. Shards are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShardId(pub u32);

impl std::fmt::Display for ShardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "storage_{}", self.0)
    }
}

/// Internal document id, unique within the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Each shard exposes one collection per media type.
pub type Collection = MediaType;

/// Enough to address a single document for an update.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub shard: ShardId,
    pub collection: Collection,
    pub id: RecordId,
}

/// A movie or show as persisted in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub shard: ShardId,
    pub media_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub poster: String,
    #[serde(default)]
    pub backdrop: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub runtime: String,
    #[serde(default)]
    pub seasons: Vec<Season>,
}

impl StoredRecord {
    /// A bare record with only its identity filled in.
    pub fn new(
        id: impl Into<String>,
        shard: ShardId,
        media_type: MediaType,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId(id.into()),
            shard,
            media_type,
            title: title.into(),
            year: None,
            imdb_id: None,
            tmdb_id: None,
            rating: 0.0,
            description: String::new(),
            poster: String::new(),
            backdrop: String::new(),
            logo: String::new(),
            cast: Vec::new(),
            genres: Vec::new(),
            runtime: String::new(),
            seasons: Vec::new(),
        }
    }

    pub fn record_ref(&self) -> RecordRef {
        RecordRef {
            shard: self.shard,
            collection: self.media_type,
            id: self.id.clone(),
        }
    }

    pub fn episode(&self, season: u32, episode: u32) -> Option<&Episode> {
        self.seasons
            .iter()
            .find(|s| s.season_number == season)?
            .episodes
            .iter()
            .find(|e| e.episode_number == episode)
    }

    pub fn episode_mut(&mut self, season: u32, episode: u32) -> Option<&mut Episode> {
        self.seasons
            .iter_mut()
            .find(|s| s.season_number == season)?
            .episodes
            .iter_mut()
            .find(|e| e.episode_number == episode)
    }

    /// Number of episodes still missing at least one enrichable field.
    pub fn incomplete_episodes(&self) -> usize {
        self.seasons
            .iter()
            .flat_map(|s| s.episodes.iter())
            .filter(|e| !e.is_complete())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Season {
    pub season_number: u32,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Episode {
    pub episode_number: u32,
    pub title: String,
    pub overview: String,
    pub released_at: String,
    pub episode_backdrop: String,
}

impl Episode {
    pub fn new(episode_number: u32) -> Self {
        Self {
            episode_number,
            ..Self::default()
        }
    }

    /// All three enrichable fields are present; nothing to resolve.
    pub fn is_complete(&self) -> bool {
        !self.overview.is_empty_value()
            && !self.released_at.is_empty_value()
            && !self.episode_backdrop.is_empty_value()
    }
}
