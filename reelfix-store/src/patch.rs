//! Minimal field updates for stored records.

use std::collections::BTreeMap;

use reelfix_core::{Episode, StoredRecord};
use serde::{Deserialize, Serialize};

/// A record field that reconciliation may fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ImdbId,
    TmdbId,
    Rating,
    Cast,
    Description,
    Genres,
    Poster,
    Backdrop,
    Runtime,
    Logo,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::ImdbId,
        Field::TmdbId,
        Field::Rating,
        Field::Cast,
        Field::Description,
        Field::Genres,
        Field::Poster,
        Field::Backdrop,
        Field::Runtime,
        Field::Logo,
    ];

    /// Document key for this field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ImdbId => "imdb_id",
            Self::TmdbId => "tmdb_id",
            Self::Rating => "rating",
            Self::Cast => "cast",
            Self::Description => "description",
            Self::Genres => "genres",
            Self::Poster => "poster",
            Self::Backdrop => "backdrop",
            Self::Runtime => "runtime",
            Self::Logo => "logo",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Id(u64),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

/// Field assignments for one record, ordered by field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordPatch {
    fields: BTreeMap<Field, FieldValue>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: FieldValue) {
        self.fields.insert(field, value);
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.fields.iter().map(|(f, v)| (*f, v))
    }

    /// Write every assignment into `record`.
    ///
    /// A value whose shape doesn't match the field is skipped with a warning.
    pub fn apply(&self, record: &mut StoredRecord) {
        for (field, value) in &self.fields {
            match (field, value) {
                (Field::ImdbId, FieldValue::Text(v)) => record.imdb_id = Some(v.clone()),
                (Field::TmdbId, FieldValue::Id(v)) => record.tmdb_id = Some(*v),
                (Field::Rating, FieldValue::Number(v)) => record.rating = *v,
                (Field::Rating, FieldValue::Id(v)) => record.rating = *v as f64,
                (Field::Cast, FieldValue::List(v)) => record.cast = v.clone(),
                (Field::Genres, FieldValue::List(v)) => record.genres = v.clone(),
                (Field::Description, FieldValue::Text(v)) => record.description = v.clone(),
                (Field::Poster, FieldValue::Text(v)) => record.poster = v.clone(),
                (Field::Backdrop, FieldValue::Text(v)) => record.backdrop = v.clone(),
                (Field::Runtime, FieldValue::Text(v)) => record.runtime = v.clone(),
                (Field::Logo, FieldValue::Text(v)) => record.logo = v.clone(),
                _ => log::warn!(
                    "Skipping {field} on '{}': value {value:?} has the wrong shape",
                    record.id
                ),
            }
        }
    }
}

/// Field assignments for one episode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodePatch {
    pub overview: Option<String>,
    pub released_at: Option<String>,
    pub backdrop: Option<String>,
}

impl EpisodePatch {
    pub fn is_empty(&self) -> bool {
        self.overview.is_none() && self.released_at.is_none() && self.backdrop.is_none()
    }

    pub fn apply(&self, episode: &mut Episode) {
        if let Some(v) = &self.overview {
            episode.overview = v.clone();
        }
        if let Some(v) = &self.released_at {
            episode.released_at = v.clone();
        }
        if let Some(v) = &self.backdrop {
            episode.episode_backdrop = v.clone();
        }
    }
}
