//! Fill-only merge of provider candidates into stored records.
//!
//! For each enrichable field the first candidate with a non-empty value
//! wins, and that value is only written when the stored field is empty.
//! Existing data is never overwritten, so running the merge twice with the
//! same candidates produces an empty patch the second time.

use reelfix_core::{CanonicalRecord, Episode, EpisodeRecord, IsEmpty, StoredRecord};
use reelfix_store::{EpisodePatch, Field, FieldValue, RecordPatch};

/// Compute the minimal patch that fills `stored` from `candidates`.
///
/// `candidates` are in priority order.
pub fn reconcile(stored: &StoredRecord, candidates: &[CanonicalRecord]) -> RecordPatch {
    let mut patch = RecordPatch::new();
    for field in Field::ALL {
        if !stored_is_empty(stored, field) {
            continue;
        }
        if let Some(value) = candidates.iter().find_map(|c| candidate_value(c, field)) {
            patch.set(field, value);
        }
    }
    patch
}

/// Compute the fill-only patch for a single episode.
///
/// `candidates` are in priority order; each field takes the first
/// non-empty value.
pub fn reconcile_episode(stored: &Episode, candidates: &[EpisodeRecord]) -> EpisodePatch {
    fn fill<'a>(
        stored: &str,
        candidates: &'a [EpisodeRecord],
        value: impl Fn(&'a EpisodeRecord) -> &'a str,
    ) -> Option<String> {
        if !stored.is_empty_value() {
            return None;
        }
        candidates
            .iter()
            .map(value)
            .find(|v| !v.is_empty_value())
            .map(str::to_string)
    }

    EpisodePatch {
        overview: fill(&stored.overview, candidates, |c| c.episode_overview.as_str()),
        released_at: fill(&stored.released_at, candidates, |c| c.episode_released_at.as_str()),
        backdrop: fill(&stored.episode_backdrop, candidates, |c| c.episode_backdrop.as_str()),
    }
}

fn stored_is_empty(stored: &StoredRecord, field: Field) -> bool {
    match field {
        Field::ImdbId => stored.imdb_id.is_empty_value(),
        Field::TmdbId => stored.tmdb_id.is_empty_value(),
        Field::Rating => stored.rating.is_empty_value(),
        Field::Cast => stored.cast.is_empty_value(),
        Field::Description => stored.description.is_empty_value(),
        Field::Genres => stored.genres.is_empty_value(),
        Field::Poster => stored.poster.is_empty_value(),
        Field::Backdrop => stored.backdrop.is_empty_value(),
        Field::Runtime => stored.runtime.is_empty_value(),
        Field::Logo => stored.logo.is_empty_value(),
    }
}

/// The candidate's value for `field`, or `None` if it is empty.
fn candidate_value(c: &CanonicalRecord, field: Field) -> Option<FieldValue> {
    let text = |s: &String| (!s.is_empty_value()).then(|| FieldValue::Text(s.clone()));
    let list = |v: &Vec<String>| {
        let items: Vec<String> = v.iter().filter(|s| !s.is_empty_value()).cloned().collect();
        (!items.is_empty()).then_some(FieldValue::List(items))
    };

    match field {
        Field::ImdbId => c.imdb_id.as_ref().and_then(text),
        Field::TmdbId => c.tmdb_id.filter(|id| !id.is_empty_value()).map(FieldValue::Id),
        Field::Rating => (!c.rating.is_empty_value()).then_some(FieldValue::Number(c.rating)),
        Field::Cast => list(&c.cast),
        Field::Description => text(&c.description),
        Field::Genres => list(&c.genres),
        Field::Poster => text(&c.poster),
        Field::Backdrop => text(&c.backdrop),
        Field::Runtime => text(&c.runtime),
        Field::Logo => text(&c.logo),
    }
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
