use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::media_type::MediaType;

/// What is known about an item before any provider is consulted.
///
/// Built fresh for every resolution attempt. `title` is the only required
/// field; the ids are hints that let the resolver skip the search step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaIdentity {
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<u64>,
    pub title: String,
    pub year: Option<u32>,
    pub media_type: MediaType,
}

impl MediaIdentity {
    pub fn new(title: impl Into<String>, media_type: MediaType) -> Result<Self, IdentityError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(IdentityError::MissingTitle);
        }
        Ok(Self {
            imdb_id: None,
            tmdb_id: None,
            title,
            year: None,
            media_type,
        })
    }

    /// Attach an IMDb id hint. Empty strings are ignored.
    pub fn with_imdb_id(mut self, id: Option<impl Into<String>>) -> Self {
        self.imdb_id = id.map(Into::into).filter(|s: &String| !s.trim().is_empty());
        self
    }

    /// Attach a TMDB id hint. Zero is treated as absent.
    pub fn with_tmdb_id(mut self, id: Option<u64>) -> Self {
        self.tmdb_id = id.filter(|&v| v != 0);
        self
    }

    pub fn with_year(mut self, year: Option<u32>) -> Self {
        self.year = year.filter(|&y| y != 0);
        self
    }

    /// Apply a free-form hint (URL, `tt…` id, or numeric id).
    ///
    /// Invalid hints are dropped; callers that care can classify first with
    /// [`IdHint::parse`].
    pub fn with_hint(self, hint: &IdHint) -> Self {
        match hint {
            IdHint::Imdb(id) => self.with_imdb_id(Some(id.clone())),
            IdHint::Tmdb(id) => self.with_tmdb_id(Some(*id)),
            IdHint::Invalid(_) => self,
        }
    }
}

/// A classified provider id hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdHint {
    /// `tt` followed by digits
    Imdb(String),
    /// Purely numeric
    Tmdb(u64),
    /// Neither shape; carried so callers can log it
    Invalid(String),
}

impl IdHint {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_imdb_id(trimmed) {
            return Self::Imdb(trimmed.to_string());
        }
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = trimmed.parse::<u64>() {
                if id != 0 {
                    return Self::Tmdb(id);
                }
            }
        }
        Self::Invalid(trimmed.to_string())
    }
}

/// True if `s` has the IMDb title id shape (`tt` + one or more digits).
pub fn is_imdb_id(s: &str) -> bool {
    s.strip_prefix("tt")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Pull a provider id out of a URL or free text.
///
/// Looks for an IMDb `/title/tt…` path first, then a TMDB `/movie/…` or
/// `/tv/…` path. Returns the id as written (`tt0137523` or `550`).
pub fn extract_default_id(text: &str) -> Option<String> {
    if let Some(id) = find_after(text, "/title/", |rest| {
        let digits = leading_digits(rest.strip_prefix("tt")?);
        (!digits.is_empty()).then(|| format!("tt{digits}"))
    }) {
        return Some(id);
    }

    for marker in ["/movie/", "/tv/"] {
        if let Some(id) = find_after(text, marker, |rest| {
            let digits = leading_digits(rest);
            (!digits.is_empty()).then(|| digits.to_string())
        }) {
            return Some(id);
        }
    }

    None
}

fn find_after(text: &str, marker: &str, parse: impl Fn(&str) -> Option<String>) -> Option<String> {
    text.match_indices(marker)
        .find_map(|(idx, _)| parse(&text[idx + marker.len()..]))
}

fn leading_digits(s: &str) -> &str {
    let end = s
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(s.len());
    &s[..end]
}

/// A single unit of work for the identity resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveRequest {
    pub identity: MediaIdentity,
    /// `(season, episode)` when a specific episode should be fetched too
    pub episode: Option<(u32, u32)>,
}

impl ResolveRequest {
    pub fn new(identity: MediaIdentity) -> Self {
        Self {
            identity,
            episode: None,
        }
    }

    pub fn episode(identity: MediaIdentity, season: u32, episode: u32) -> Self {
        Self {
            identity,
            episode: Some((season, episode)),
        }
    }
}

#[cfg(test)]
#[path = "tests/identity_tests.rs"]
mod tests;
