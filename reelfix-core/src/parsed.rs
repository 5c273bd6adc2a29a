//! Validation of attributes produced by the upstream filename parser.
//!
//! The parsing grammar itself lives outside this workspace; this module only
//! decides whether its output is good enough to start a resolution.

use serde::{Deserialize, Serialize};

use crate::error::ParsedNameError;
use crate::identity::{MediaIdentity, ResolveRequest};
use crate::media_type::MediaType;

/// Season/episode values as the parser may report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrList {
    Number(u32),
    List(Vec<u32>),
}

/// Attributes extracted from a free-text release name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedName {
    pub title: Option<String>,
    pub season: Option<NumberOrList>,
    pub episode: Option<NumberOrList>,
    pub year: Option<u32>,
    pub resolution: Option<String>,
}

impl ParsedName {
    /// Turn parsed attributes into a resolution request.
    ///
    /// Rejects list-valued season/episode, a season without an episode, and
    /// names missing a resolution or title. An episode number without a
    /// season is treated as season 1.
    pub fn into_request(self) -> Result<ResolveRequest, ParsedNameError> {
        let season = single("season", self.season)?;
        let episode = single("episode", self.episode)?;

        if let (Some(s), None) = (season, episode) {
            return Err(ParsedNameError::MissingEpisode(s));
        }
        if self.resolution.as_deref().is_none_or(|r| r.trim().is_empty()) {
            return Err(ParsedNameError::MissingResolution);
        }
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or(ParsedNameError::MissingTitle)?;

        match episode {
            Some(ep) => {
                let identity = MediaIdentity::new(title, MediaType::Tv)
                    .map_err(|_| ParsedNameError::MissingTitle)?
                    .with_year(self.year);
                Ok(ResolveRequest::episode(identity, season.unwrap_or(1), ep))
            }
            None => {
                let identity = MediaIdentity::new(title, MediaType::Movie)
                    .map_err(|_| ParsedNameError::MissingTitle)?
                    .with_year(self.year);
                Ok(ResolveRequest::new(identity))
            }
        }
    }
}

fn single(
    field: &'static str,
    value: Option<NumberOrList>,
) -> Result<Option<u32>, ParsedNameError> {
    match value {
        None => Ok(None),
        Some(NumberOrList::Number(n)) => Ok(Some(n)),
        Some(NumberOrList::List(_)) => Err(ParsedNameError::Ambiguous(field)),
    }
}
