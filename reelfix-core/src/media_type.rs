use serde::{Deserialize, Serialize};

/// Kind of media a record describes.
///
/// Shows own seasons and episodes; movies don't. The same enum selects the
/// provider endpoint family (`/movie` vs `/tv`) and the store collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Canonical short name, also used as the collection name.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    /// All accepted names for this media type (case-insensitive matching).
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Movie => &["movie", "movies", "film"],
            Self::Tv => &["tv", "series", "tvseries", "show", "shows"],
        }
    }

    pub fn all() -> &'static [MediaType] {
        &[MediaType::Movie, MediaType::Tv]
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Error returned when a string cannot be parsed into a `MediaType`.
#[derive(Debug, Clone)]
pub struct MediaTypeParseError(pub String);

impl std::fmt::Display for MediaTypeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown media type: '{}'", self.0)
    }
}

impl std::error::Error for MediaTypeParseError {}

impl std::str::FromStr for MediaType {
    type Err = MediaTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        for &media_type in MediaType::all() {
            if media_type.aliases().contains(&lower.as_str()) {
                return Ok(media_type);
            }
        }
        Err(MediaTypeParseError(s.to_string()))
    }
}
