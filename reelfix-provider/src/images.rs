//! Artwork URL construction for both providers.

use crate::types::TmdbImage;

const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
const METAHUB_BASE: &str = "https://images.metahub.space";

pub const POSTER_SIZE: &str = "w500";
pub const BACKDROP_SIZE: &str = "original";
pub const STILL_SIZE: &str = "original";
pub const LOGO_SIZE: &str = "w300";

/// Full TMDB image URL, or `""` when there is no path.
pub fn tmdb_image(path: Option<&str>, size: &str) -> String {
    match path.map(str::trim) {
        Some(p) if !p.is_empty() => format!("{TMDB_IMAGE_BASE}/{size}{p}"),
        _ => String::new(),
    }
}

/// Pick a logo: the first English one with a path, else the first with a path.
pub fn tmdb_logo(logos: &[TmdbImage]) -> String {
    let has_path = |l: &&TmdbImage| l.file_path.as_deref().is_some_and(|p| !p.is_empty());
    logos
        .iter()
        .filter(has_path)
        .find(|l| l.iso_639_1.as_deref() == Some("en"))
        .or_else(|| logos.iter().find(has_path))
        .map(|l| tmdb_image(l.file_path.as_deref(), LOGO_SIZE))
        .unwrap_or_default()
}

/// Poster, backdrop and logo derived from an IMDb id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetahubImages {
    pub poster: String,
    pub backdrop: String,
    pub logo: String,
}

impl MetahubImages {
    pub fn for_imdb_id(imdb_id: &str) -> Self {
        if imdb_id.is_empty() {
            return Self::default();
        }
        Self {
            poster: format!("{METAHUB_BASE}/poster/small/{imdb_id}/img"),
            backdrop: format!("{METAHUB_BASE}/background/medium/{imdb_id}/img"),
            logo: format!("{METAHUB_BASE}/logo/medium/{imdb_id}/img"),
        }
    }
}
