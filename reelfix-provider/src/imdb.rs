//! Primary provider: an IMDb-style JSON API.

use reelfix_core::{CanonicalRecord, EpisodeRecord, MediaType};
use tokio::time::Duration;

use crate::client::HttpClient;
use crate::error::ProviderError;
use crate::images::MetahubImages;
use crate::provider::{MetadataProvider, ProviderKind};
use crate::types::{ImdbEpisode, ImdbSearchResponse, ImdbTitle};

pub struct ImdbClient {
    http: HttpClient,
}

impl ImdbClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: HttpClient::new(base_url, timeout)?,
        })
    }
}

/// Search `type` parameter for a media type.
fn search_type(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Movie => "movie",
        MediaType::Tv => "tvSeries",
    }
}

/// Movies are qualified with the year, shows are searched by title alone.
pub(crate) fn search_query(title: &str, media_type: MediaType, year: Option<u32>) -> String {
    match (media_type, year) {
        (MediaType::Movie, Some(y)) => format!("{} {y}", title.trim()),
        _ => title.trim().to_string(),
    }
}

/// Normalize a title payload into a canonical record.
///
/// Artwork always comes from the IMDb id. The TMDB id is taken only from
/// `moviedb_id`; it is never derived from the IMDb id.
pub(crate) fn normalize_title(id: &str, title: ImdbTitle, media_type: MediaType) -> CanonicalRecord {
    let imdb_id = if title.id.is_empty() { id.to_string() } else { title.id.clone() };
    let images = MetahubImages::for_imdb_id(&imdb_id);
    let year = title.year();
    let rating = title.star_rating();
    CanonicalRecord {
        imdb_id: Some(imdb_id),
        tmdb_id: title.moviedb_id,
        title: title.title,
        year,
        rating,
        description: title.plot,
        poster: images.poster,
        backdrop: images.backdrop,
        logo: images.logo,
        cast: title.cast,
        genres: title.genre,
        runtime: title.runtime,
        media_type: Some(media_type),
    }
}

pub(crate) fn normalize_episode(season: u32, episode: u32, ep: ImdbEpisode) -> EpisodeRecord {
    let mut record = EpisodeRecord::placeholder(season, episode);
    if !ep.title.trim().is_empty() {
        record.episode_title = ep.title;
    }
    record.episode_overview = ep.plot;
    record.episode_backdrop = ep.image;
    record.episode_released_at = ep.released;
    record
}

impl MetadataProvider for ImdbClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Primary
    }

    fn name(&self) -> &'static str {
        "imdb"
    }

    async fn search(
        &self,
        title: &str,
        media_type: MediaType,
        year: Option<u32>,
    ) -> Result<Option<String>, ProviderError> {
        let query = [
            ("query", search_query(title, media_type, year)),
            ("type", search_type(media_type).to_string()),
        ];
        let resp: Option<ImdbSearchResponse> = self.http.get_json("/search", &query).await?;
        Ok(resp
            .and_then(|r| r.results.into_iter().next())
            .map(|hit| hit.id)
            .filter(|id| !id.is_empty()))
    }

    async fn details(
        &self,
        id: &str,
        media_type: MediaType,
    ) -> Result<Option<CanonicalRecord>, ProviderError> {
        let title: Option<ImdbTitle> = self.http.get_json(&format!("/title/{id}"), &[]).await?;
        Ok(title.map(|t| normalize_title(id, t, media_type)))
    }

    async fn episode(
        &self,
        show_id: &str,
        season: u32,
        episode: u32,
    ) -> Result<Option<EpisodeRecord>, ProviderError> {
        let path = format!("/title/{show_id}/season/{season}/episode/{episode}");
        let ep: Option<ImdbEpisode> = self.http.get_json(&path, &[]).await?;
        Ok(ep.map(|e| normalize_episode(season, episode, e)))
    }
}
