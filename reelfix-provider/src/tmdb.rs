//! Secondary provider: TMDB v3.

use chrono::NaiveDate;
use reelfix_core::{CanonicalRecord, EpisodeRecord, MediaType};
use tokio::time::Duration;

use crate::client::HttpClient;
use crate::error::ProviderError;
use crate::images::{self, BACKDROP_SIZE, POSTER_SIZE, STILL_SIZE};
use crate::provider::{MetadataProvider, ProviderKind};
use crate::types::{TmdbDetails, TmdbEpisode, TmdbSearchResponse};

const BASE_URL: &str = "https://api.themoviedb.org/3";

pub struct TmdbClient {
    http: HttpClient,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(
        api_key: impl Into<String>,
        language: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(BASE_URL, api_key, language, timeout)
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: impl Into<String>,
        language: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http: HttpClient::new(base_url, timeout)?,
            api_key: api_key.into(),
            language: language.to_string(),
        })
    }

    fn base_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
        ]
    }
}

fn path_segment(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Movie => "movie",
        MediaType::Tv => "tv",
    }
}

/// `"{n} min"`, or `""` when unknown.
pub(crate) fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        Some(n) if n > 0 => format!("{n} min"),
        _ => String::new(),
    }
}

/// `YYYY-MM-DD` to `YYYY-MM-DDT05:00:00.000Z`. Unparseable dates become `""`.
pub(crate) fn format_air_date(date: Option<&str>) -> String {
    date.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .map(|d| d.format("%Y-%m-%dT05:00:00.000Z").to_string())
        .unwrap_or_default()
}

pub(crate) fn normalize_details(d: TmdbDetails, media_type: MediaType) -> CanonicalRecord {
    let runtime = match media_type {
        MediaType::Movie => format_runtime(d.runtime),
        MediaType::Tv => format_runtime(
            d.last_episode_to_air
                .as_ref()
                .and_then(|ep| ep.runtime)
                .filter(|&n| n > 0)
                .or_else(|| d.episode_run_time.first().copied()),
        ),
    };
    let logo = d
        .images
        .as_ref()
        .map(|i| images::tmdb_logo(&i.logos))
        .unwrap_or_default();

    CanonicalRecord {
        imdb_id: d.imdb_id(),
        tmdb_id: Some(d.id).filter(|&id| id != 0),
        title: d.display_title().to_string(),
        year: d.year(),
        rating: d.vote_average.unwrap_or(0.0),
        description: d.overview.clone().unwrap_or_default(),
        poster: images::tmdb_image(d.poster_path.as_deref(), POSTER_SIZE),
        backdrop: images::tmdb_image(d.backdrop_path.as_deref(), BACKDROP_SIZE),
        logo,
        cast: d.cast_names(),
        genres: d.genres.iter().map(|g| g.name.clone()).collect(),
        runtime,
        media_type: Some(media_type),
    }
}

pub(crate) fn normalize_episode(season: u32, episode: u32, ep: TmdbEpisode) -> EpisodeRecord {
    let mut record = EpisodeRecord::placeholder(season, episode);
    if let Some(name) = ep.name.filter(|n| !n.trim().is_empty()) {
        record.episode_title = name;
    }
    record.episode_overview = ep.overview.unwrap_or_default();
    record.episode_backdrop = images::tmdb_image(ep.still_path.as_deref(), STILL_SIZE);
    record.episode_released_at = format_air_date(ep.air_date.as_deref());
    record
}

impl MetadataProvider for TmdbClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Secondary
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn search(
        &self,
        title: &str,
        media_type: MediaType,
        year: Option<u32>,
    ) -> Result<Option<String>, ProviderError> {
        let mut query = self.base_params();
        query.push(("query", title.trim().to_string()));
        if let (MediaType::Movie, Some(y)) = (media_type, year) {
            query.push(("year", y.to_string()));
        }
        let path = format!("/search/{}", path_segment(media_type));
        let resp: Option<TmdbSearchResponse> = self.http.get_json(&path, &query).await?;
        Ok(resp
            .and_then(|r| r.results.into_iter().next())
            .map(|hit| hit.id.to_string()))
    }

    async fn details(
        &self,
        id: &str,
        media_type: MediaType,
    ) -> Result<Option<CanonicalRecord>, ProviderError> {
        let mut query = self.base_params();
        query.push(("append_to_response", "external_ids,credits,images".to_string()));
        // Otherwise images are filtered to `language` only.
        query.push(("include_image_language", "en,null".to_string()));
        let path = format!("/{}/{}", path_segment(media_type), id.trim());
        let details: Option<TmdbDetails> = self.http.get_json(&path, &query).await?;
        Ok(details.map(|d| normalize_details(d, media_type)))
    }

    async fn episode(
        &self,
        show_id: &str,
        season: u32,
        episode: u32,
    ) -> Result<Option<EpisodeRecord>, ProviderError> {
        let path = format!("/tv/{}/season/{season}/episode/{episode}", show_id.trim());
        let ep: Option<TmdbEpisode> = self.http.get_json(&path, &self.base_params()).await?;
        Ok(ep.map(|e| normalize_episode(season, episode, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_formatting() {
        assert_eq!(format_runtime(Some(148)), "148 min");
        assert_eq!(format_runtime(Some(0)), "");
        assert_eq!(format_runtime(None), "");
    }

    #[test]
    fn air_date_normalization() {
        assert_eq!(
            format_air_date(Some("2011-04-17")),
            "2011-04-17T05:00:00.000Z"
        );
        assert_eq!(format_air_date(Some("soon")), "");
        assert_eq!(format_air_date(None), "");
    }

    #[test]
    fn movie_details_normalization() {
        let d: TmdbDetails = serde_json::from_str(
            r#"{"id":27205,"title":"Inception","release_date":"2010-07-15","vote_average":8.4,
                "overview":"Cobb...","poster_path":"/p.jpg","backdrop_path":"/b.jpg","runtime":148,
                "genres":[{"name":"Action"}],
                "external_ids":{"imdb_id":"tt1375666"},
                "images":{"logos":[{"iso_639_1":"en","file_path":"/logo.png"}]}}"#,
        )
        .unwrap();
        let rec = normalize_details(d, MediaType::Movie);
        assert_eq!(rec.tmdb_id, Some(27205));
        assert_eq!(rec.imdb_id.as_deref(), Some("tt1375666"));
        assert_eq!(rec.year, 2010);
        assert_eq!(rec.runtime, "148 min");
        assert_eq!(rec.poster, "https://image.tmdb.org/t/p/w500/p.jpg");
        assert_eq!(rec.backdrop, "https://image.tmdb.org/t/p/original/b.jpg");
        assert_eq!(rec.logo, "https://image.tmdb.org/t/p/w300/logo.png");
    }

    #[test]
    fn tv_runtime_from_episode_run_time() {
        let d: TmdbDetails =
            serde_json::from_str(r#"{"id":1399,"name":"GoT","episode_run_time":[60,55]}"#).unwrap();
        assert_eq!(normalize_details(d, MediaType::Tv).runtime, "60 min");
    }

    #[test]
    fn tv_runtime_prefers_episode_runtime() {
        let d: TmdbDetails = serde_json::from_str(
            r#"{"id":1399,"name":"GoT","episode_run_time":[60],
                "last_episode_to_air":{"name":"The Iron Throne","runtime":80}}"#,
        )
        .unwrap();
        assert_eq!(normalize_details(d, MediaType::Tv).runtime, "80 min");

        let d: TmdbDetails = serde_json::from_str(
            r#"{"id":1399,"episode_run_time":[60],"last_episode_to_air":{"runtime":null}}"#,
        )
        .unwrap();
        assert_eq!(normalize_details(d, MediaType::Tv).runtime, "60 min");
    }

    #[test]
    fn episode_normalization() {
        let ep = normalize_episode(
            1,
            1,
            TmdbEpisode {
                name: Some("Winter Is Coming".into()),
                overview: Some("Lord Stark...".into()),
                still_path: Some("/s.jpg".into()),
                air_date: Some("2011-04-17".into()),
                runtime: Some(62),
            },
        );
        assert_eq!(ep.episode_title, "Winter Is Coming");
        assert_eq!(ep.episode_backdrop, "https://image.tmdb.org/t/p/original/s.jpg");
        assert_eq!(ep.episode_released_at, "2011-04-17T05:00:00.000Z");
    }
}
