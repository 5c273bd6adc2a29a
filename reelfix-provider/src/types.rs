use serde::{Deserialize, Deserializer};

// -- Primary (IMDb-style API) --

/// Response from `/search`.
#[derive(Debug, Deserialize)]
pub struct ImdbSearchResponse {
    #[serde(default)]
    pub results: Vec<ImdbSearchHit>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImdbSearchHit {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Title details from `/title/{id}`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ImdbTitle {
    pub id: String,
    pub title: String,
    pub release_detailed: Option<ImdbReleaseDetailed>,
    pub rating: Option<ImdbRating>,
    pub plot: String,
    pub cast: Vec<String>,
    pub runtime: String,
    pub genre: Vec<String>,
    #[serde(rename = "moviedb_id", deserialize_with = "lenient_u64")]
    pub moviedb_id: Option<u64>,
}

impl ImdbTitle {
    pub fn year(&self) -> u32 {
        self.release_detailed
            .as_ref()
            .and_then(|r| r.year)
            .unwrap_or(0)
    }

    pub fn star_rating(&self) -> f64 {
        self.rating.as_ref().and_then(|r| r.star).unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ImdbReleaseDetailed {
    pub year: Option<u32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ImdbRating {
    pub star: Option<f64>,
}

/// Episode details from `/title/{id}/season/{s}/episode/{e}`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ImdbEpisode {
    pub title: String,
    pub plot: String,
    pub image: String,
    pub released: String,
}

// -- Secondary (TMDB v3) --

#[derive(Debug, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbSearchHit>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TmdbSearchHit {
    pub id: u64,
}

/// Movie or TV details with `external_ids,credits,images` appended.
///
/// Movies use `title`/`release_date`/`runtime`; shows use
/// `name`/`first_air_date`/`episode_run_time`. Both shapes land here.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TmdbDetails {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub imdb_id: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f64>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub genres: Vec<TmdbGenre>,
    pub runtime: Option<u32>,
    pub episode_run_time: Vec<u32>,
    /// TV only; its `runtime` is preferred over `episode_run_time`
    pub last_episode_to_air: Option<TmdbEpisode>,
    pub external_ids: Option<TmdbExternalIds>,
    pub credits: Option<TmdbCredits>,
    pub images: Option<TmdbImages>,
}

impl TmdbDetails {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    /// Year of the first release or first air date.
    pub fn year(&self) -> u32 {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
            .unwrap_or(0)
    }

    /// IMDb id from `external_ids`, falling back to the top-level field.
    pub fn imdb_id(&self) -> Option<String> {
        self.external_ids
            .as_ref()
            .and_then(|e| e.imdb_id.clone())
            .or_else(|| self.imdb_id.clone())
            .filter(|id| !id.is_empty())
    }

    pub fn cast_names(&self) -> Vec<String> {
        self.credits
            .as_ref()
            .map(|c| {
                c.cast
                    .iter()
                    .filter_map(|m| m.name.clone().or_else(|| m.original_name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TmdbGenre {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TmdbExternalIds {
    pub imdb_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TmdbCredits {
    pub cast: Vec<TmdbCastMember>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TmdbCastMember {
    pub name: Option<String>,
    pub original_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TmdbImages {
    pub logos: Vec<TmdbImage>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TmdbImage {
    pub iso_639_1: Option<String>,
    pub file_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TmdbEpisode {
    pub name: Option<String>,
    pub overview: Option<String>,
    pub still_path: Option<String>,
    pub air_date: Option<String>,
    pub runtime: Option<u32>,
}

/// Accepts `123`, `"123"`, `""` or `null`.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    }
    .filter(|&n| n != 0))
}
