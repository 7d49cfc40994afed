use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::ContentType;

/// Display metadata for a movie or TV show returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    pub id: String,
    pub content_type: ContentType,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub runtime_minutes: Option<u32>,
    pub genres: Vec<String>,
    pub vote_average: Option<f64>,
}

/// A cast credit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub id: String,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

/// Compact search or browse result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub content_type: ContentType,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub vote_average: Option<f64>,
}

/// Browse rails offered on the movie and TV screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowseCategory {
    NewReleases,
    Trending,
    Popular,
    TopRated,
    Action,
    Comedy,
}

impl BrowseCategory {
    /// TMDB path and extra query parameters for this rail
    pub fn request(&self, content_type: ContentType) -> (String, Vec<(&'static str, String)>) {
        let kind = content_type.as_str();
        match self {
            BrowseCategory::NewReleases => {
                let path = match content_type {
                    ContentType::Movie => "movie/now_playing",
                    ContentType::Tv => "tv/on_the_air",
                };
                (path.to_string(), vec![("page", "1".to_string())])
            }
            BrowseCategory::Trending => (format!("trending/{}/day", kind), vec![]),
            BrowseCategory::Popular => (format!("{}/popular", kind), vec![("page", "1".to_string())]),
            BrowseCategory::TopRated => {
                (format!("{}/top_rated", kind), vec![("page", "1".to_string())])
            }
            BrowseCategory::Action => {
                // TV has no plain "Action" genre, only "Action & Adventure"
                let genre = match content_type {
                    ContentType::Movie => "28",
                    ContentType::Tv => "10759",
                };
                (format!("discover/{}", kind), vec![("with_genres", genre.to_string())])
            }
            BrowseCategory::Comedy => (
                format!("discover/{}", kind),
                vec![("with_genres", "35".to_string())],
            ),
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// TMDB sends `""` for unknown dates
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

/// Raw response from GET /movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl From<TmdbMovie> for ItemMetadata {
    fn from(movie: TmdbMovie) -> Self {
        ItemMetadata {
            id: movie.id.to_string(),
            content_type: ContentType::Movie,
            title: movie.title,
            overview: movie.overview.filter(|o| !o.is_empty()),
            poster_path: movie.poster_path,
            backdrop_path: movie.backdrop_path,
            release_date: movie.release_date,
            runtime_minutes: movie.runtime.filter(|r| *r > 0),
            genres: movie.genres.into_iter().map(|g| g.name).collect(),
            vote_average: movie.vote_average,
        }
    }
}

/// Raw response from GET /tv/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTv {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub first_air_date: Option<NaiveDate>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl From<TmdbTv> for ItemMetadata {
    fn from(show: TmdbTv) -> Self {
        ItemMetadata {
            id: show.id.to_string(),
            content_type: ContentType::Tv,
            title: show.name,
            overview: show.overview.filter(|o| !o.is_empty()),
            poster_path: show.poster_path,
            backdrop_path: show.backdrop_path,
            release_date: show.first_air_date,
            runtime_minutes: show.episode_run_time.first().copied(),
            genres: show.genres.into_iter().map(|g| g.name).collect(),
            vote_average: show.vote_average,
        }
    }
}

/// Raw response from GET /{type}/{id}/credits
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCast>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCast {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl From<TmdbCast> for CastMember {
    fn from(cast: TmdbCast) -> Self {
        CastMember {
            id: cast.id.to_string(),
            name: cast.name,
            character: cast.character.filter(|c| !c.is_empty()),
            profile_path: cast.profile_path,
        }
    }
}

/// One page of search or browse results
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbListing>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbListing {
    pub id: u64,
    /// Only present on multi-search and trending results
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub first_air_date: Option<NaiveDate>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl TmdbListing {
    /// Converts a listing, dropping people and anything else that is not a
    /// movie or show. `fallback` types listings from single-type endpoints.
    pub fn into_entry(self, fallback: Option<ContentType>) -> Option<CatalogEntry> {
        let content_type = match self.media_type.as_deref() {
            Some("movie") => ContentType::Movie,
            Some("tv") => ContentType::Tv,
            Some(_) => return None,
            None => fallback?,
        };

        let title = self.title.or(self.name)?;

        Some(CatalogEntry {
            id: self.id.to_string(),
            content_type,
            title,
            poster_path: self.poster_path,
            release_date: self.release_date.or(self.first_air_date),
            vote_average: self.vote_average,
        })
    }
}
