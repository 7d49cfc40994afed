/// TMDB (The Movie Database) provider
///
/// API Flow:
/// 1. Details: /movie/{id} or /tv/{id}
/// 2. Credits: /movie/{id}/credits or /tv/{id}/credits
/// 3. Search: /search/multi (movies, shows and people mixed)
/// 4. Browse rails: now_playing / on_the_air, trending, popular, top_rated, discover by genre
///
/// Every request carries `api_key` and `language` as query parameters.
use crate::{
    error::{AppError, AppResult},
    models::{
        BrowseCategory, CastMember, CatalogEntry, ContentItem, ContentType, ItemMetadata,
        TmdbCredits, TmdbMovie, TmdbPage, TmdbTv,
    },
    services::providers::{MetadataSource, CAST_LIMIT},
};
use reqwest::{Client as HttpClient, StatusCode, Url};
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(api_key: String, api_url: String, language: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
        }
    }

    /// Appends path segments to the base URL, percent-encoding each one
    fn url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| AppError::Internal(format!("Invalid TMDB API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("TMDB API URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a GET and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = self.url(segments)?;
        let path = segments.join("/");

        tracing::debug!(path = %path, "Fetching from TMDB");

        let response = self
            .http_client
            .get(url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB resource {}", path)));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {}: {}",
                status, body
            )));
        }

        let body = response.bytes().await?;
        Self::decode(&path, &body)
    }

    fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> AppResult<T> {
        serde_json::from_slice(body).map_err(|e| {
            tracing::error!(path = %path, error = %e, "Unexpected TMDB response body");
            AppError::from(e)
        })
    }

    /// TMDB ids are numeric; anything else never reaches the URL
    fn tmdb_id(item: &ContentItem) -> AppResult<&str> {
        let id = item.id.as_str();
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::InvalidInput(format!("'{}' is not a TMDB id", id)));
        }
        Ok(id)
    }

    fn item_segments<'a>(item: &'a ContentItem, suffix: Option<&'a str>) -> AppResult<Vec<&'a str>> {
        let mut segments = vec![item.content_type.as_str(), Self::tmdb_id(item)?];
        segments.extend(suffix);
        Ok(segments)
    }
}

/// Splits a fixed endpoint path such as `movie/now_playing`
fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[async_trait::async_trait]
impl MetadataSource for TmdbClient {
    async fn details(&self, item: &ContentItem) -> AppResult<ItemMetadata> {
        let segments = Self::item_segments(item, None)?;
        let metadata: ItemMetadata = match item.content_type {
            ContentType::Movie => self.get_json::<TmdbMovie>(&segments, &[]).await?.into(),
            ContentType::Tv => self.get_json::<TmdbTv>(&segments, &[]).await?.into(),
        };
        Ok(metadata)
    }

    async fn credits(&self, item: &ContentItem) -> AppResult<Vec<CastMember>> {
        let segments = Self::item_segments(item, Some("credits"))?;
        let credits: TmdbCredits = self.get_json(&segments, &[]).await?;

        Ok(credits
            .cast
            .into_iter()
            .take(CAST_LIMIT)
            .map(CastMember::from)
            .collect())
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CatalogEntry>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let page: TmdbPage = self
            .get_json(
                &["search", "multi"],
                &[
                    ("query", query.to_string()),
                    ("page", "1".to_string()),
                    ("include_adult", "false".to_string()),
                ],
            )
            .await?;

        let entries: Vec<CatalogEntry> = page
            .results
            .into_iter()
            .filter_map(|listing| listing.into_entry(None))
            .collect();

        tracing::info!(query = %query, result_count = entries.len(), "TMDB search completed");

        Ok(entries)
    }

    async fn browse(
        &self,
        content_type: ContentType,
        category: BrowseCategory,
    ) -> AppResult<Vec<CatalogEntry>> {
        let (path, query) = category.request(content_type);
        let page: TmdbPage = self.get_json(&path_segments(&path), &query).await?;

        Ok(page
            .results
            .into_iter()
            .filter_map(|listing| listing.into_entry(Some(content_type)))
            .collect())
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
