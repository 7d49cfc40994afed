//! Content metadata provider abstraction
//!
//! Metadata only enriches what the client displays. Membership truth always
//! comes from the user's document, never from a provider.
use std::sync::Arc;

use tracing::instrument;

use crate::{
    error::AppResult,
    models::{BrowseCategory, CastMember, CatalogEntry, ContentItem, ContentType, ItemMetadata},
};

pub mod tmdb;

pub use tmdb::TmdbClient;

/// Maximum number of cast members returned for a title
pub const CAST_LIMIT: usize = 10;

/// Trait for read-only movie/TV metadata sources
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Full details for one movie or show
    async fn details(&self, item: &ContentItem) -> AppResult<ItemMetadata>;

    /// Top-billed cast, at most [`CAST_LIMIT`] entries
    async fn credits(&self, item: &ContentItem) -> AppResult<Vec<CastMember>>;

    /// Movies and shows matching a free-text query
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogEntry>>;

    /// One browse rail (new releases, trending, ...)
    async fn browse(
        &self,
        content_type: ContentType,
        category: BrowseCategory,
    ) -> AppResult<Vec<CatalogEntry>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Fetches details for many items in parallel
///
/// Keeps the items that resolved and logs the rest; a list screen still
/// renders when one title cannot be fetched.
#[instrument(skip(source, items), fields(provider = source.name(), item_count = items.len()))]
pub async fn details_batch(
    source: Arc<dyn MetadataSource>,
    items: Vec<ContentItem>,
) -> Vec<ItemMetadata> {
    let mut tasks = Vec::with_capacity(items.len());

    for item in items {
        let source = Arc::clone(&source);
        let task = tokio::spawn(async move {
            let result = source.details(&item).await;
            (item, result)
        });
        tasks.push(task);
    }

    let mut results = Vec::new();
    let mut error_count = 0;

    for task in tasks {
        match task.await {
            Ok((_, Ok(metadata))) => results.push(metadata),
            Ok((item, Err(e))) => {
                tracing::error!(
                    item_id = %item.id,
                    content_type = %item.content_type,
                    error = %e,
                    "Metadata fetch failed for title"
                );
                error_count += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "Task join error");
                error_count += 1;
            }
        }
    }

    if error_count > 0 {
        tracing::warn!(
            success_count = results.len(),
            error_count,
            "Partial metadata fetch failure"
        );
    }

    results
}
