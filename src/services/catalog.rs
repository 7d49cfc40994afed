use std::sync::Arc;

use crate::{
    models::{ContentItem, ContentType, ItemMetadata, ListKind, Membership},
    services::providers::{details_batch, MetadataSource},
};

/// Items of one list, movies first, in stored order
pub fn list_items(membership: &Membership, list: ListKind) -> Vec<ContentItem> {
    ContentType::ALL
        .iter()
        .flat_map(|content_type| {
            membership
                .ids(list, *content_type)
                .iter()
                .map(move |id| ContentItem::new(id, *content_type))
        })
        .collect()
}

/// Display metadata for every item in one list
///
/// Titles that fail to resolve are left out; the rest keep list order.
pub async fn hydrate(
    source: Arc<dyn MetadataSource>,
    membership: &Membership,
    list: ListKind,
) -> Vec<ItemMetadata> {
    let items = list_items(membership, list);
    if items.is_empty() {
        return Vec::new();
    }

    details_batch(source, items).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::models::{BrowseCategory, CastMember, CatalogEntry};

    struct FakeSource;

    #[async_trait::async_trait]
    impl MetadataSource for FakeSource {
        async fn details(&self, item: &ContentItem) -> AppResult<ItemMetadata> {
            if item.id == "missing" {
                return Err(AppError::NotFound(item.id.clone()));
            }
            Ok(ItemMetadata {
                id: item.id.clone(),
                content_type: item.content_type,
                title: format!("Title {}", item.id),
                overview: None,
                poster_path: None,
                backdrop_path: None,
                release_date: None,
                runtime_minutes: None,
                genres: Vec::new(),
                vote_average: None,
            })
        }

        async fn credits(&self, _item: &ContentItem) -> AppResult<Vec<CastMember>> {
            Ok(Vec::new())
        }

        async fn search(&self, _query: &str) -> AppResult<Vec<CatalogEntry>> {
            Ok(Vec::new())
        }

        async fn browse(
            &self,
            _content_type: ContentType,
            _category: BrowseCategory,
        ) -> AppResult<Vec<CatalogEntry>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    #[test]
    fn test_list_items_movies_then_tv() {
        let mut membership = Membership::default();
        membership.watched.tv.insert("10");
        membership.watched.movie.insert("2");
        membership.watched.movie.insert("1");

        let items = list_items(&membership, ListKind::Watched);
        assert_eq!(
            items,
            vec![
                ContentItem::new("2", ContentType::Movie),
                ContentItem::new("1", ContentType::Movie),
                ContentItem::new("10", ContentType::Tv),
            ]
        );
    }

    #[tokio::test]
    async fn test_hydrate_skips_failures_and_keeps_order() {
        let mut membership = Membership::default();
        membership.favorite.movie.insert("3");
        membership.favorite.movie.insert("missing");
        membership.favorite.movie.insert("1");
        membership.favorite.tv.insert("1");

        let items = hydrate(Arc::new(FakeSource), &membership, ListKind::Favorite).await;

        let keys: Vec<(&str, ContentType)> = items
            .iter()
            .map(|m| (m.id.as_str(), m.content_type))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("3", ContentType::Movie),
                ("1", ContentType::Movie),
                ("1", ContentType::Tv)
            ]
        );
    }

    #[tokio::test]
    async fn test_hydrate_empty_list() {
        let items = hydrate(
            Arc::new(FakeSource),
            &Membership::default(),
            ListKind::WatchLater,
        )
        .await;
        assert!(items.is_empty());
    }
}
