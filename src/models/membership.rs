use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ContentItem, ContentType, ListKind};

/// Ordered, duplicate-free collection of item identifiers
///
/// Keeps insertion order so persisted arrays stay in the order the user built
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct IdSet(Vec<String>);

impl IdSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|existing| existing == id)
    }

    /// Adds an identifier, returning `false` if it was already present
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Removes an identifier, returning `false` if it was absent
    pub fn remove(&mut self, id: &str) -> bool {
        match self.0.iter().position(|existing| existing == id) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for IdSet {
    fn from(ids: Vec<String>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<IdSet> for Vec<String> {
    fn from(set: IdSet) -> Self {
        set.0
    }
}

impl FromIterator<String> for IdSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = IdSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// One list's identifiers, split by content type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListIds {
    #[serde(default)]
    pub movie: IdSet,
    #[serde(default)]
    pub tv: IdSet,
}

impl ListIds {
    pub fn ids(&self, content_type: ContentType) -> &IdSet {
        match content_type {
            ContentType::Movie => &self.movie,
            ContentType::Tv => &self.tv,
        }
    }

    pub fn ids_mut(&mut self, content_type: ContentType) -> &mut IdSet {
        match content_type {
            ContentType::Movie => &mut self.movie,
            ContentType::Tv => &mut self.tv,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.movie.is_empty() && self.tv.is_empty()
    }

    /// Value stored under the list's document field
    pub fn to_value(&self) -> Value {
        json!({
            "movie": self.movie.as_slice(),
            "tv": self.tv.as_slice(),
        })
    }
}

/// Canonical membership: list × content type × identifier set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    #[serde(default)]
    pub favorite: ListIds,
    #[serde(default)]
    pub watched: ListIds,
    #[serde(default)]
    pub watch_later: ListIds,
}

impl Membership {
    pub fn list(&self, kind: ListKind) -> &ListIds {
        match kind {
            ListKind::Favorite => &self.favorite,
            ListKind::Watched => &self.watched,
            ListKind::WatchLater => &self.watch_later,
        }
    }

    pub fn list_mut(&mut self, kind: ListKind) -> &mut ListIds {
        match kind {
            ListKind::Favorite => &mut self.favorite,
            ListKind::Watched => &mut self.watched,
            ListKind::WatchLater => &mut self.watch_later,
        }
    }

    pub fn ids(&self, kind: ListKind, content_type: ContentType) -> &IdSet {
        self.list(kind).ids(content_type)
    }

    pub fn contains(&self, kind: ListKind, item: &ContentItem) -> bool {
        self.ids(kind, item.content_type).contains(&item.id)
    }

    /// Which lists currently hold the item
    pub fn status(&self, item: &ContentItem) -> ItemStatus {
        ItemStatus {
            favorite: self.contains(ListKind::Favorite, item),
            watched: self.contains(ListKind::Watched, item),
            watch_later: self.contains(ListKind::WatchLater, item),
        }
    }

    pub fn is_empty(&self) -> bool {
        ListKind::ALL.iter().all(|kind| self.list(*kind).is_empty())
    }

    /// Document fields for all three lists in the nested shape
    pub fn to_document(&self) -> Value {
        let mut fields = serde_json::Map::new();
        for kind in ListKind::ALL {
            fields.insert(kind.field_name().to_string(), self.list(kind).to_value());
        }
        Value::Object(fields)
    }
}

/// Membership flags of a single item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatus {
    pub favorite: bool,
    pub watched: bool,
    pub watch_later: bool,
}

impl ItemStatus {
    pub fn get(&self, kind: ListKind) -> bool {
        match kind {
            ListKind::Favorite => self.favorite,
            ListKind::Watched => self.watched,
            ListKind::WatchLater => self.watch_later,
        }
    }

    pub fn set(&mut self, kind: ListKind, value: bool) {
        match kind {
            ListKind::Favorite => self.favorite = value,
            ListKind::Watched => self.watched = value,
            ListKind::WatchLater => self.watch_later = value,
        }
    }

    /// Flags after toggling `kind`, with the exclusivity rules applied
    ///
    /// - favoriting also marks the item watched and drops it from watch-later
    /// - marking watched drops watch-later; unmarking watched drops favorite
    /// - saving for later drops favorite and watched
    pub fn toggled(self, kind: ListKind) -> ItemStatus {
        let desired = !self.get(kind);
        let mut next = self;
        next.set(kind, desired);

        match (kind, desired) {
            (ListKind::Favorite, true) => {
                next.watched = true;
                next.watch_later = false;
            }
            (ListKind::Watched, true) => next.watch_later = false,
            (ListKind::Watched, false) => next.favorite = false,
            (ListKind::WatchLater, true) => {
                next.favorite = false;
                next.watched = false;
            }
            (ListKind::Favorite, false) | (ListKind::WatchLater, false) => {}
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(favorite: bool, watched: bool, watch_later: bool) -> ItemStatus {
        ItemStatus {
            favorite,
            watched,
            watch_later,
        }
    }

    #[test]
    fn test_id_set_insert_is_idempotent() {
        let mut ids = IdSet::new();
        assert!(ids.insert("42"));
        assert!(!ids.insert("42"));
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_id_set_keeps_insertion_order() {
        let ids: IdSet = vec!["3".to_string(), "1".to_string(), "3".to_string(), "2".to_string()]
            .into_iter()
            .collect();
        assert_eq!(ids.as_slice(), &["3", "1", "2"]);
    }

    #[test]
    fn test_id_set_remove_absent() {
        let mut ids = IdSet::from(vec!["1".to_string()]);
        assert!(!ids.remove("2"));
        assert!(ids.remove("1"));
        assert!(ids.is_empty());
    }

    #[test]
    fn test_id_set_deserialize_dedupes() {
        let ids: IdSet = serde_json::from_str(r#"["7","7","8"]"#).unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_membership_document_shape() {
        let mut membership = Membership::default();
        membership.list_mut(ListKind::WatchLater).tv.insert("1399");

        let doc = membership.to_document();
        assert_eq!(doc["watchLaterList"]["tv"], json!(["1399"]));
        assert_eq!(doc["favoriteList"], json!({"movie": [], "tv": []}));
    }

    #[test]
    fn test_status_reads_all_lists() {
        let mut membership = Membership::default();
        membership.favorite.movie.insert("42");
        membership.watched.movie.insert("42");

        let item = ContentItem::new("42", ContentType::Movie);
        assert_eq!(membership.status(&item), status(true, true, false));

        let tv_item = ContentItem::new("42", ContentType::Tv);
        assert_eq!(membership.status(&tv_item), ItemStatus::default());
    }

    #[test]
    fn test_toggle_favorite_on_forces_watched_and_clears_watch_later() {
        let next = status(false, true, true).toggled(ListKind::Favorite);
        assert_eq!(next, status(true, true, false));
    }

    #[test]
    fn test_toggle_favorite_off_leaves_others() {
        let next = status(true, true, false).toggled(ListKind::Favorite);
        assert_eq!(next, status(false, true, false));
    }

    #[test]
    fn test_toggle_watch_later_on_clears_favorite_and_watched() {
        let next = status(true, false, false).toggled(ListKind::WatchLater);
        assert_eq!(next, status(false, false, true));
    }

    #[test]
    fn test_toggle_watched_off_when_only_flag() {
        let next = status(false, true, false).toggled(ListKind::Watched);
        assert_eq!(next, status(false, false, false));
    }

    #[test]
    fn test_toggle_watched_off_clears_favorite() {
        let next = status(true, true, false).toggled(ListKind::Watched);
        assert_eq!(next, status(false, false, false));
    }

    #[test]
    fn test_toggle_watched_on_clears_watch_later() {
        let next = status(false, false, true).toggled(ListKind::Watched);
        assert_eq!(next, status(false, true, false));
    }

    #[test]
    fn test_toggle_watch_later_off_leaves_others() {
        let next = status(false, false, true).toggled(ListKind::WatchLater);
        assert_eq!(next, ItemStatus::default());
    }
}
