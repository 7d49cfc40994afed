use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{AppError, AppResult};

pub mod membership;
pub mod metadata;
pub mod preferences;

pub use membership::{IdSet, ItemStatus, ListIds, Membership};
pub use metadata::{
    BrowseCategory, CastMember, CatalogEntry, ItemMetadata, TmdbCredits, TmdbMovie, TmdbPage,
    TmdbTv,
};
pub use preferences::{PreferencesUpdate, UserPreferences};

/// Identifier of the user that owns a document
///
/// Every store, engine and service call receives one explicitly; nothing reads
/// a "current user" from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Parses a user id, rejecting blank values
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidInput("user id must not be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Tv,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [ContentType::Movie, ContentType::Tv];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Tv => "tv",
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three personal lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListKind {
    Favorite,
    Watched,
    WatchLater,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [ListKind::Favorite, ListKind::Watched, ListKind::WatchLater];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Favorite => "favorite",
            ListKind::Watched => "watched",
            ListKind::WatchLater => "watchLater",
        }
    }

    /// Document field holding this list as `{movie: [...], tv: [...]}`
    pub fn field_name(&self) -> &'static str {
        match self {
            ListKind::Favorite => "favoriteList",
            ListKind::Watched => "watchedList",
            ListKind::WatchLater => "watchLaterList",
        }
    }

    /// Older flat field holding full item objects for one content type
    pub fn legacy_field_name(&self, content_type: ContentType) -> &'static str {
        match (self, content_type) {
            (ListKind::Favorite, ContentType::Movie) => "favoriteMovies",
            (ListKind::Favorite, ContentType::Tv) => "favoriteTVShows",
            (ListKind::Watched, ContentType::Movie) => "watchedMovies",
            (ListKind::Watched, ContentType::Tv) => "watchedTVShows",
            (ListKind::WatchLater, ContentType::Movie) => "watchLaterMovies",
            (ListKind::WatchLater, ContentType::Tv) => "watchLaterTVShows",
        }
    }
}

impl Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A movie or TV show as far as list membership is concerned
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Provider-assigned identifier
    pub id: String,
    pub content_type: ContentType,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            id: id.into(),
            content_type,
        }
    }

    /// Trims the identifier and rejects blank ones
    pub fn validated(self) -> AppResult<Self> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(AppError::InvalidInput("item id must not be empty".to_string()));
        }
        Ok(Self::new(id, self.content_type))
    }
}
