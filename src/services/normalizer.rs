//! Reads list membership out of user documents written by any app version
//!
//! Two persisted shapes exist:
//!
//! - nested: `favoriteList`, `watchedList`, `watchLaterList`, each
//!   `{movie: [id, ...], tv: [id, ...]}`
//! - legacy: `favoriteMovies`, `favoriteTVShows`, `watchedMovies`, ... holding
//!   full item objects (or, from some builds, bare ids)
//!
//! The shape is detected per list. A list's nested field, when present, is
//! authoritative and its legacy fields are ignored, so writing the nested
//! field is enough to retire the legacy data for that list. Nothing here
//! fails: missing or malformed data reads as empty.
use serde_json::{Map, Value};

use crate::models::{ContentType, IdSet, ListIds, ListKind, Membership};

/// Where one list's data was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    Nested,
    Legacy,
    Missing,
}

/// Summary of which shapes a document uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    Nested,
    Legacy,
    Mixed,
    Empty,
}

/// Produces the canonical membership for a raw document
pub fn normalize(doc: Option<&Value>) -> Membership {
    let mut membership = Membership::default();
    let Some(fields) = doc.and_then(Value::as_object) else {
        return membership;
    };

    for kind in ListKind::ALL {
        *membership.list_mut(kind) = read_list(fields, kind);
    }

    membership
}

/// Classifies a document by the shapes its lists use
pub fn detect_shape(doc: Option<&Value>) -> DocumentShape {
    let Some(fields) = doc.and_then(Value::as_object) else {
        return DocumentShape::Empty;
    };

    let sources: Vec<ListSource> = ListKind::ALL
        .iter()
        .map(|kind| list_source(fields, *kind))
        .filter(|source| *source != ListSource::Missing)
        .collect();

    match sources.first() {
        None => DocumentShape::Empty,
        Some(first) if sources.iter().any(|s| s != first) => DocumentShape::Mixed,
        Some(ListSource::Nested) => DocumentShape::Nested,
        Some(_) => DocumentShape::Legacy,
    }
}

fn list_source(fields: &Map<String, Value>, kind: ListKind) -> ListSource {
    if fields.get(kind.field_name()).is_some_and(Value::is_object) {
        return ListSource::Nested;
    }

    let has_legacy = ContentType::ALL.iter().any(|content_type| {
        fields
            .get(kind.legacy_field_name(*content_type))
            .is_some_and(Value::is_array)
    });

    if has_legacy {
        ListSource::Legacy
    } else {
        ListSource::Missing
    }
}

fn read_list(fields: &Map<String, Value>, kind: ListKind) -> ListIds {
    let mut list = ListIds::default();

    match list_source(fields, kind) {
        ListSource::Nested => {
            let nested = &fields[kind.field_name()];
            for content_type in ContentType::ALL {
                collect_ids(nested.get(content_type.as_str()), list.ids_mut(content_type));
            }
        }
        ListSource::Legacy => {
            for content_type in ContentType::ALL {
                collect_ids(
                    fields.get(kind.legacy_field_name(content_type)),
                    list.ids_mut(content_type),
                );
            }
        }
        ListSource::Missing => {}
    }

    list
}

fn collect_ids(value: Option<&Value>, into: &mut IdSet) {
    let Some(entries) = value.and_then(Value::as_array) else {
        return;
    };

    for entry in entries {
        if let Some(id) = entry_id(entry) {
            into.insert(id);
        }
    }
}

/// Identifier of one array entry: a bare id or an object with an `id`
fn entry_id(entry: &Value) -> Option<String> {
    match entry {
        Value::Object(item) => item.get("id").and_then(scalar_id),
        other => scalar_id(other),
    }
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
