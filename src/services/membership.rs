//! List membership transitions
//!
//! Pure functions: each takes the current canonical membership and returns the
//! next one together with the merge writes that persist it. Nothing here
//! touches a store.
//!
//! `add` and `remove` are raw operations that never apply the exclusivity
//! rules, for imports and the "remove" button on list screens. `toggle` is
//! the policy operation used by the detail screens.
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{ContentItem, ContentType, IdSet, ItemStatus, ListIds, ListKind, Membership};

/// A list field for one content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSlot {
    pub list: ListKind,
    pub content_type: ContentType,
}

/// Merge write for one list field
///
/// The store replaces the field wholesale, so the write carries the list's
/// complete post-mutation value for both content types, not a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListWrite {
    pub list: ListKind,
    /// Content type whose identifiers changed
    pub content_type: ContentType,
    pub value: ListIds,
}

impl ListWrite {
    fn snapshot(state: &Membership, list: ListKind, content_type: ContentType) -> Self {
        Self {
            list,
            content_type,
            value: state.list(list).clone(),
        }
    }

    pub fn slot(&self) -> ListSlot {
        ListSlot {
            list: self.list,
            content_type: self.content_type,
        }
    }

    /// Identifiers of the changed content type after the write
    pub fn ids(&self) -> &IdSet {
        self.value.ids(self.content_type)
    }

    /// Document fields to merge
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(self.list.field_name().to_string(), self.value.to_value());
        fields
    }
}

/// Result of applying one operation to a membership
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub item: ContentItem,
    pub before: ItemStatus,
    pub after: ItemStatus,
    /// Proposed membership once every write lands
    pub state: Membership,
    /// One write per list whose membership of the item changed
    pub writes: Vec<ListWrite>,
}

impl Transition {
    pub fn is_noop(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Inserts the item into one list; no-op if already present
pub fn add(state: &Membership, item: &ContentItem, list: ListKind) -> Transition {
    let mut next = state.clone();
    let mut writes = Vec::new();

    if next.list_mut(list).ids_mut(item.content_type).insert(item.id.clone()) {
        writes.push(ListWrite::snapshot(&next, list, item.content_type));
    }

    finish(state, next, item, writes)
}

/// Removes the identifier from one list; no-op if absent
pub fn remove(
    state: &Membership,
    item_id: &str,
    list: ListKind,
    content_type: ContentType,
) -> Transition {
    let item = ContentItem::new(item_id, content_type);
    let mut next = state.clone();
    let mut writes = Vec::new();

    if next.list_mut(list).ids_mut(content_type).remove(item_id) {
        writes.push(ListWrite::snapshot(&next, list, content_type));
    }

    finish(state, next, &item, writes)
}

/// Flips the item's membership of `list` and applies the exclusivity rules
///
/// See [`ItemStatus::toggled`] for the rules. Every list whose flag differs
/// between before and after gets an independent add or remove and one write.
pub fn toggle(state: &Membership, item: &ContentItem, list: ListKind) -> Transition {
    let before = state.status(item);
    let after = before.toggled(list);

    let mut next = state.clone();
    let mut writes = Vec::new();

    for kind in ListKind::ALL {
        if before.get(kind) == after.get(kind) {
            continue;
        }

        let ids = next.list_mut(kind).ids_mut(item.content_type);
        if after.get(kind) {
            ids.insert(item.id.clone());
        } else {
            ids.remove(&item.id);
        }

        writes.push(ListWrite::snapshot(&next, kind, item.content_type));
    }

    finish(state, next, item, writes)
}

fn finish(
    state: &Membership,
    next: Membership,
    item: &ContentItem,
    writes: Vec<ListWrite>,
) -> Transition {
    Transition {
        item: item.clone(),
        before: state.status(item),
        after: next.status(item),
        state: next,
        writes,
    }
}
