use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{
        BrowseCategory, CastMember, CatalogEntry, ContentItem, ContentType, ItemMetadata,
        ItemStatus, ListKind, Membership, PreferencesUpdate, UserId, UserPreferences,
    },
    services::{
        catalog,
        lists::{FailedSlot, Mutation, WriteOutcome},
        membership::ListSlot,
    },
};

use super::AppState;

// Request/Response types

#[derive(Debug, Default, Deserialize)]
pub struct ProvisionRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    pub created: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

/// Result of one list mutation as the client sees it
///
/// `status` and `lists` are the proposed state when every write landed and
/// the state read before the mutation otherwise.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub outcome: &'static str,
    pub item: ContentItem,
    pub status: ItemStatus,
    pub lists: Membership,
    pub written: Vec<ListSlot>,
    pub failed: Vec<FailedSlot>,
}

impl From<&Mutation> for MutationResponse {
    fn from(mutation: &Mutation) -> Self {
        Self {
            outcome: mutation.outcome.label(),
            item: mutation.transition.item.clone(),
            status: mutation.visible_status(),
            lists: mutation.visible_state().clone(),
            written: mutation.outcome.written().to_vec(),
            failed: mutation.outcome.failed().iter().map(FailedSlot::from).collect(),
        }
    }
}

fn mutation_response(mutation: &Mutation) -> (StatusCode, Json<MutationResponse>) {
    let status = match mutation.outcome {
        WriteOutcome::Applied { .. } => StatusCode::OK,
        WriteOutcome::Partial { .. } => StatusCode::MULTI_STATUS,
        WriteOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    };
    (status, Json(MutationResponse::from(mutation)))
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Creates the user's document on first sign-in
pub async fn provision_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<ProvisionRequest>,
) -> AppResult<(StatusCode, Json<ProvisionResponse>)> {
    let user_id = UserId::parse(&user_id)?;
    let created = state.profile.provision(&user_id, request.email).await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ProvisionResponse { created })))
}

/// Canonical membership of all three lists
pub async fn get_lists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Membership>> {
    let user_id = UserId::parse(&user_id)?;
    Ok(Json(state.lists.load(&user_id).await?))
}

/// Which lists hold one item
pub async fn get_item_status(
    State(state): State<AppState>,
    Path((user_id, content_type, item_id)): Path<(String, ContentType, String)>,
) -> AppResult<Json<ItemStatus>> {
    let user_id = UserId::parse(&user_id)?;
    let item = ContentItem::new(item_id, content_type).validated()?;
    Ok(Json(state.lists.status(&user_id, &item).await?))
}

/// Adds an item to one list without touching the others
pub async fn add_to_list(
    State(state): State<AppState>,
    Path((user_id, list)): Path<(String, ListKind)>,
    Json(item): Json<ContentItem>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    let user_id = UserId::parse(&user_id)?;
    let item = item.validated()?;
    let mutation = state.lists.add(&user_id, &item, list).await?;
    Ok(mutation_response(&mutation))
}

/// Removes an item from one list without touching the others
pub async fn remove_from_list(
    State(state): State<AppState>,
    Path((user_id, list, content_type, item_id)): Path<(String, ListKind, ContentType, String)>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    let user_id = UserId::parse(&user_id)?;
    let item = ContentItem::new(item_id, content_type).validated()?;
    let mutation = state
        .lists
        .remove(&user_id, &item.id, list, item.content_type)
        .await?;
    Ok(mutation_response(&mutation))
}

/// Toggles an item's membership of a list, applying the exclusivity rules
pub async fn toggle_list(
    State(state): State<AppState>,
    Path((user_id, list)): Path<(String, ListKind)>,
    Json(item): Json<ContentItem>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    let user_id = UserId::parse(&user_id)?;
    let item = item.validated()?;
    let mutation = state.lists.toggle(&user_id, &item, list).await?;
    Ok(mutation_response(&mutation))
}

/// One list with display metadata for each item
pub async fn get_list_details(
    State(state): State<AppState>,
    Path((user_id, list)): Path<(String, ListKind)>,
) -> AppResult<Json<Vec<ItemMetadata>>> {
    let user_id = UserId::parse(&user_id)?;
    let membership = state.lists.load(&user_id).await?;
    let items = catalog::hydrate(state.metadata.clone(), &membership, list).await;
    Ok(Json(items))
}

pub async fn get_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserPreferences>> {
    let user_id = UserId::parse(&user_id)?;
    Ok(Json(state.profile.preferences(&user_id).await?))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(update): Json<PreferencesUpdate>,
) -> AppResult<Json<UserPreferences>> {
    let user_id = UserId::parse(&user_id)?;
    Ok(Json(state.profile.update_preferences(&user_id, &update).await?))
}

/// Handler for title search endpoint
pub async fn search_titles(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CatalogEntry>>> {
    let entries = state.metadata.search(&params.q).await?;
    Ok(Json(entries))
}

pub async fn get_title(
    State(state): State<AppState>,
    Path((content_type, id)): Path<(ContentType, String)>,
) -> AppResult<Json<ItemMetadata>> {
    let item = ContentItem::new(id, content_type).validated()?;
    Ok(Json(state.metadata.details(&item).await?))
}

pub async fn get_title_credits(
    State(state): State<AppState>,
    Path((content_type, id)): Path<(ContentType, String)>,
) -> AppResult<Json<Vec<CastMember>>> {
    let item = ContentItem::new(id, content_type).validated()?;
    Ok(Json(state.metadata.credits(&item).await?))
}

pub async fn browse(
    State(state): State<AppState>,
    Path((content_type, category)): Path<(ContentType, BrowseCategory)>,
) -> AppResult<Json<Vec<CatalogEntry>>> {
    Ok(Json(state.metadata.browse(content_type, category).await?))
}
