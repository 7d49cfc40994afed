use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Account
        .route("/users/:user_id", put(handlers::provision_user))
        // Lists
        .route("/users/:user_id/lists", get(handlers::get_lists))
        .route(
            "/users/:user_id/status/:content_type/:item_id",
            get(handlers::get_item_status),
        )
        .route("/users/:user_id/lists/:list", post(handlers::add_to_list))
        .route(
            "/users/:user_id/lists/:list/:content_type/:item_id",
            delete(handlers::remove_from_list),
        )
        .route(
            "/users/:user_id/lists/:list/toggle",
            post(handlers::toggle_list),
        )
        .route(
            "/users/:user_id/lists/:list/details",
            get(handlers::get_list_details),
        )
        // Settings
        .route(
            "/users/:user_id/preferences",
            get(handlers::get_preferences).patch(handlers::update_preferences),
        )
        // Metadata
        .route("/titles/search", get(handlers::search_titles))
        .route("/titles/:content_type/:id", get(handlers::get_title))
        .route(
            "/titles/:content_type/:id/credits",
            get(handlers::get_title_credits),
        )
        .route(
            "/browse/:content_type/:category",
            get(handlers::browse),
        )
}
