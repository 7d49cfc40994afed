use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Map, Value};

use movie_explorer::{
    api::{create_router, AppState},
    db::{DocumentStore, MemoryStore},
    error::{AppError, AppResult},
    models::{
        BrowseCategory, CastMember, CatalogEntry, ContentItem, ContentType, ItemMetadata, UserId,
    },
    services::{MetadataSource, ReadFailurePolicy},
};

struct FakeMetadata;

#[async_trait::async_trait]
impl MetadataSource for FakeMetadata {
    async fn details(&self, item: &ContentItem) -> AppResult<ItemMetadata> {
        if item.id == "404" {
            return Err(AppError::NotFound(format!("{} {}", item.content_type, item.id)));
        }
        Ok(ItemMetadata {
            id: item.id.clone(),
            content_type: item.content_type,
            title: format!("Title {}", item.id),
            overview: Some("An overview".to_string()),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            runtime_minutes: Some(120),
            genres: vec!["Drama".to_string()],
            vote_average: Some(7.5),
        })
    }

    async fn credits(&self, _item: &ContentItem) -> AppResult<Vec<CastMember>> {
        Ok(vec![CastMember {
            id: "6384".to_string(),
            name: "Keanu Reeves".to_string(),
            character: Some("Neo".to_string()),
            profile_path: None,
        }])
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CatalogEntry>> {
        Ok(vec![CatalogEntry {
            id: "603".to_string(),
            content_type: ContentType::Movie,
            title: format!("{} result", query),
            poster_path: None,
            release_date: None,
            vote_average: None,
        }])
    }

    async fn browse(
        &self,
        content_type: ContentType,
        _category: BrowseCategory,
    ) -> AppResult<Vec<CatalogEntry>> {
        Ok(vec![CatalogEntry {
            id: "1".to_string(),
            content_type,
            title: "Rail entry".to_string(),
            poster_path: None,
            release_date: None,
            vote_average: None,
        }])
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Memory store whose writes to one list field always fail
#[derive(Clone)]
struct FlakyStore {
    inner: MemoryStore,
    failing_field: &'static str,
}

#[async_trait::async_trait]
impl DocumentStore for FlakyStore {
    async fn read(&self, user_id: &UserId) -> AppResult<Option<Value>> {
        self.inner.read(user_id).await
    }

    async fn merge_write(&self, user_id: &UserId, fields: Map<String, Value>) -> AppResult<()> {
        if fields.contains_key(self.failing_field) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.merge_write(user_id, fields).await
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

fn server_with_store(store: Arc<dyn DocumentStore>) -> TestServer {
    let state = AppState::new(store, Arc::new(FakeMetadata), ReadFailurePolicy::Abort);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn create_test_server() -> (TestServer, MemoryStore) {
    let store = MemoryStore::new();
    (server_with_store(Arc::new(store.clone())), store)
}

fn user() -> UserId {
    UserId::parse("user-1").unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (server, _) = create_test_server();
    let response = server.get("/health").await;
    let header = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(header.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_provision_then_lists_are_empty() {
    let (server, _) = create_test_server();

    let response = server
        .put("/api/v1/users/user-1")
        .json(&json!({ "email": "ana@example.com" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.assert_json(&json!({ "created": true }));

    let response = server.put("/api/v1/users/user-1").json(&json!({})).await;
    response.assert_status_ok();
    response.assert_json(&json!({ "created": false }));

    let response = server.get("/api/v1/users/user-1/lists").await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "favorite": { "movie": [], "tv": [] },
        "watched": { "movie": [], "tv": [] },
        "watchLater": { "movie": [], "tv": [] }
    }));
}

#[tokio::test]
async fn test_toggle_flow_for_item_42() {
    let (server, store) = create_test_server();

    let response = server
        .post("/api/v1/users/user-1/lists/favorite/toggle")
        .json(&json!({ "id": "42", "contentType": "movie" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["outcome"], "applied");
    assert_eq!(
        body["status"],
        json!({ "favorite": true, "watched": true, "watchLater": false })
    );
    assert_eq!(body["written"].as_array().unwrap().len(), 2);

    let response = server
        .post("/api/v1/users/user-1/lists/watchLater/toggle")
        .json(&json!({ "id": "42", "contentType": "movie" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["status"],
        json!({ "favorite": false, "watched": false, "watchLater": true })
    );
    assert_eq!(body["written"].as_array().unwrap().len(), 3);

    let response = server.get("/api/v1/users/user-1/status/movie/42").await;
    response.assert_json(&json!({ "favorite": false, "watched": false, "watchLater": true }));

    let doc = store.read(&user()).await.unwrap().unwrap();
    assert_eq!(doc["watchLaterList"], json!({ "movie": ["42"], "tv": [] }));
    assert_eq!(doc["favoriteList"], json!({ "movie": [], "tv": [] }));
}

#[tokio::test]
async fn test_raw_add_and_remove() {
    let (server, _) = create_test_server();

    let response = server
        .post("/api/v1/users/user-1/lists/watched")
        .json(&json!({ "id": "1399", "contentType": "tv" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["lists"]["watched"]["tv"], json!(["1399"]));
    assert_eq!(
        body["status"],
        json!({ "favorite": false, "watched": true, "watchLater": false })
    );

    // Adding again writes nothing
    let response = server
        .post("/api/v1/users/user-1/lists/watched")
        .json(&json!({ "id": "1399", "contentType": "tv" }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["written"], json!([]));

    let response = server
        .delete("/api/v1/users/user-1/lists/watched/tv/1399")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["lists"]["watched"]["tv"], json!([]));
}

#[tokio::test]
async fn test_legacy_document_is_normalized() {
    let (server, store) = create_test_server();
    store
        .seed(
            &user(),
            json!({
                "favoriteMovies": [{ "id": 603, "title": "The Matrix" }],
                "watchLaterTVShows": [{ "id": "1399" }]
            }),
        )
        .await
        .unwrap();

    let response = server.get("/api/v1/users/user-1/lists").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["favorite"]["movie"], json!(["603"]));
    assert_eq!(body["watchLater"]["tv"], json!(["1399"]));
}

#[tokio::test]
async fn test_partial_write_failure_returns_207_and_previous_state() {
    let store = FlakyStore {
        inner: MemoryStore::new(),
        failing_field: "watchedList",
    };
    let server = server_with_store(Arc::new(store.clone()));

    let response = server
        .post("/api/v1/users/user-1/lists/favorite/toggle")
        .json(&json!({ "id": "42", "contentType": "movie" }))
        .await;
    response.assert_status(StatusCode::MULTI_STATUS);

    let body: Value = response.json();
    assert_eq!(body["outcome"], "partial");
    assert_eq!(
        body["status"],
        json!({ "favorite": false, "watched": false, "watchLater": false })
    );
    assert_eq!(body["failed"][0]["list"], "watched");
    assert_eq!(body["failed"][0]["contentType"], "movie");

    // The favorite write landed on its own
    let doc = store.inner.read(&user()).await.unwrap().unwrap();
    assert_eq!(doc["favoriteList"]["movie"], json!(["42"]));
    assert!(doc.get("watchedList").is_none());
}

#[tokio::test]
async fn test_total_write_failure_returns_502() {
    let store = FlakyStore {
        inner: MemoryStore::new(),
        failing_field: "watchLaterList",
    };
    let server = server_with_store(Arc::new(store));

    let response = server
        .post("/api/v1/users/user-1/lists/watchLater/toggle")
        .json(&json!({ "id": "7", "contentType": "tv" }))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["outcome"], "failed");
    assert_eq!(body["written"], json!([]));
}

#[tokio::test]
async fn test_invalid_path_values_are_rejected() {
    let (server, _) = create_test_server();

    let response = server
        .post("/api/v1/users/user-1/lists/queue/toggle")
        .json(&json!({ "id": "42", "contentType": "movie" }))
        .await;
    response.assert_status_bad_request();

    let response = server
        .post("/api/v1/users/user-1/lists/favorite/toggle")
        .json(&json!({ "id": "  ", "contentType": "movie" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_list_details_skip_unresolved_titles() {
    let (server, store) = create_test_server();
    store
        .seed(
            &user(),
            json!({ "favoriteList": { "movie": ["603", "404"], "tv": ["1399"] } }),
        )
        .await
        .unwrap();

    let response = server.get("/api/v1/users/user-1/lists/favorite/details").await;
    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    let ids: Vec<&str> = items.iter().map(|i| i["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["603", "1399"]);
}

#[tokio::test]
async fn test_preferences_round_trip() {
    let (server, store) = create_test_server();
    store
        .seed(&user(), json!({ "username": "ana", "pushToken": "tok" }))
        .await
        .unwrap();

    let response = server.get("/api/v1/users/user-1/preferences").await;
    response.assert_status_ok();
    let prefs: Value = response.json();
    assert_eq!(prefs["userName"], "ana");
    assert_eq!(prefs["pushToken"], "tok");

    let response = server
        .patch("/api/v1/users/user-1/preferences")
        .json(&json!({ "darkMode": true }))
        .await;
    response.assert_status_ok();
    let prefs: Value = response.json();
    assert_eq!(prefs["darkMode"], true);
    assert_eq!(prefs["userName"], "ana");

    let response = server
        .patch("/api/v1/users/user-1/preferences")
        .json(&json!({ "email": "not-an-email" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_metadata_endpoints() {
    let (server, _) = create_test_server();

    let response = server
        .get("/api/v1/titles/search")
        .add_query_param("q", "matrix")
        .await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results[0]["title"], "matrix result");

    let response = server.get("/api/v1/titles/movie/603").await;
    response.assert_status_ok();
    let details: Value = response.json();
    assert_eq!(details["contentType"], "movie");
    assert_eq!(details["runtimeMinutes"], 120);

    let response = server.get("/api/v1/titles/movie/404").await;
    response.assert_status_not_found();

    let response = server.get("/api/v1/titles/tv/1399/credits").await;
    response.assert_status_ok();
    let cast: Vec<Value> = response.json();
    assert_eq!(cast[0]["character"], "Neo");

    let response = server.get("/api/v1/browse/tv/top_rated").await;
    response.assert_status_ok();
    let rail: Vec<Value> = response.json();
    assert_eq!(rail[0]["contentType"], "tv");
}
