use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{
        Path, Query, Request, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use pantry_core::matcher::MatchOptions;
use pantry_core::service::PantryService;
use pantry_core::store::SettingsStore;

const BODY_LIMIT: usize = 16 * 1024; // 16 KB

pub(crate) type SharedStore = Box<dyn SettingsStore + Send>;

#[derive(Clone)]
struct AppState {
    service: Arc<Mutex<PantryService<SharedStore>>>,
}

impl AppState {
    fn service(&self) -> MutexGuard<'_, PantryService<SharedStore>> {
        self.service
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    lenient: Option<bool>,
}

#[derive(Serialize)]
struct FavoriteResponse {
    id: i64,
    favorite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

#[derive(Serialize)]
struct RemoveResponse {
    id: i64,
    removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                tracing::error!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Handlers ---

async fn search_recipes(
    State(state): State<AppState>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Query(params) = params?;
    let svc = state.service();
    let options = match params.lenient {
        Some(true) => MatchOptions::lenient(),
        Some(false) => MatchOptions::default(),
        None => svc.match_options(),
    };
    let cards = svc.search_with(&params.q, options);
    let value = serde_json::to_value(&cards).context("failed to serialize recipes")?;
    Ok(Json(value))
}

async fn get_recipe(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Path(id) = id?;
    let svc = state.service();
    let card = svc
        .recipe(id)
        .ok_or_else(|| ApiError::NotFound(format!("Recipe with id {id} not found")))?;
    let value = serde_json::to_value(&card).context("failed to serialize recipe")?;
    Ok(Json(value))
}

async fn list_favorites(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let svc = state.service();
    let value =
        serde_json::to_value(svc.favorite_recipes()).context("failed to serialize favorites")?;
    Ok(Json(value))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    let Path(id) = id?;
    let mut svc = state.service();
    require_recipe(&svc, id)?;
    let favorite = svc.toggle_favorite(id);
    let warning = svc.take_write_error().map(|e| e.to_string());
    Ok(Json(FavoriteResponse {
        id,
        favorite,
        warning,
    }))
}

async fn add_favorite(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    let Path(id) = id?;
    let mut svc = state.service();
    require_recipe(&svc, id)?;
    svc.add_favorite(id);
    let warning = svc.take_write_error().map(|e| e.to_string());
    Ok(Json(FavoriteResponse {
        id,
        favorite: true,
        warning,
    }))
}

// Ids missing from the catalog are accepted here so stale favorites can be cleared.
async fn remove_favorite(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<RemoveResponse>, ApiError> {
    let Path(id) = id?;
    let mut svc = state.service();
    let removed = svc.remove_favorite(id);
    let warning = svc.take_write_error().map(|e| e.to_string());
    Ok(Json(RemoveResponse {
        id,
        removed,
        warning,
    }))
}

fn require_recipe(svc: &PantryService<SharedStore>, id: i64) -> Result<(), ApiError> {
    if svc.catalog().contains(id) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("Recipe with id {id} not found")))
    }
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/recipes", get(search_recipes))
        .route("/api/recipes/{id}", get(get_recipe))
        .route("/api/favorites", get(list_favorites))
        .route(
            "/api/favorites/{id}",
            put(add_favorite).delete(remove_favorite),
        )
        .route("/api/favorites/{id}/toggle", post(toggle_favorite))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(
    service: PantryService<SharedStore>,
    port: u16,
    bind: &str,
) -> anyhow::Result<()> {
    let state = AppState {
        service: Arc::new(Mutex::new(service)),
    };

    let app = build_router(state);

    if bind != "127.0.0.1" && bind != "localhost" {
        tracing::warn!(
            "Listening on {bind}. Any device on your network can read and change your favorites."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("failed to bind {bind}:{port}"))?;
    tracing::info!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use pantry_core::catalog::Catalog;
    use pantry_core::favorites::FAVORITES_KEY;
    use pantry_core::store::MemoryStore;
    use tower::ServiceExt;

    fn test_state(store: MemoryStore) -> AppState {
        let store: SharedStore = Box::new(store);
        AppState {
            service: Arc::new(Mutex::new(PantryService::new(Catalog::builtin(), store))),
        }
    }

    fn test_app() -> Router {
        build_router(test_state(MemoryStore::new()))
    }

    async fn send(app: Router, request: axum::http::Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    fn get_req(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::get(uri).body(Body::empty()).unwrap()
    }

    fn ids(json: &serde_json::Value) -> Vec<i64> {
        json.as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn search_filters_by_all_ingredients() {
        let (status, json) = send(test_app(), get_req("/api/recipes?q=Tomato,%20Basil")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&json), [1, 2]);
        assert_eq!(json[0]["favorite"], false);
        assert_eq!(json[0]["name"], "Margherita Pizza");
    }

    #[tokio::test]
    async fn search_without_query_returns_catalog() {
        let (status, json) = send(test_app(), get_req("/api/recipes")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&json), (1..=9).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn search_no_match_returns_empty_list() {
        let (status, json) =
            send(test_app(), get_req("/api/recipes?q=cheese,nonexistent")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn search_lenient_skips_empty_tokens() {
        let app = test_app();
        let (_, strict) = send(app.clone(), get_req("/api/recipes?q=tomato,,basil")).await;
        assert_eq!(strict, serde_json::json!([]));

        let (_, lenient) = send(app, get_req("/api/recipes?q=tomato,,basil&lenient=true")).await;
        assert_eq!(ids(&lenient), [1, 2]);
    }

    #[tokio::test]
    async fn get_recipe_by_id() {
        let (status, json) = send(test_app(), get_req("/api/recipes/3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Grilled Cheese Sandwich");

        let (status, json) = send(test_app(), get_req("/api/recipes/99")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Recipe with id 99 not found");
    }

    #[tokio::test]
    async fn toggle_flow_updates_favorites_and_search() {
        let state = test_state(MemoryStore::new());
        let app = build_router(state.clone());

        let toggle = || {
            axum::http::Request::post("/api/favorites/4/toggle")
                .body(Body::empty())
                .unwrap()
        };

        let (status, json) = send(app.clone(), toggle()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "id": 4, "favorite": true }));

        let (_, favorites) = send(app.clone(), get_req("/api/favorites")).await;
        assert_eq!(ids(&favorites), [4]);

        let (_, results) = send(app.clone(), get_req("/api/recipes?q=garlic")).await;
        assert_eq!(results[0]["id"], 4);
        assert_eq!(results[0]["favorite"], true);
        assert_eq!(results[1]["favorite"], false);

        let (_, json) = send(app.clone(), toggle()).await;
        assert_eq!(json["favorite"], false);
        let (_, favorites) = send(app, get_req("/api/favorites")).await;
        assert_eq!(favorites, serde_json::json!([]));

        let svc = state.service();
        assert_eq!(svc.store().get(FAVORITES_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn toggle_unknown_recipe_returns_404() {
        let state = test_state(MemoryStore::new());
        let app = build_router(state.clone());
        let (status, _) = send(
            app,
            axum::http::Request::post("/api/favorites/42/toggle")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(state.service().favorite_ids().is_empty());
    }

    #[tokio::test]
    async fn put_favorite_is_idempotent() {
        let state = test_state(MemoryStore::new());
        let app = build_router(state.clone());
        for _ in 0..2 {
            let (status, json) = send(
                app.clone(),
                axum::http::Request::put("/api/favorites/7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["favorite"], true);
        }
        assert_eq!(state.service().favorite_ids(), [7]);
    }

    #[tokio::test]
    async fn delete_favorite_tolerates_dangling_and_absent_ids() {
        let state = test_state(MemoryStore::new().with_value(FAVORITES_KEY, "[99,2]"));
        let app = build_router(state.clone());

        let delete = |uri: &str| axum::http::Request::delete(uri).body(Body::empty()).unwrap();

        // Dangling id is hidden from the list but can still be removed
        let (_, favorites) = send(app.clone(), get_req("/api/favorites")).await;
        assert_eq!(ids(&favorites), [2]);

        let (status, json) = send(app.clone(), delete("/api/favorites/99")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "id": 99, "removed": true }));

        let (_, json) = send(app, delete("/api/favorites/5")).await;
        assert_eq!(json["removed"], false);
        assert_eq!(state.service().favorite_ids(), [2]);
    }

    #[tokio::test]
    async fn malformed_recipe_id_is_json_bad_request() {
        let (status, json) = send(test_app(), get_req("/api/recipes/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("abc"));

        let toggle = axum::http::Request::post("/api/favorites/pizza/toggle")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(test_app(), toggle).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn malformed_query_is_json_bad_request() {
        let (status, json) = send(test_app(), get_req("/api/recipes?lenient=maybe")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn body_size_limit_rejects_oversized() {
        let state = test_state(MemoryStore::new());
        let app = build_router(state.clone());

        let big_body = vec![b'x'; BODY_LIMIT + 1];
        let response = app
            .oneshot(
                axum::http::Request::put("/api/favorites/1")
                    .header("content-type", "application/json")
                    .header("content-length", big_body.len())
                    .body(Body::from(big_body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(state.service().favorite_ids().is_empty());
    }

    #[tokio::test]
    async fn security_headers_present() {
        let response = test_app().oneshot(get_req("/api/recipes")).await.unwrap();

        let headers = response.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(
            headers.get("content-security-policy").unwrap(),
            "default-src 'none'"
        );
    }
}
