pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod tasks;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Assemble the full application router against the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_routes())
        .merge(store_routes())
        .merge(item_routes())
        .merge(tag_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route("/refresh", post(users::refresh))
        .route("/user/:user_id", get(users::user_get).delete(users::user_delete))
}

fn store_routes() -> Router<AppState> {
    use handlers::stores;

    Router::new()
        .route("/store", get(stores::store_list).post(stores::store_post))
        .route(
            "/store/:store_id",
            get(stores::store_get).delete(stores::store_delete),
        )
}

fn item_routes() -> Router<AppState> {
    use handlers::items;

    Router::new()
        .route("/item", get(items::item_list).post(items::item_post))
        .route(
            "/item/:item_id",
            get(items::item_get)
                .put(items::item_put)
                .delete(items::item_delete),
        )
}

fn tag_routes() -> Router<AppState> {
    use handlers::tags;

    Router::new()
        .route(
            "/store/:store_id/tag",
            get(tags::tags_in_store_get).post(tags::tags_in_store_post),
        )
        .route("/tag/:tag_id", get(tags::tag_get).delete(tags::tag_delete))
        .route(
            "/item/:item_id/tag/:tag_id",
            post(tags::link_post).delete(tags::link_delete),
        )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Storehaus API",
            "version": version,
            "description": "E-commerce catalog REST API with JWT authentication",
            "endpoints": {
                "auth": "/register, /login, /logout, /refresh, /user/:id",
                "stores": "/store[/:id], /store/:id/tag",
                "items": "/item[/:id] (protected)",
                "tags": "/tag/:id, /item/:item_id/tag/:tag_id",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match db::health_check(state.pool()).await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": { "status": "degraded", "timestamp": now, "database_error": e.to_string() }
            })),
        ),
    }
}
