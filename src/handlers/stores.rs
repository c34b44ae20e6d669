use axum::{extract::Path, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::models::Store;
use crate::error::ApiError;
use crate::services::catalog::{CatalogService, StoreDetail};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StoreCreate {
    pub name: String,
}

/// POST /store
pub async fn store_post(
    State(state): State<AppState>,
    Json(body): Json<StoreCreate>,
) -> Result<(StatusCode, Json<Store>), ApiError> {
    let store = CatalogService::new(state.pool().clone())
        .create_store(&body.name)
        .await?;
    Ok((StatusCode::CREATED, Json(store)))
}

/// GET /store
pub async fn store_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoreDetail>>, ApiError> {
    let stores = CatalogService::new(state.pool().clone()).list_stores().await?;
    Ok(Json(stores))
}

/// GET /store/:id
pub async fn store_get(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> Result<Json<StoreDetail>, ApiError> {
    let store = CatalogService::new(state.pool().clone())
        .get_store(store_id)
        .await?;
    Ok(Json(store))
}

/// DELETE /store/:id - cascades to the store's items and tags.
pub async fn store_delete(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    CatalogService::new(state.pool().clone())
        .delete_store(store_id)
        .await?;
    Ok(Json(json!({ "message": "Store deleted." })))
}
