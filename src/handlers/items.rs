use axum::{extract::Path, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::db::models::Item;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::catalog::{CatalogService, ItemDetail, ItemUpsert, NewItem};
use crate::state::AppState;

/// POST /item - requires a fresh access token. A write that violates a
/// storage constraint (for example a nonexistent store_id) surfaces as a
/// server error, not a validation error.
pub async fn item_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<NewItem>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    if !user.fresh {
        return Err(ApiError::unauthorized("Fresh token required."));
    }

    let item = CatalogService::new(state.pool().clone()).create_item(body).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /item
pub async fn item_list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<ItemDetail>>, ApiError> {
    let items = CatalogService::new(state.pool().clone()).list_items().await?;
    Ok(Json(items))
}

/// GET /item/:id
pub async fn item_get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(item_id): Path<i64>,
) -> Result<Json<ItemDetail>, ApiError> {
    let item = CatalogService::new(state.pool().clone()).get_item(item_id).await?;
    Ok(Json(item))
}

/// PUT /item/:id - upsert by client-supplied key: updates name and price
/// if the item exists, creates it under that id otherwise.
pub async fn item_put(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(body): Json<ItemUpsert>,
) -> Result<Json<Item>, ApiError> {
    let item = CatalogService::new(state.pool().clone())
        .upsert_item(item_id, body)
        .await?;
    Ok(Json(item))
}

/// DELETE /item/:id - admin only.
pub async fn item_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !user.is_admin {
        return Err(ApiError::unauthorized("Admin privilege required."));
    }

    CatalogService::new(state.pool().clone()).delete_item(item_id).await?;
    Ok(Json(json!({ "message": "Item deleted." })))
}
