use axum::{extract::Path, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::models::Tag;
use crate::error::ApiError;
use crate::services::catalog::{CatalogService, TagDetail};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TagCreate {
    pub name: String,
}

/// GET /store/:id/tag
pub async fn tags_in_store_get(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = CatalogService::new(state.pool().clone()).list_tags(store_id).await?;
    Ok(Json(tags))
}

/// POST /store/:id/tag - tag names are unique per store, not globally.
pub async fn tags_in_store_post(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
    Json(body): Json<TagCreate>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let tag = CatalogService::new(state.pool().clone())
        .create_tag(store_id, &body.name)
        .await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// GET /tag/:id
pub async fn tag_get(
    State(state): State<AppState>,
    Path(tag_id): Path<i64>,
) -> Result<Json<TagDetail>, ApiError> {
    let tag = CatalogService::new(state.pool().clone()).get_tag(tag_id).await?;
    Ok(Json(tag))
}

/// DELETE /tag/:id - refused while any item still references the tag.
pub async fn tag_delete(
    State(state): State<AppState>,
    Path(tag_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    CatalogService::new(state.pool().clone()).delete_tag(tag_id).await?;
    Ok(Json(json!({ "message": "Tag deleted." })))
}

/// POST /item/:item_id/tag/:tag_id - links an item and a tag of the same
/// store. Re-linking an already linked pair is a no-op success.
pub async fn link_post(
    State(state): State<AppState>,
    Path((item_id, tag_id)): Path<(i64, i64)>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let tag = CatalogService::new(state.pool().clone())
        .link_tag(item_id, tag_id)
        .await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// DELETE /item/:item_id/tag/:tag_id
pub async fn link_delete(
    State(state): State<AppState>,
    Path((item_id, tag_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, ApiError> {
    let (item, tag) = CatalogService::new(state.pool().clone())
        .unlink_tag(item_id, tag_id)
        .await?;

    Ok(Json(json!({
        "message": "Item removed from tag",
        "item": item,
        "tag": tag,
    })))
}
