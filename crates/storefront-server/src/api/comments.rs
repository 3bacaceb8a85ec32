use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use storefront_core::{Comment, Identity, Page};
use storefront_db::{Deleted, NewComment};

use crate::middleware::RequestMeta;

use super::{map_db_error, parse_uuid, ApiError, ApiJson, AppState, Paged};

pub(super) async fn list_comments(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(product_id): Path<String>,
    Paged(pagination): Paged,
) -> Result<Json<Page<Comment>>, ApiError> {
    let product_id = parse_uuid(&meta, &product_id)?;
    storefront_db::list_comments(&state.client, product_id, pagination)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn create_comment(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Extension(identity): Extension<Identity>,
    Path(product_id): Path<String>,
    ApiJson(input): ApiJson<NewComment>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let product_id = parse_uuid(&meta, &product_id)?;
    let comment = storefront_db::create_comment(&state.client, product_id, identity.id, &input)
        .await
        .map_err(|e| map_db_error(&meta, &e))?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// The product segment is validated as a UUID but does not scope the lookup.
/// The body is taken as raw JSON so ownership is checked before its shape.
pub(super) async fn update_comment(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Extension(identity): Extension<Identity>,
    Path((product_id, comment_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<Comment>, ApiError> {
    parse_uuid(&meta, &product_id)?;
    let comment_id = parse_uuid(&meta, &comment_id)?;
    storefront_db::update_comment(&state.client, comment_id, identity.id, &body)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn delete_comment(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Extension(identity): Extension<Identity>,
    Path((product_id, comment_id)): Path<(String, String)>,
) -> Result<Json<Deleted>, ApiError> {
    parse_uuid(&meta, &product_id)?;
    let comment_id = parse_uuid(&meta, &comment_id)?;
    storefront_db::delete_comment(&state.client, comment_id, identity.id)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}
