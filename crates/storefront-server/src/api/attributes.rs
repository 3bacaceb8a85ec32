use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use storefront_core::{AttributeType, AttributeValue};
use storefront_db::{
    AttributeTypePatch, AttributeValuePatch, Deleted, NewAttributeType, NewAttributeValue,
};

use crate::middleware::RequestMeta;

use super::{map_db_error, parse_uuid, ApiError, ApiJson, AppState};

// ---------------------------------------------------------------------------
// Attribute types
// ---------------------------------------------------------------------------

pub(super) async fn list_types(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
) -> Result<Json<Vec<AttributeType>>, ApiError> {
    storefront_db::list_attribute_types(&state.client)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn get_type(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
) -> Result<Json<AttributeType>, ApiError> {
    let id = parse_uuid(&meta, &id)?;
    storefront_db::get_attribute_type(&state.client, id)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn create_type(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    ApiJson(input): ApiJson<NewAttributeType>,
) -> Result<(StatusCode, Json<AttributeType>), ApiError> {
    let created = storefront_db::create_attribute_type(&state.client, &input)
        .await
        .map_err(|e| map_db_error(&meta, &e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn update_type(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<AttributeTypePatch>,
) -> Result<Json<AttributeType>, ApiError> {
    let id = parse_uuid(&meta, &id)?;
    storefront_db::update_attribute_type(&state.client, id, &patch)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn delete_type(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let id = parse_uuid(&meta, &id)?;
    storefront_db::delete_attribute_type(&state.client, id)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

pub(super) async fn list_values(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(type_id): Path<String>,
) -> Result<Json<Vec<AttributeValue>>, ApiError> {
    let type_id = parse_uuid(&meta, &type_id)?;
    storefront_db::list_attribute_values(&state.client, type_id)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn get_value(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
) -> Result<Json<AttributeValue>, ApiError> {
    let id = parse_uuid(&meta, &id)?;
    storefront_db::get_attribute_value(&state.client, id)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn create_value(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    ApiJson(input): ApiJson<NewAttributeValue>,
) -> Result<(StatusCode, Json<AttributeValue>), ApiError> {
    let created = storefront_db::create_attribute_value(&state.client, &input)
        .await
        .map_err(|e| map_db_error(&meta, &e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn update_value(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<AttributeValuePatch>,
) -> Result<Json<AttributeValue>, ApiError> {
    let id = parse_uuid(&meta, &id)?;
    storefront_db::update_attribute_value(&state.client, id, &patch)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn delete_value(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let id = parse_uuid(&meta, &id)?;
    storefront_db::delete_attribute_value(&state.client, id)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}
