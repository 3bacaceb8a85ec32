use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use storefront_core::{CartItem, CartLine, Identity};
use storefront_db::{AddToCart, CartItemPatch, Deleted, Message};

use crate::middleware::RequestMeta;

use super::{map_db_error, parse_uuid, ApiError, ApiJson, AppState};

pub(super) async fn get_cart(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<CartLine>>, ApiError> {
    storefront_db::get_cart(&state.client, identity.id)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn add_to_cart(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Extension(identity): Extension<Identity>,
    ApiJson(input): ApiJson<AddToCart>,
) -> Result<(StatusCode, Json<CartItem>), ApiError> {
    let item = storefront_db::add_to_cart(&state.client, identity.id, &input)
        .await
        .map_err(|e| map_db_error(&meta, &e))?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub(super) async fn update_cart_item(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Extension(identity): Extension<Identity>,
    Path(item_id): Path<String>,
    ApiJson(patch): ApiJson<CartItemPatch>,
) -> Result<Json<CartItem>, ApiError> {
    let item_id = parse_uuid(&meta, &item_id)?;
    storefront_db::update_cart_item(&state.client, identity.id, item_id, &patch)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Extension(identity): Extension<Identity>,
    Path(item_id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let item_id = parse_uuid(&meta, &item_id)?;
    storefront_db::remove_from_cart(&state.client, identity.id, item_id)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn clear_cart(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Message>, ApiError> {
    storefront_db::clear_cart(&state.client, identity.id)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}
