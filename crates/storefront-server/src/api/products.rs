use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use storefront_core::{Page, Product, ProductDetail};
use storefront_db::{Deleted, NewProduct, ProductPatch};

use crate::middleware::RequestMeta;

use super::{map_db_error, parse_uuid, ApiError, ApiJson, AppState, Paged};

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Paged(pagination): Paged,
) -> Result<Json<Page<Product>>, ApiError> {
    storefront_db::list_products(&state.client, pagination)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>, ApiError> {
    let id = parse_uuid(&meta, &id)?;
    storefront_db::get_product_detail(&state.client, id)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    ApiJson(input): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<ProductDetail>), ApiError> {
    let detail = storefront_db::create_product(&state.client, &input)
        .await
        .map_err(|e| map_db_error(&meta, &e))?;
    tracing::info!(
        request_id = %meta.request_id,
        product_id = %detail.product.id,
        "product created"
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> Result<Json<ProductDetail>, ApiError> {
    let id = parse_uuid(&meta, &id)?;
    storefront_db::update_product(&state.client, id, &patch)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let id = parse_uuid(&meta, &id)?;
    storefront_db::delete_product(&state.client, id)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}
