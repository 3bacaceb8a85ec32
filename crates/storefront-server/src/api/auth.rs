use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use storefront_core::Identity;
use storefront_db::{Credentials, LoginResponse, Message, Registration};

use crate::middleware::{BearerToken, RequestMeta};

use super::{map_db_error, ApiError, ApiJson, AppState};

#[derive(Debug, Serialize)]
pub(super) struct Profile {
    user: serde_json::Value,
}

pub(super) async fn register(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let registration = storefront_db::register(&state.client, &credentials)
        .await
        .map_err(|e| map_db_error(&meta, &e))?;
    Ok((StatusCode::CREATED, Json(registration)))
}

pub(super) async fn login(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    storefront_db::login(&state.client, &credentials)
        .await
        .map(Json)
        .map_err(|e| map_db_error(&meta, &e))
}

pub(super) async fn logout(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Json<Message> {
    Json(storefront_db::logout(&state.client, &token).await)
}

pub(super) async fn profile(Extension(identity): Extension<Identity>) -> Json<Profile> {
    Json(Profile {
        user: identity.user,
    })
}
