mod attributes;
mod auth;
mod cart;
mod comments;
mod products;

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request, State},
    http::{header, request::Parts, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put, MethodRouter},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use storefront_core::{Pagination, Role};
use storefront_db::DbError;
use storefront_supabase::{SupabaseClient, SupabaseError};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::middleware::{authorize, request_id, AuthGate, RequestMeta};

const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[derive(Clone)]
pub struct AppState {
    pub client: SupabaseClient,
}

/// Error envelope: `{statusCode, timestamp, path, method, message, error}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    status_code: u16,
    timestamp: DateTime<Utc>,
    path: String,
    method: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    supabase: &'static str,
}

impl ApiError {
    pub fn new(meta: &RequestMeta, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            status_code: status.as_u16(),
            timestamp: Utc::now(),
            path: meta.path.clone(),
            method: meta.method.clone(),
            message: message.into(),
            error: status.canonical_reason(),
        }
    }

    pub fn bad_request(meta: &RequestMeta, message: impl Into<String>) -> Self {
        Self::new(meta, StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(meta: &RequestMeta, error: &DbError) -> ApiError {
    match error {
        DbError::NotFound(message) => ApiError::new(meta, StatusCode::NOT_FOUND, message),
        DbError::InvalidRequest(message) => ApiError::bad_request(meta, message),
        DbError::Forbidden(message) => ApiError::new(meta, StatusCode::FORBIDDEN, message),
        DbError::Unauthorized(message) => ApiError::new(meta, StatusCode::UNAUTHORIZED, message),
        DbError::Supabase(
            e @ (SupabaseError::Api { .. }
            | SupabaseError::Http(_)
            | SupabaseError::UnexpectedRowCount { .. }),
        ) => {
            tracing::warn!(request_id = %meta.request_id, error = %e, "store request rejected");
            ApiError::bad_request(meta, e.to_string())
        }
        DbError::Supabase(e) => {
            tracing::error!(request_id = %meta.request_id, error = %e, "store request failed");
            ApiError::new(meta, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Parses a path segment as a UUID, answering 400 otherwise.
pub(super) fn parse_uuid(meta: &RequestMeta, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::bad_request(meta, "Validation failed (uuid is expected)"))
}

/// JSON body extractor whose rejections use the [`ApiError`] envelope.
pub(super) struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let meta = RequestMeta::of(&req);
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::bad_request(
                &meta,
                format!("Validation failed: {}", rejection.body_text()),
            )),
        }
    }
}

/// `?offset=&limit=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub(super) struct PageQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// Validated pagination extracted from the query string.
pub(super) struct Paged(pub Pagination);

impl<S> FromRequestParts<S> for Paged
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let meta = RequestMeta::from_parts(&parts.extensions, &parts.method, &parts.uri);
        let Query(query) = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::bad_request(&meta, format!("Validation failed: {}", rejection.body_text()))
            })?;
        Pagination::from_query(query.offset, query.limit)
            .map(Self)
            .map_err(|e| ApiError::bad_request(&meta, e.to_string()))
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/products", get(products::list_products))
        .route("/api/products/{id}", get(products::get_product))
        .route("/api/products/{id}/comments", get(comments::list_comments))
        .route("/api/attributes/types", get(attributes::list_types))
        .route("/api/attributes/types/{id}", get(attributes::get_type))
        .route(
            "/api/attributes/types/{id}/values",
            get(attributes::list_values),
        )
        .route("/api/attributes/values/{id}", get(attributes::get_value))
}

/// Puts `route` behind `gate`. Methods the path does not serve still
/// answer 405.
fn gated(gate: &AuthGate, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(axum::middleware::from_fn_with_state(gate.clone(), authorize))
}

fn authenticated_router(client: SupabaseClient) -> Router<AppState> {
    let gate = AuthGate::authenticated(client);
    Router::new()
        .route("/api/auth/logout", gated(&gate, post(auth::logout)))
        .route("/api/auth/profile", gated(&gate, get(auth::profile)))
        .route(
            "/api/products/{id}/comments",
            gated(&gate, post(comments::create_comment)),
        )
        .route(
            "/api/products/{id}/comments/{comment_id}",
            gated(
                &gate,
                put(comments::update_comment).delete(comments::delete_comment),
            ),
        )
        .route(
            "/api/cart",
            gated(&gate, get(cart::get_cart).delete(cart::clear_cart)),
        )
        .route("/api/cart/add", gated(&gate, post(cart::add_to_cart)))
        .route(
            "/api/cart/{item_id}",
            gated(
                &gate,
                put(cart::update_cart_item).delete(cart::remove_from_cart),
            ),
        )
}

fn admin_router(client: SupabaseClient) -> Router<AppState> {
    let gate = AuthGate::requiring(client, ADMIN_ONLY);
    Router::new()
        .route("/api/products", gated(&gate, post(products::create_product)))
        .route(
            "/api/products/{id}",
            gated(
                &gate,
                put(products::update_product).delete(products::delete_product),
            ),
        )
        .route(
            "/api/attributes/types",
            gated(&gate, post(attributes::create_type)),
        )
        .route(
            "/api/attributes/types/{id}",
            gated(
                &gate,
                put(attributes::update_type).delete(attributes::delete_type),
            ),
        )
        .route(
            "/api/attributes/values",
            gated(&gate, post(attributes::create_value)),
        )
        .route(
            "/api/attributes/values/{id}",
            gated(
                &gate,
                put(attributes::update_value).delete(attributes::delete_value),
            ),
        )
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(public_router())
        .merge(authenticated_router(state.client.clone()))
        .merge(admin_router(state.client.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match storefront_db::health_check(&state.client).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                supabase: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: supabase unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    supabase: "unavailable",
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
