use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, Extensions, HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use storefront_core::auth::describe_roles;
use storefront_core::Role;
use storefront_db::DbError;
use storefront_supabase::SupabaseClient;
use uuid::Uuid;

use crate::api::ApiError;

/// Request identity used in logs and error envelopes, stored as a request
/// extension by [`request_id`].
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub request_id: String,
    pub method: String,
    pub path: String,
}

impl RequestMeta {
    /// The stored meta, or one built from the request line when the
    /// [`request_id`] layer did not run.
    pub fn from_parts(extensions: &Extensions, method: &Method, uri: &Uri) -> Self {
        extensions.get::<RequestMeta>().cloned().unwrap_or_else(|| Self {
            request_id: String::new(),
            method: method.to_string(),
            path: uri.path().to_owned(),
        })
    }

    pub fn of(req: &Request) -> Self {
        Self::from_parts(req.extensions(), req.method(), req.uri())
    }
}

/// The raw bearer token of an authenticated request.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Route-group gate: the client used to validate tokens and the roles the
/// routes require. An empty role list admits any authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthGate {
    client: SupabaseClient,
    required: &'static [Role],
}

impl AuthGate {
    pub fn authenticated(client: SupabaseClient) -> Self {
        Self {
            client,
            required: &[],
        }
    }

    pub fn requiring(client: SupabaseClient, required: &'static [Role]) -> Self {
        Self { client, required }
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as part of [`RequestMeta`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    let meta = RequestMeta {
        request_id: id.clone(),
        method: req.method().to_string(),
        path: req
            .uri()
            .path_and_query()
            .map_or_else(|| req.uri().path().to_owned(), ToString::to_string),
    };
    req.extensions_mut().insert(meta);

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware resolving the bearer token to an [`storefront_core::Identity`]
/// and enforcing the gate's role requirement.
///
/// Every denial is `401 Unauthorized`, including a role mismatch.
pub async fn authorize(State(gate): State<AuthGate>, mut req: Request, next: Next) -> Response {
    let meta = RequestMeta::of(&req);
    let deny = |message: String| {
        ApiError::new(&meta, StatusCode::UNAUTHORIZED, message).into_response()
    };

    let Some(token) = extract_bearer_token(req.headers().get(AUTHORIZATION)).map(str::to_owned)
    else {
        return deny("Missing authorization header".to_owned());
    };

    let identity = match storefront_db::resolve_identity(&gate.client, &token).await {
        Ok(identity) => identity,
        Err(DbError::Unauthorized(message)) => return deny(message),
        Err(e) => {
            tracing::error!(request_id = %meta.request_id, error = %e, "token validation failed");
            return deny("Authentication failed".to_owned());
        }
    };

    if !identity.satisfies(gate.required) {
        tracing::debug!(
            request_id = %meta.request_id,
            user_id = %identity.id,
            role = ?identity.role,
            "caller lacks required role"
        );
        return deny(format!(
            "Requires one of these roles: {}",
            describe_roles(gate.required)
        ));
    }

    req.extensions_mut().insert(identity);
    req.extensions_mut().insert(BearerToken(token));
    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
