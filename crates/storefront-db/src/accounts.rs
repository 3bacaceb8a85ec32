//! Account registration, sessions, and token resolution over the auth API.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use storefront_core::{Identity, Role};
use storefront_supabase::{SupabaseClient, SupabaseError, User};

use crate::{DbError, Message};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

const MIN_PASSWORD_CHARS: usize = 6;

/// Body of `POST /api/auth/register` and `POST /api/auth/login`.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl Credentials {
    fn validate(&self, min_password_chars: usize) -> Result<(), DbError> {
        if !EMAIL.is_match(self.email.trim()) {
            return Err(DbError::invalid("email must be an email"));
        }
        if self.password.is_empty() {
            return Err(DbError::invalid("password should not be empty"));
        }
        if self.password.chars().count() < min_password_chars {
            return Err(DbError::invalid(format!(
                "password must be longer than or equal to {min_password_chars} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Creates a customer account.
///
/// # Errors
///
/// Returns [`DbError::InvalidRequest`] on a malformed email or a password
/// shorter than six characters, or [`DbError::Supabase`] carrying the
/// provider's message when sign-up is refused.
pub async fn register(
    client: &SupabaseClient,
    credentials: &Credentials,
) -> Result<Registration, DbError> {
    credentials.validate(MIN_PASSWORD_CHARS)?;

    let user = client
        .auth()
        .sign_up(
            credentials.email.trim(),
            &credentials.password,
            serde_json::json!({ "role": Role::Customer }),
        )
        .await?;

    tracing::info!(user_id = %user.id, "registered customer account");
    Ok(Registration {
        message: "Registration successful".to_owned(),
        user,
    })
}

/// Exchanges credentials for access and refresh tokens.
///
/// # Errors
///
/// Returns [`DbError::InvalidRequest`] on malformed input, or
/// [`DbError::Unauthorized`] with the provider's message when the
/// credentials are rejected.
pub async fn login(
    client: &SupabaseClient,
    credentials: &Credentials,
) -> Result<LoginResponse, DbError> {
    credentials.validate(1)?;

    let session = client
        .auth()
        .sign_in_with_password(credentials.email.trim(), &credentials.password)
        .await
        .map_err(|e| match e {
            SupabaseError::Api { message, .. } => DbError::Unauthorized(message),
            other => DbError::Supabase(other),
        })?;

    Ok(LoginResponse {
        message: "Login successful".to_owned(),
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        user: session.user,
    })
}

/// Revokes the sessions behind `access_token`. Never fails: a refused or
/// unreachable sign-out is logged and reported as success.
pub async fn logout(client: &SupabaseClient, access_token: &str) -> Message {
    if let Err(e) = client.auth().admin_sign_out(access_token).await {
        tracing::warn!(error = %e, "sign-out failed; reporting logout anyway");
    }
    Message::new("Logout successful")
}

/// Resolves a bearer token to the caller's identity.
///
/// # Errors
///
/// Returns [`DbError::Unauthorized`] (`"Invalid token"`) when the provider
/// rejects the token, or [`DbError::Supabase`] when it cannot be reached or
/// answers unexpectedly.
pub async fn resolve_identity(
    client: &SupabaseClient,
    access_token: &str,
) -> Result<Identity, DbError> {
    let user = client
        .auth()
        .get_user(access_token)
        .await
        .map_err(|e| match e {
            SupabaseError::Api { status, .. } if (400..500).contains(&status) => {
                DbError::Unauthorized("Invalid token".to_owned())
            }
            other => DbError::Supabase(other),
        })?;

    Ok(identity_from_user(user))
}

/// Creates a confirmed account with `role`, bypassing email verification.
///
/// # Errors
///
/// Returns [`DbError::Supabase`] with the provider's message when the
/// account cannot be created (e.g. it already exists).
pub async fn seed_user(
    client: &SupabaseClient,
    email: &str,
    password: &str,
    role: Role,
) -> Result<User, DbError> {
    let user = client
        .auth()
        .admin_create_user(email, password, serde_json::json!({ "role": role }))
        .await?;
    Ok(user)
}

fn identity_from_user(user: User) -> Identity {
    let role = user.role_claim().and_then(|claim| claim.parse::<Role>().ok());
    let json = serde_json::to_value(&user).unwrap_or(serde_json::Value::Null);
    Identity {
        id: user.id,
        email: user.email,
        role,
        user: json,
    }
}
