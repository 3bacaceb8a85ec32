//! Response types for the Supabase auth (GoTrue) and PostgREST APIs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account as returned by the auth API.
///
/// Only the fields this service reads are typed; everything else is kept in
/// `extra` so the object can be echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl User {
    /// The `role` entry of `user_metadata`, if it is a string.
    #[must_use]
    pub fn role_claim(&self) -> Option<&str> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.get("role"))
            .and_then(serde_json::Value::as_str)
    }
}

/// Tokens issued by a successful password sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: User,
}

/// PostgREST error body: `{code, message, details, hint}`.
#[derive(Debug, Deserialize)]
pub(crate) struct PostgrestErrorBody {
    pub message: Option<String>,
}

/// Auth API error bodies come in several shapes depending on the endpoint
/// and server version.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthErrorBody {
    pub msg: Option<String>,
    pub message: Option<String>,
    pub error_description: Option<String>,
    pub error: Option<String>,
}

impl AuthErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}
