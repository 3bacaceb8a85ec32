//! Data operations for the storefront, expressed over the Supabase REST and
//! auth APIs.
//!
//! Every operation is a free `async fn` taking the shared
//! [`SupabaseClient`]; reads use the anon key, catalog mutations the
//! service-role key.

use serde::Serialize;
use storefront_supabase::{SupabaseClient, SupabaseError};
use thiserror::Error;
use uuid::Uuid;

pub mod accounts;
pub mod attributes;
pub mod cart;
pub mod comments;
pub mod products;

pub use accounts::{
    login, logout, register, resolve_identity, seed_user, Credentials, LoginResponse,
    Registration,
};
pub use attributes::{
    create_attribute_type, create_attribute_value, delete_attribute_type, delete_attribute_value,
    get_attribute_type, get_attribute_value, list_attribute_types, list_attribute_values,
    update_attribute_type, update_attribute_value, AttributeTypePatch, AttributeValuePatch,
    NewAttributeType, NewAttributeValue,
};
pub use cart::{
    add_to_cart, clear_cart, get_cart, remove_from_cart, update_cart_item, AddToCart,
    CartItemPatch,
};
pub use comments::{
    create_comment, delete_comment, list_comments, update_comment, CommentPatch, NewComment,
};
pub use products::{
    create_product, delete_product, get_product_detail, list_products, update_product,
    NewProduct, NewVariant, ProductPatch, VariantPatch,
};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Supabase(#[from] SupabaseError),
}

impl DbError {
    pub(crate) fn not_found(message: &str) -> Self {
        Self::NotFound(message.to_owned())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

/// Acknowledgement returned by delete operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub message: String,
    pub id: Uuid,
}

impl Deleted {
    pub(crate) fn new(message: &str, id: Uuid) -> Self {
        Self {
            message: message.to_owned(),
            id,
        }
    }
}

/// A bare `{message}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

/// Verify the REST endpoint is reachable with the anon key.
///
/// # Errors
///
/// Returns [`DbError::Supabase`] if the probe fails.
pub async fn health_check(client: &SupabaseClient) -> Result<(), DbError> {
    client.health_check().await?;
    Ok(())
}

/// Fails unless `value` is zero or greater.
pub(crate) fn ensure_non_negative<T>(field: &str, value: Option<T>) -> Result<(), DbError>
where
    T: PartialOrd + Default,
{
    match value {
        Some(v) if v < T::default() => Err(DbError::invalid(format!(
            "{field} must not be less than 0"
        ))),
        _ => Ok(()),
    }
}

/// Fails if `value` is present but blank.
pub(crate) fn ensure_not_blank(field: &str, value: Option<&str>) -> Result<(), DbError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(DbError::invalid(format!("{field} should not be empty")))
        }
        _ => Ok(()),
    }
}

/// JSON value for an `updated_at` stamp of the current instant.
pub(crate) fn now_stamp() -> serde_json::Value {
    serde_json::Value::String(chrono::Utc::now().to_rfc3339())
}

/// Row shape for queries that only select `id`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct IdRow {
    pub id: Uuid,
}
