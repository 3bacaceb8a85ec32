//! The attribute vocabulary: types (e.g. `color`) and their values
//! (e.g. `red`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use storefront_core::{AttributeType, AttributeValue};
use storefront_supabase::SupabaseClient;
use uuid::Uuid;

use crate::{ensure_not_blank, now_stamp, DbError, Deleted};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttributeType {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeTypePatch {
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttributeValue {
    pub attribute_type_id: Uuid,
    pub value: String,
    pub display_value: String,
    pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValuePatch {
    pub display_value: Option<String>,
    pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Serialize)]
struct AttributeTypeInsert<'a> {
    name: &'a str,
    display_name: &'a str,
}

#[derive(Debug, Serialize)]
struct AttributeValueInsert<'a> {
    attribute_type_id: Uuid,
    value: &'a str,
    display_value: &'a str,
    metadata: &'a BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Attribute types
// ---------------------------------------------------------------------------

/// All attribute types ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Supabase`] if the query fails.
pub async fn list_attribute_types(client: &SupabaseClient) -> Result<Vec<AttributeType>, DbError> {
    let rows = client
        .table("attribute_types")
        .select("*")
        .order("name", true)
        .execute()
        .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no type has `id`.
pub async fn get_attribute_type(client: &SupabaseClient, id: Uuid) -> Result<AttributeType, DbError> {
    client
        .table("attribute_types")
        .select("*")
        .eq("id", id)
        .maybe_single()
        .await?
        .ok_or_else(|| DbError::not_found("Attribute type not found"))
}

/// # Errors
///
/// Returns [`DbError::InvalidRequest`] on blank fields, or
/// [`DbError::Supabase`] if the insert fails (e.g. a duplicate name).
pub async fn create_attribute_type(
    client: &SupabaseClient,
    input: &NewAttributeType,
) -> Result<AttributeType, DbError> {
    ensure_not_blank("name", Some(&input.name))?;
    ensure_not_blank("displayName", Some(&input.display_name))?;

    let row = client
        .admin_table("attribute_types")
        .insert(&[AttributeTypeInsert {
            name: &input.name,
            display_name: &input.display_name,
        }])?
        .select("*")
        .single()
        .await?;
    Ok(row)
}

/// Renames a type's display name. The machine `name` is immutable.
///
/// # Errors
///
/// Returns [`DbError::InvalidRequest`] on a blank display name,
/// [`DbError::NotFound`] if no type has `id`, or [`DbError::Supabase`] if
/// the update fails.
pub async fn update_attribute_type(
    client: &SupabaseClient,
    id: Uuid,
    patch: &AttributeTypePatch,
) -> Result<AttributeType, DbError> {
    ensure_not_blank("displayName", Some(&patch.display_name))?;
    get_attribute_type(client, id).await?;

    let row = client
        .admin_table("attribute_types")
        .update(&serde_json::json!({
            "display_name": patch.display_name,
            "updated_at": now_stamp(),
        }))?
        .eq("id", id)
        .select("*")
        .single()
        .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no type has `id`, or
/// [`DbError::Supabase`] if the delete fails.
pub async fn delete_attribute_type(client: &SupabaseClient, id: Uuid) -> Result<Deleted, DbError> {
    get_attribute_type(client, id).await?;

    client
        .admin_table("attribute_types")
        .delete()
        .eq("id", id)
        .execute::<serde_json::Value>()
        .await?;
    Ok(Deleted::new("Attribute type deleted successfully", id))
}

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

/// Values of one type ordered by value.
///
/// # Errors
///
/// Returns [`DbError::Supabase`] if the query fails.
pub async fn list_attribute_values(
    client: &SupabaseClient,
    type_id: Uuid,
) -> Result<Vec<AttributeValue>, DbError> {
    let rows = client
        .table("attribute_values")
        .select("*")
        .eq("attribute_type_id", type_id)
        .order("value", true)
        .execute()
        .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no value has `id`.
pub async fn get_attribute_value(client: &SupabaseClient, id: Uuid) -> Result<AttributeValue, DbError> {
    client
        .table("attribute_values")
        .select("*")
        .eq("id", id)
        .maybe_single()
        .await?
        .ok_or_else(|| DbError::not_found("Attribute value not found"))
}

/// Metadata defaults to an empty object.
///
/// # Errors
///
/// Returns [`DbError::InvalidRequest`] on blank fields, or
/// [`DbError::Supabase`] if the insert fails (e.g. unknown type id).
pub async fn create_attribute_value(
    client: &SupabaseClient,
    input: &NewAttributeValue,
) -> Result<AttributeValue, DbError> {
    ensure_not_blank("value", Some(&input.value))?;
    ensure_not_blank("displayValue", Some(&input.display_value))?;

    let empty = BTreeMap::new();
    let row = client
        .admin_table("attribute_values")
        .insert(&[AttributeValueInsert {
            attribute_type_id: input.attribute_type_id,
            value: &input.value,
            display_value: &input.display_value,
            metadata: input.metadata.as_ref().unwrap_or(&empty),
        }])?
        .select("*")
        .single()
        .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no value has `id`, or
/// [`DbError::Supabase`] if the update fails.
pub async fn update_attribute_value(
    client: &SupabaseClient,
    id: Uuid,
    patch: &AttributeValuePatch,
) -> Result<AttributeValue, DbError> {
    get_attribute_value(client, id).await?;

    let mut columns = serde_json::Map::new();
    columns.insert("updated_at".to_owned(), now_stamp());
    if let Some(display_value) = &patch.display_value {
        columns.insert("display_value".to_owned(), display_value.clone().into());
    }
    if let Some(metadata) = &patch.metadata {
        let metadata = metadata
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(v.as_str())))
            .collect();
        columns.insert("metadata".to_owned(), serde_json::Value::Object(metadata));
    }

    let row = client
        .admin_table("attribute_values")
        .update(&columns)?
        .eq("id", id)
        .select("*")
        .single()
        .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no value has `id`, or
/// [`DbError::Supabase`] if the delete fails.
pub async fn delete_attribute_value(client: &SupabaseClient, id: Uuid) -> Result<Deleted, DbError> {
    get_attribute_value(client, id).await?;

    client
        .admin_table("attribute_values")
        .delete()
        .eq("id", id)
        .execute::<serde_json::Value>()
        .await?;
    Ok(Deleted::new("Attribute value deleted successfully", id))
}
