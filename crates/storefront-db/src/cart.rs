//! Per-user shopping cart line items.
//!
//! Stock is checked against the variant before every write, but the check
//! and the write are separate requests; concurrent adds can oversell.

use serde::{Deserialize, Serialize};
use storefront_core::{CartItem, CartLine};
use storefront_supabase::SupabaseClient;
use uuid::Uuid;

use crate::{now_stamp, DbError, Deleted, IdRow, Message};

const CART_SELECT: &str = "
    id, quantity, created_at, updated_at,
    products:product_id ( * ),
    variants:variant_id (
        id, sku, price, discount_price, stock_quantity, is_default,
        variant_attributes ( attribute_value_id, attribute_values ( * ) )
    )";

const NOT_ENOUGH_STOCK: &str = "Not enough stock available";

/// Body of `POST /api/cart/add`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: Uuid,
    pub variant_id: Uuid,
    /// Defaults to 1.
    pub quantity: Option<i32>,
}

/// Body of `PUT /api/cart/{itemId}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemPatch {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
struct VariantStock {
    stock_quantity: i32,
}

#[derive(Debug, Deserialize)]
struct OwnedItem {
    variant_id: Uuid,
}

#[derive(Debug, Serialize)]
struct CartItemInsert {
    user_id: Uuid,
    product_id: Uuid,
    variant_id: Uuid,
    quantity: i32,
}

fn ensure_positive_quantity(quantity: i32) -> Result<(), DbError> {
    if quantity < 1 {
        return Err(DbError::invalid("quantity must not be less than 1"));
    }
    Ok(())
}

/// The caller's cart with each line's product and variant embedded.
///
/// # Errors
///
/// Returns [`DbError::Supabase`] if the query fails.
pub async fn get_cart(client: &SupabaseClient, user_id: Uuid) -> Result<Vec<CartLine>, DbError> {
    let lines = client
        .table("cart_items")
        .select(CART_SELECT)
        .eq("user_id", user_id)
        .execute()
        .await?;
    Ok(lines)
}

/// Adds a variant to the caller's cart, merging with an existing line for
/// the same product and variant.
///
/// # Errors
///
/// - [`DbError::InvalidRequest`] if the quantity is below 1 or the
///   resulting quantity exceeds the variant's stock.
/// - [`DbError::NotFound`] if the product is absent or the variant does not
///   belong to it.
/// - [`DbError::Supabase`] if a query fails.
pub async fn add_to_cart(
    client: &SupabaseClient,
    user_id: Uuid,
    input: &AddToCart,
) -> Result<CartItem, DbError> {
    let quantity = input.quantity.unwrap_or(1);
    ensure_positive_quantity(quantity)?;

    client
        .table("products")
        .select("id")
        .eq("id", input.product_id)
        .maybe_single::<IdRow>()
        .await?
        .ok_or_else(|| DbError::not_found("Product not found"))?;

    let variant = client
        .table("product_variants")
        .select("id, stock_quantity")
        .eq("id", input.variant_id)
        .eq("product_id", input.product_id)
        .maybe_single::<VariantStock>()
        .await?
        .ok_or_else(|| DbError::not_found("Product variant not found"))?;

    if variant.stock_quantity < quantity {
        return Err(DbError::invalid(NOT_ENOUGH_STOCK));
    }

    let existing = client
        .table("cart_items")
        .select("*")
        .eq("user_id", user_id)
        .eq("product_id", input.product_id)
        .eq("variant_id", input.variant_id)
        .maybe_single::<CartItem>()
        .await?;

    if let Some(existing) = existing {
        let merged = existing.quantity.saturating_add(quantity);
        if merged > variant.stock_quantity {
            return Err(DbError::invalid(NOT_ENOUGH_STOCK));
        }
        let item = client
            .table("cart_items")
            .update(&serde_json::json!({ "quantity": merged, "updated_at": now_stamp() }))?
            .eq("id", existing.id)
            .select("*")
            .single()
            .await?;
        return Ok(item);
    }

    let item = client
        .table("cart_items")
        .insert(&[CartItemInsert {
            user_id,
            product_id: input.product_id,
            variant_id: input.variant_id,
            quantity,
        }])?
        .select("*")
        .single()
        .await?;
    Ok(item)
}

/// Sets the quantity of one of the caller's cart lines.
///
/// # Errors
///
/// - [`DbError::InvalidRequest`] if the quantity is below 1 or exceeds the
///   variant's current stock.
/// - [`DbError::NotFound`] if the line is absent, belongs to someone else,
///   or its variant no longer exists.
/// - [`DbError::Supabase`] if a query fails.
pub async fn update_cart_item(
    client: &SupabaseClient,
    user_id: Uuid,
    item_id: Uuid,
    patch: &CartItemPatch,
) -> Result<CartItem, DbError> {
    ensure_positive_quantity(patch.quantity)?;

    let item = client
        .table("cart_items")
        .select("id, product_id, variant_id")
        .eq("id", item_id)
        .eq("user_id", user_id)
        .maybe_single::<OwnedItem>()
        .await?
        .ok_or_else(|| DbError::not_found("Cart item not found"))?;

    let variant = client
        .table("product_variants")
        .select("stock_quantity")
        .eq("id", item.variant_id)
        .maybe_single::<VariantStock>()
        .await?
        .ok_or_else(|| DbError::not_found("Product variant not found"))?;

    if variant.stock_quantity < patch.quantity {
        return Err(DbError::invalid(NOT_ENOUGH_STOCK));
    }

    let updated = client
        .table("cart_items")
        .update(&serde_json::json!({ "quantity": patch.quantity, "updated_at": now_stamp() }))?
        .eq("id", item_id)
        .eq("user_id", user_id)
        .select("*")
        .single()
        .await?;
    Ok(updated)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the line is absent or belongs to
/// someone else, or [`DbError::Supabase`] if the delete fails.
pub async fn remove_from_cart(
    client: &SupabaseClient,
    user_id: Uuid,
    item_id: Uuid,
) -> Result<Deleted, DbError> {
    client
        .table("cart_items")
        .select("id")
        .eq("id", item_id)
        .eq("user_id", user_id)
        .maybe_single::<IdRow>()
        .await?
        .ok_or_else(|| DbError::not_found("Cart item not found"))?;

    client
        .table("cart_items")
        .delete()
        .eq("id", item_id)
        .eq("user_id", user_id)
        .execute::<serde_json::Value>()
        .await?;
    Ok(Deleted::new("Item removed from cart", item_id))
}

/// Removes every line in the caller's cart.
///
/// # Errors
///
/// Returns [`DbError::Supabase`] if the delete fails.
pub async fn clear_cart(client: &SupabaseClient, user_id: Uuid) -> Result<Message, DbError> {
    client
        .table("cart_items")
        .delete()
        .eq("user_id", user_id)
        .execute::<serde_json::Value>()
        .await?;
    Ok(Message::new("Cart cleared successfully"))
}
