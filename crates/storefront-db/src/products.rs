//! Products and their variants.
//!
//! Creation and update are multi-step: the product row is written first,
//! then variants, then variant attribute links. Failures after the product
//! row is written are logged and do not fail the request, so a failed step
//! can leave a product without (some of) its variants.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::sku::{default_sku, numbered_sku, timestamped_sku};
use storefront_core::{Comment, Page, Pagination, Product, ProductDetail, ProductWithVariants};
use storefront_supabase::{SupabaseClient, SupabaseError};
use uuid::Uuid;

use crate::{ensure_non_negative, ensure_not_blank, now_stamp, DbError, Deleted, IdRow};

const DETAIL_SELECT: &str = "
    *,
    product_variants (
        id, sku, price, discount_price, stock_quantity, is_default,
        variant_attributes (
            attribute_value_id,
            attribute_values (
                id, value, display_value, metadata, attribute_type_id,
                attribute_types ( id, name, display_name )
            )
        )
    )";

const REVIEW_SELECT: &str = "id, content, rating, created_at, updated_at, user_id";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Body of `POST /api/products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock_quantity: Option<i32>,
    pub category: Option<String>,
    #[serde(default)]
    pub variants: Vec<NewVariant>,
}

/// A variant supplied at product creation. Missing fields fall back to the
/// product's own values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVariant {
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    #[serde(default)]
    pub attribute_value_ids: Vec<Uuid>,
}

/// Body of `PUT /api/products/{id}`; only present fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub images: Option<Vec<String>>,
    pub stock_quantity: Option<i32>,
    pub category: Option<String>,
    #[serde(default)]
    pub variants: Vec<VariantPatch>,
}

/// A variant in an update: patches the variant with `id`, or adds a new
/// non-default variant when `id` is absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPatch {
    pub id: Option<Uuid>,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    #[serde(default)]
    pub attribute_value_ids: Vec<Uuid>,
}

impl NewProduct {
    fn validate(&self) -> Result<(), DbError> {
        ensure_not_blank("name", Some(&self.name))?;
        ensure_non_negative("price", Some(self.price))?;
        ensure_non_negative("discountPrice", self.discount_price)?;
        ensure_non_negative("stockQuantity", self.stock_quantity)?;
        for variant in &self.variants {
            ensure_non_negative("variants.price", variant.price)?;
            ensure_non_negative("variants.discountPrice", variant.discount_price)?;
            ensure_non_negative("variants.stockQuantity", variant.stock_quantity)?;
        }
        Ok(())
    }
}

impl ProductPatch {
    fn validate(&self) -> Result<(), DbError> {
        ensure_not_blank("name", self.name.as_deref())?;
        ensure_non_negative("price", self.price)?;
        ensure_non_negative("discountPrice", self.discount_price)?;
        ensure_non_negative("stockQuantity", self.stock_quantity)?;
        for variant in &self.variants {
            ensure_non_negative("variants.price", variant.price)?;
            ensure_non_negative("variants.discountPrice", variant.discount_price)?;
            ensure_non_negative("variants.stockQuantity", variant.stock_quantity)?;
        }
        Ok(())
    }

    fn touches_pricing(&self) -> bool {
        self.price.is_some() || self.discount_price.is_some() || self.stock_quantity.is_some()
    }

    /// Column patch for the product row, always stamping `updated_at`.
    fn columns(&self) -> Result<Columns, SupabaseError> {
        let mut columns = Columns::new();
        columns.insert("updated_at".to_owned(), now_stamp());
        put(&mut columns, "name", self.name.as_ref())?;
        put(&mut columns, "description", self.description.as_ref())?;
        put(&mut columns, "price", self.price.as_ref())?;
        put(&mut columns, "discount_price", self.discount_price.as_ref())?;
        put(&mut columns, "images", self.images.as_ref())?;
        put(&mut columns, "stock_quantity", self.stock_quantity.as_ref())?;
        put(&mut columns, "category", self.category.as_ref())?;
        Ok(columns)
    }

    /// Pricing columns mirrored onto the default variant.
    fn default_variant_columns(&self) -> Result<Columns, SupabaseError> {
        let mut columns = Columns::new();
        columns.insert("updated_at".to_owned(), now_stamp());
        put(&mut columns, "price", self.price.as_ref())?;
        put(&mut columns, "discount_price", self.discount_price.as_ref())?;
        put(&mut columns, "stock_quantity", self.stock_quantity.as_ref())?;
        Ok(columns)
    }
}

impl VariantPatch {
    fn columns(&self) -> Result<Columns, SupabaseError> {
        let mut columns = Columns::new();
        columns.insert("updated_at".to_owned(), now_stamp());
        put(&mut columns, "sku", self.sku.as_ref())?;
        put(&mut columns, "price", self.price.as_ref())?;
        put(&mut columns, "discount_price", self.discount_price.as_ref())?;
        put(&mut columns, "stock_quantity", self.stock_quantity.as_ref())?;
        Ok(columns)
    }
}

type Columns = serde_json::Map<String, serde_json::Value>;

/// Sets `column` when a value was supplied.
fn put<T: Serialize + ?Sized>(
    columns: &mut Columns,
    column: &str,
    value: Option<&T>,
) -> Result<(), SupabaseError> {
    if let Some(value) = value {
        let json = serde_json::to_value(value).map_err(SupabaseError::Serialize)?;
        columns.insert(column.to_owned(), json);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Row payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ProductInsert<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    discount_price: Option<Decimal>,
    images: &'a [String],
    stock_quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct VariantInsert {
    product_id: Uuid,
    sku: String,
    price: Decimal,
    discount_price: Option<Decimal>,
    stock_quantity: i32,
    is_default: bool,
}

#[derive(Debug, Serialize)]
struct AttributeLinkInsert {
    variant_id: Uuid,
    attribute_value_id: Uuid,
}

/// A caller-supplied SKU, ignoring blanks.
fn supplied_sku(sku: Option<&String>) -> Option<String> {
    sku.filter(|s| !s.trim().is_empty()).cloned()
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// One page of products with the exact total count.
///
/// # Errors
///
/// Returns [`DbError::Supabase`] if the query fails.
pub async fn list_products(
    client: &SupabaseClient,
    pagination: Pagination,
) -> Result<Page<Product>, DbError> {
    let (rows, total) = client
        .table("products")
        .select("*")
        .range(pagination.offset, pagination.limit)
        .execute_with_count::<Product>()
        .await?;
    Ok(Page::new(rows, pagination, total))
}

/// The full product document: variants, attribute catalog, combinations,
/// comments (newest first), and review statistics.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has `id`, or
/// [`DbError::Supabase`] if a query fails.
pub async fn get_product_detail(
    client: &SupabaseClient,
    id: Uuid,
) -> Result<ProductDetail, DbError> {
    let row = client
        .table("products")
        .select(DETAIL_SELECT)
        .eq("id", id)
        .maybe_single::<ProductWithVariants>()
        .await?
        .ok_or_else(|| DbError::not_found("Product not found"))?;

    let comments = client
        .table("comments")
        .select(REVIEW_SELECT)
        .eq("product_id", id)
        .order("created_at", false)
        .execute::<Comment>()
        .await?;

    Ok(ProductDetail::assemble(
        row.product,
        row.product_variants,
        comments,
    ))
}

/// Creates a product and its variants, returning the full document.
///
/// With no variants supplied a single default variant mirrors the product's
/// price and stock. Otherwise each supplied variant is created (the first
/// one default), followed by its attribute links.
///
/// # Errors
///
/// Returns [`DbError::InvalidRequest`] on invalid input, or
/// [`DbError::Supabase`] if the product row cannot be written or re-read.
pub async fn create_product(
    client: &SupabaseClient,
    input: &NewProduct,
) -> Result<ProductDetail, DbError> {
    input.validate()?;

    let stock = input.stock_quantity.unwrap_or(0);
    let product = client
        .admin_table("products")
        .insert(&ProductInsert {
            name: &input.name,
            description: input.description.as_deref(),
            price: input.price,
            discount_price: input.discount_price,
            images: &input.images,
            stock_quantity: stock,
            category: input.category.as_deref(),
        })?
        .select("*")
        .single::<Product>()
        .await?;

    if input.variants.is_empty() {
        let default_variant = VariantInsert {
            product_id: product.id,
            sku: default_sku(&product.name),
            price: input.price,
            discount_price: input.discount_price,
            stock_quantity: stock,
            is_default: true,
        };
        let result = client
            .admin_table("product_variants")
            .insert(&[default_variant])?
            .execute::<serde_json::Value>()
            .await;
        if let Err(e) = result {
            tracing::warn!(product_id = %product.id, error = %e, "failed to create default variant");
        }
    } else {
        let rows: Vec<VariantInsert> = input
            .variants
            .iter()
            .enumerate()
            .map(|(index, variant)| VariantInsert {
                product_id: product.id,
                sku: supplied_sku(variant.sku.as_ref())
                    .unwrap_or_else(|| numbered_sku(&product.name, index + 1)),
                price: variant.price.unwrap_or(input.price),
                discount_price: variant.discount_price.or(input.discount_price),
                stock_quantity: variant.stock_quantity.unwrap_or(stock),
                is_default: index == 0,
            })
            .collect();

        let created = client
            .admin_table("product_variants")
            .insert(&rows)?
            .select("id")
            .execute::<IdRow>()
            .await;
        match created {
            Ok(created) => {
                for (row, variant) in created.iter().zip(&input.variants) {
                    link_attributes(client, row.id, &variant.attribute_value_ids).await?;
                }
            }
            Err(e) => {
                tracing::warn!(product_id = %product.id, error = %e, "failed to create variants");
            }
        }
    }

    get_product_detail(client, product.id).await
}

/// Applies a sparse update to a product and its variants, returning the
/// full document.
///
/// When no variants are supplied but price, discount, or stock change, the
/// default variant is updated to match.
///
/// # Errors
///
/// Returns [`DbError::InvalidRequest`] on invalid input,
/// [`DbError::NotFound`] if no product has `id`, or [`DbError::Supabase`] if
/// the product row cannot be written or re-read.
pub async fn update_product(
    client: &SupabaseClient,
    id: Uuid,
    patch: &ProductPatch,
) -> Result<ProductDetail, DbError> {
    patch.validate()?;
    ensure_product_exists(client, id).await?;

    let updated = client
        .admin_table("products")
        .update(&patch.columns()?)?
        .eq("id", id)
        .select("*")
        .single::<Product>()
        .await?;

    if !patch.variants.is_empty() {
        for variant in &patch.variants {
            match variant.id {
                Some(variant_id) => patch_variant(client, id, variant_id, variant).await?,
                None => add_variant(client, &updated, variant).await?,
            }
        }
    } else if patch.touches_pricing() {
        let result = client
            .admin_table("product_variants")
            .update(&patch.default_variant_columns()?)?
            .eq("product_id", id)
            .eq("is_default", true)
            .execute::<serde_json::Value>()
            .await;
        if let Err(e) = result {
            tracing::warn!(product_id = %id, error = %e, "failed to sync default variant");
        }
    }

    get_product_detail(client, id).await
}

/// Deletes a product; variants, links, comments, and cart rows cascade in
/// the store.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has `id`, or
/// [`DbError::Supabase`] if the delete fails.
pub async fn delete_product(client: &SupabaseClient, id: Uuid) -> Result<Deleted, DbError> {
    ensure_product_exists(client, id).await?;

    client
        .admin_table("products")
        .delete()
        .eq("id", id)
        .execute::<serde_json::Value>()
        .await?;

    Ok(Deleted::new("Product deleted successfully", id))
}

/// Fails with [`DbError::NotFound`] unless a product with `id` exists.
pub(crate) async fn ensure_product_exists(
    client: &SupabaseClient,
    id: Uuid,
) -> Result<(), DbError> {
    client
        .table("products")
        .select("id")
        .eq("id", id)
        .maybe_single::<IdRow>()
        .await?
        .map(|_| ())
        .ok_or_else(|| DbError::not_found("Product not found"))
}

async fn patch_variant(
    client: &SupabaseClient,
    product_id: Uuid,
    variant_id: Uuid,
    variant: &VariantPatch,
) -> Result<(), DbError> {
    let result = client
        .admin_table("product_variants")
        .update(&variant.columns()?)?
        .eq("id", variant_id)
        .eq("product_id", product_id)
        .execute::<serde_json::Value>()
        .await;
    if let Err(e) = result {
        tracing::warn!(%product_id, %variant_id, error = %e, "failed to update variant");
    }

    if !variant.attribute_value_ids.is_empty() {
        let cleared = client
            .admin_table("variant_attributes")
            .delete()
            .eq("variant_id", variant_id)
            .execute::<serde_json::Value>()
            .await;
        if let Err(e) = cleared {
            tracing::warn!(%variant_id, error = %e, "failed to clear variant attributes");
        }
        link_attributes(client, variant_id, &variant.attribute_value_ids).await?;
    }
    Ok(())
}

async fn add_variant(
    client: &SupabaseClient,
    product: &Product,
    variant: &VariantPatch,
) -> Result<(), DbError> {
    let row = VariantInsert {
        product_id: product.id,
        sku: supplied_sku(variant.sku.as_ref())
            .unwrap_or_else(|| timestamped_sku(&product.name, Utc::now().timestamp_millis())),
        price: variant.price.unwrap_or(product.price),
        discount_price: variant.discount_price.or(product.discount_price),
        stock_quantity: variant.stock_quantity.unwrap_or(product.stock_quantity),
        is_default: false,
    };

    let created = client
        .admin_table("product_variants")
        .insert(&[row])?
        .select("id")
        .single::<IdRow>()
        .await;
    match created {
        Ok(created) => link_attributes(client, created.id, &variant.attribute_value_ids).await,
        Err(e) => {
            tracing::warn!(product_id = %product.id, error = %e, "failed to add variant");
            Ok(())
        }
    }
}

/// Inserts one `variant_attributes` row per value id. A failed insert is
/// logged; only a payload that cannot be serialized is an error.
async fn link_attributes(
    client: &SupabaseClient,
    variant_id: Uuid,
    attribute_value_ids: &[Uuid],
) -> Result<(), DbError> {
    if attribute_value_ids.is_empty() {
        return Ok(());
    }

    let links: Vec<AttributeLinkInsert> = attribute_value_ids
        .iter()
        .map(|&attribute_value_id| AttributeLinkInsert {
            variant_id,
            attribute_value_id,
        })
        .collect();

    let result = client
        .admin_table("variant_attributes")
        .insert(&links)?
        .execute::<serde_json::Value>()
        .await;
    if let Err(e) = result {
        tracing::warn!(%variant_id, error = %e, "failed to create variant attributes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_reads_camel_case_body() {
        let input: NewProduct = serde_json::from_value(serde_json::json!({
            "name": "Desk Lamp",
            "price": 39.5,
            "discountPrice": 29,
            "stockQuantity": 4,
            "variants": [{"sku": "LAMP-W", "attributeValueIds": ["00000000-0000-0000-0000-000000000001"]}]
        }))
        .expect("deserialize");

        assert_eq!(input.price, Decimal::new(395, 1));
        assert_eq!(input.discount_price, Some(Decimal::from(29)));
        assert!(input.images.is_empty());
        assert_eq!(input.variants[0].attribute_value_ids, vec![Uuid::from_u128(1)]);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn new_product_rejects_blank_name_and_negative_stock() {
        let mut input: NewProduct = serde_json::from_value(serde_json::json!({
            "name": " ",
            "price": 1
        }))
        .expect("deserialize");
        assert!(matches!(input.validate(), Err(DbError::InvalidRequest(_))));

        input.name = "Mug".to_owned();
        input.variants.push(NewVariant {
            stock_quantity: Some(-1),
            ..NewVariant::default()
        });
        assert!(matches!(input.validate(), Err(DbError::InvalidRequest(_))));
    }

    #[test]
    fn patch_columns_include_only_present_fields() {
        let patch = ProductPatch {
            price: Some(Decimal::new(1250, 2)),
            category: Some("kitchen".to_owned()),
            ..ProductPatch::default()
        };
        let columns = patch.columns().expect("columns");

        assert!(columns.contains_key("updated_at"));
        assert_eq!(columns["price"], serde_json::json!(12.5));
        assert_eq!(columns["category"], "kitchen");
        assert!(!columns.contains_key("name"));
        assert!(!columns.contains_key("stock_quantity"));
    }

    #[test]
    fn pricing_changes_are_detected() {
        assert!(!ProductPatch::default().touches_pricing());
        let patch = ProductPatch {
            stock_quantity: Some(0),
            ..ProductPatch::default()
        };
        assert!(patch.touches_pricing());
        let columns = patch.default_variant_columns().expect("columns");
        assert_eq!(columns["stock_quantity"], 0);
        assert!(!columns.contains_key("price"));
    }

    #[test]
    fn unserializable_column_is_an_error() {
        let mut columns = Columns::new();
        let keyed_by_pairs = std::collections::BTreeMap::from([((1, 2), 3)]);
        let err = put(&mut columns, "metadata", Some(&keyed_by_pairs))
            .expect_err("non-string map keys cannot become JSON");
        assert!(matches!(err, SupabaseError::Serialize(_)));
        assert!(columns.is_empty());
    }

    #[test]
    fn blank_sku_is_treated_as_missing() {
        assert_eq!(supplied_sku(Some(&String::new())), None);
        assert_eq!(supplied_sku(Some(&"A-1".to_owned())), Some("A-1".to_owned()));
    }
}
