//! Catalog rows as returned by the store: products, variants, and the
//! attribute vocabulary that distinguishes variants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A row from the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    /// Image URLs in display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A product together with its embedded `product_variants` relation.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_variants: Vec<ProductVariant>,
}

/// A purchasable SKU of a product.
///
/// `product_id` is absent when the variant was fetched as an embedded
/// relation of its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub sku: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variant_attributes: Vec<VariantAttributeLink>,
}

/// A `variant_attributes` link row with its embedded attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantAttributeLink {
    pub attribute_value_id: Uuid,
    #[serde(default)]
    pub attribute_values: Option<LinkedAttributeValue>,
}

/// An attribute value embedded under a link, optionally carrying its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedAttributeValue {
    pub id: Uuid,
    pub value: String,
    pub display_value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub attribute_type_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_types: Option<AttributeType>,
}

/// A row from the `attribute_types` table, e.g. `color` / `Color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeType {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A row from the `attribute_values` table, e.g. `red` / `Red` under `color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: Uuid,
    pub attribute_type_id: Uuid,
    pub value: String,
    pub display_value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_with_variants_reads_embedded_relations() {
        let json = serde_json::json!({
            "id": "5d6f0c39-4b7e-4a43-9a6e-0c2b7c1f7c11",
            "name": "Trail Tee",
            "description": null,
            "price": 24.5,
            "discount_price": null,
            "images": null,
            "stock_quantity": 12,
            "category": "apparel",
            "created_at": "2025-03-01T10:00:00+00:00",
            "updated_at": "2025-03-01T10:00:00+00:00",
            "product_variants": [{
                "id": "0b0c3f5e-5f3b-4d38-a3a7-7d9f3b6f2a01",
                "sku": "TRAIL-TEE-1",
                "price": 24.5,
                "discount_price": null,
                "stock_quantity": 4,
                "is_default": true,
                "variant_attributes": [{
                    "attribute_value_id": "9f1d7b52-0f7c-4c1a-8a3e-6b2d9c4e5f10",
                    "attribute_values": {
                        "id": "9f1d7b52-0f7c-4c1a-8a3e-6b2d9c4e5f10",
                        "value": "red",
                        "display_value": "Red",
                        "metadata": {"hex": "#ff0000"},
                        "attribute_type_id": "1a2b3c4d-0000-4000-8000-000000000001",
                        "attribute_types": {
                            "id": "1a2b3c4d-0000-4000-8000-000000000001",
                            "name": "color",
                            "display_name": "Color"
                        }
                    }
                }]
            }]
        });

        let parsed: ProductWithVariants = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed.product.name, "Trail Tee");
        assert_eq!(parsed.product.price, Decimal::new(245, 1));
        assert!(parsed.product.images.is_empty());
        assert_eq!(parsed.product_variants.len(), 1);

        let link = &parsed.product_variants[0].variant_attributes[0];
        let value = link.attribute_values.as_ref().expect("embedded value");
        assert_eq!(value.metadata["hex"], "#ff0000");
        assert_eq!(
            value.attribute_types.as_ref().map(|t| t.name.as_str()),
            Some("color")
        );
    }

    #[test]
    fn product_price_serializes_as_number() {
        let product = Product {
            id: Uuid::nil(),
            name: "Mug".to_string(),
            description: None,
            price: Decimal::new(1299, 2),
            discount_price: None,
            images: vec!["https://cdn.example.com/mug.png".to_string()],
            stock_quantity: 3,
            category: None,
            created_at: None,
            updated_at: None,
        };
        let json = serde_json::to_value(&product).expect("serialize");
        assert_eq!(json["price"], serde_json::json!(12.99));
        assert_eq!(json["images"][0], "https://cdn.example.com/mug.png");
    }
}
