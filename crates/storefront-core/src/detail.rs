use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::catalog::{Product, ProductVariant};
use crate::reviews::{Comment, ReviewStats};
use crate::variants::{build_variant_catalog, AttributeTypeSummary};

/// The product document served by `GET /api/products/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub product_variants: Vec<ProductVariant>,
    pub attribute_types: Vec<AttributeTypeSummary>,
    pub variant_combinations: BTreeMap<String, Uuid>,
    pub comments: Vec<Comment>,
    pub average_rating: f64,
    pub total_reviews: usize,
}

impl ProductDetail {
    /// Combine a product, its variants, and its comments (newest first).
    #[must_use]
    pub fn assemble(product: Product, variants: Vec<ProductVariant>, comments: Vec<Comment>) -> Self {
        let stats = ReviewStats::from_comments(&comments);
        let catalog = build_variant_catalog(&variants);

        Self {
            product,
            product_variants: variants,
            attribute_types: catalog.attribute_types,
            variant_combinations: catalog.variant_combinations,
            comments,
            average_rating: stats.average_rating,
            total_reviews: stats.total_reviews,
        }
    }
}
