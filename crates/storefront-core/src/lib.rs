pub mod app_config;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod pagination;
pub mod reviews;
pub mod sku;
pub mod variants;

pub use app_config::{AppConfig, Environment};
pub use auth::{Identity, Role};
pub use cart::{CartItem, CartLine};
pub use catalog::{
    AttributeType, AttributeValue, LinkedAttributeValue, Product, ProductVariant,
    ProductWithVariants, VariantAttributeLink,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use detail::ProductDetail;
pub use pagination::{Page, Pagination};
pub use reviews::{validate_rating, Comment, ReviewStats};
pub use variants::{build_variant_catalog, AttributeTypeSummary, AttributeValueSummary, VariantCatalog};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),
    #[error("{field} must be {constraint}, got {value}")]
    InvalidPagination {
        field: &'static str,
        constraint: &'static str,
        value: i64,
    },
}
