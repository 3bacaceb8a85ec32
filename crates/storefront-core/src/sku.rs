//! Generated SKUs for variants created without one.
//!
//! All generated SKUs share a prefix derived from the product name: its first
//! ten characters, upper-cased, with whitespace runs collapsed to `-`.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const PREFIX_CHARS: usize = 10;

#[must_use]
pub fn sku_prefix(product_name: &str) -> String {
    let head: String = product_name.chars().take(PREFIX_CHARS).collect();
    WHITESPACE.replace_all(&head.to_uppercase(), "-").into_owned()
}

/// SKU of the variant created alongside a product that had none.
#[must_use]
pub fn default_sku(product_name: &str) -> String {
    format!("{}-DEFAULT", sku_prefix(product_name))
}

/// SKU of the `position`-th (1-based) variant supplied at product creation.
#[must_use]
pub fn numbered_sku(product_name: &str, position: usize) -> String {
    format!("{}-{position}", sku_prefix(product_name))
}

/// SKU of a variant added to an existing product.
#[must_use]
pub fn timestamped_sku(product_name: &str, unix_millis: i64) -> String {
    format!("{}-{unix_millis}", sku_prefix(product_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_truncates_and_uppercases() {
        assert_eq!(sku_prefix("Organic Cotton Hoodie"), "ORGANIC-CO");
    }

    #[test]
    fn prefix_collapses_whitespace_runs() {
        assert_eq!(sku_prefix("a  b\tc"), "A-B-C");
    }

    #[test]
    fn prefix_keeps_short_names_whole() {
        assert_eq!(sku_prefix("mug"), "MUG");
    }

    #[test]
    fn generated_skus_share_prefix() {
        assert_eq!(default_sku("Desk Lamp"), "DESK-LAMP-DEFAULT");
        assert_eq!(numbered_sku("Desk Lamp", 2), "DESK-LAMP-2");
        assert_eq!(timestamped_sku("Desk Lamp", 1_700_000_000_000), "DESK-LAMP-1700000000000");
    }
}
