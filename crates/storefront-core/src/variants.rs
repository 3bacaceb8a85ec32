//! Variant combination builder.
//!
//! Turns a product's flat variant rows into the two lookups a storefront needs
//! to render option pickers: the attribute axes present on the product with
//! their distinct values, and a map from a canonical combination key
//! (`color:red|size:m`) to the variant carrying exactly that combination.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::catalog::ProductVariant;

/// Separator between `name:value` pairs in a combination key.
pub const COMBINATION_SEPARATOR: char = '|';

/// One attribute axis of a product with the values its variants use.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeTypeSummary {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub values: Vec<AttributeValueSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValueSummary {
    pub id: Uuid,
    pub value: String,
    pub display_value: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariantCatalog {
    /// Attribute types in first-seen order, values de-duplicated by id.
    pub attribute_types: Vec<AttributeTypeSummary>,
    /// Combination key to variant id; later variants win on collision.
    pub variant_combinations: BTreeMap<String, Uuid>,
}

/// Build the attribute summary and combination lookup for one product.
///
/// Links whose attribute value or attribute type was not embedded are
/// skipped. A variant without any usable link contributes no combination key.
#[must_use]
pub fn build_variant_catalog(variants: &[ProductVariant]) -> VariantCatalog {
    let mut attribute_types: Vec<AttributeTypeSummary> = Vec::new();
    let mut type_index: HashMap<Uuid, usize> = HashMap::new();
    let mut seen_values: HashSet<(Uuid, Uuid)> = HashSet::new();
    let mut variant_combinations = BTreeMap::new();

    for variant in variants {
        // BTreeMap keeps the pairs sorted by type name; a repeated type name
        // keeps the last value seen.
        let mut selection: BTreeMap<&str, &str> = BTreeMap::new();

        for link in &variant.variant_attributes {
            let Some(value) = link.attribute_values.as_ref() else {
                continue;
            };
            let Some(attr_type) = value.attribute_types.as_ref() else {
                continue;
            };

            let idx = *type_index.entry(attr_type.id).or_insert_with(|| {
                attribute_types.push(AttributeTypeSummary {
                    id: attr_type.id,
                    name: attr_type.name.clone(),
                    display_name: attr_type.display_name.clone(),
                    values: Vec::new(),
                });
                attribute_types.len() - 1
            });

            if seen_values.insert((attr_type.id, value.id)) {
                attribute_types[idx].values.push(AttributeValueSummary {
                    id: value.id,
                    value: value.value.clone(),
                    display_value: value.display_value.clone(),
                    metadata: value.metadata.clone(),
                });
            }

            selection.insert(attr_type.name.as_str(), value.value.as_str());
        }

        if let Some(key) = combination_key(&selection) {
            variant_combinations.insert(key, variant.id);
        }
    }

    VariantCatalog {
        attribute_types,
        variant_combinations,
    }
}

/// Joins sorted `name:value` pairs with [`COMBINATION_SEPARATOR`].
///
/// Returns `None` for an empty selection.
fn combination_key(selection: &BTreeMap<&str, &str>) -> Option<String> {
    if selection.is_empty() {
        return None;
    }
    let sep = COMBINATION_SEPARATOR.to_string();
    Some(
        selection
            .iter()
            .map(|(name, value)| format!("{name}:{value}"))
            .collect::<Vec<_>>()
            .join(&sep),
    )
}
