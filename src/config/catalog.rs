//! Seed catalog loading from catalog.toml
//!
//! The seed file describes attribute types, products, their variants (each
//! tagged with a `{ slug = value }` table) and display groups. It is consumed
//! by [`crate::core::seed::seed_catalog`], which is safe to run repeatedly.

use crate::entities::Datatype;
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Configuration structure representing the entire catalog.toml file
#[derive(Debug, Deserialize, Default)]
pub struct CatalogConfig {
    /// Attribute axes shared by all products
    #[serde(default)]
    pub attribute_types: Vec<AttributeTypeConfig>,
    /// Products with their variants and groups
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// One attribute axis
#[derive(Debug, Deserialize, Clone)]
pub struct AttributeTypeConfig {
    /// Display name
    pub name: String,
    /// Selection key
    pub slug: String,
    /// Value interpretation, `text` when omitted
    #[serde(default = "default_datatype")]
    pub datatype: Datatype,
    /// Axis position
    #[serde(default)]
    pub display_order: i32,
}

const fn default_datatype() -> Datatype {
    Datatype::Text
}

/// One product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Display name
    pub name: String,
    /// Explicit slug, derived from the name when omitted
    pub slug: Option<String>,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Presentation details for options (labels, swatches, ordering)
    #[serde(default)]
    pub options: Vec<OptionConfig>,
    /// Sellable SKUs
    #[serde(default)]
    pub variants: Vec<VariantConfig>,
    /// Display groups
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

/// Presentation details for one product-scoped option
#[derive(Debug, Deserialize, Clone)]
pub struct OptionConfig {
    /// Attribute type slug
    pub attribute: String,
    /// Raw value
    pub value: String,
    /// Label shown instead of the raw value
    pub display_value: Option<String>,
    /// Swatch color (`#RRGGBB`)
    pub color_hex: Option<String>,
    /// Position within the axis
    #[serde(default)]
    pub display_order: i32,
}

/// One variant
#[derive(Debug, Deserialize, Clone)]
pub struct VariantConfig {
    /// Globally unique SKU
    pub sku: String,
    /// Explicit name, derived when omitted
    pub name: Option<String>,
    /// Purchase cost
    pub cost_price: Option<Decimal>,
    /// Storefront price
    pub sell_price: Decimal,
    /// "Was" price
    pub compare_at_price: Option<Decimal>,
    /// Units on hand
    #[serde(default)]
    pub stock_quantity: i32,
    /// Inactive variants are stored but invisible to navigation
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Attribute tags, `{ attribute_slug = value }`
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

const fn default_true() -> bool {
    true
}

/// One display group
#[derive(Debug, Deserialize, Clone)]
pub struct GroupConfig {
    /// Display name
    pub name: String,
    /// Explicit slug, derived from the name when omitted
    pub slug: Option<String>,
    /// Landing group when nothing is selected
    #[serde(default)]
    pub featured: bool,
    /// Position among the product's groups
    #[serde(default)]
    pub display_order: i32,
    /// Every variant carrying all of these tags becomes a member
    #[serde(default)]
    pub members: BTreeMap<String, String>,
    /// Additional members by SKU
    #[serde(default)]
    pub skus: Vec<String>,
}

/// Parses a catalog from TOML text.
pub fn parse_catalog(contents: &str) -> Result<CatalogConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog config: {e}"),
    })
}

/// Loads a catalog configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path = path.as_ref();
    tracing::debug!("Loading catalog configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read catalog config {}: {e}", path.display()),
    })?;
    parse_catalog(&contents)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_catalog_config() {
        let toml_str = r##"
            [[attribute_types]]
            name = "Color"
            slug = "color"
            datatype = "color"
            display_order = 1

            [[attribute_types]]
            name = "Length"
            slug = "length"

            [[products]]
            name = "Hair Extension"

            [[products.options]]
            attribute = "color"
            value = "Black"
            color_hex = "#000000"

            [[products.variants]]
            sku = "EXT-BLK-30"
            sell_price = "349.90"
            cost_price = "150.00"
            stock_quantity = 5
            options = { color = "Black", length = "30cm" }

            [[products.groups]]
            name = "Black Extensions"
            featured = true
            members = { color = "Black" }
        "##;

        let config = parse_catalog(toml_str).unwrap();
        assert_eq!(config.attribute_types.len(), 2);
        assert_eq!(config.attribute_types[0].datatype, Datatype::Color);
        assert_eq!(config.attribute_types[1].datatype, Datatype::Text);

        let product = &config.products[0];
        assert!(product.slug.is_none());
        assert_eq!(product.options[0].color_hex.as_deref(), Some("#000000"));

        let variant = &product.variants[0];
        assert_eq!(variant.sell_price, dec!(349.90));
        assert!(variant.is_active);
        assert_eq!(variant.options.get("length").map(String::as_str), Some("30cm"));

        let group = &product.groups[0];
        assert!(group.featured);
        assert_eq!(group.members.len(), 1);
        assert!(group.skus.is_empty());
    }

    #[test]
    fn test_parse_catalog_rejects_unknown_datatype() {
        let result = parse_catalog(
            r#"
            [[attribute_types]]
            name = "Color"
            slug = "color"
            datatype = "rgb"
        "#,
        );
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
