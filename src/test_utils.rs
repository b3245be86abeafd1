//! Shared test utilities for `VariantCompass`.
//!
//! This module provides common helper functions for setting up test databases,
//! building in-memory variant indexes and creating catalog rows with sensible
//! defaults.

use crate::{
    core::{
        attribute::{NewOption, get_or_create_attribute_type, get_or_create_option},
        group::{add_variants, create_group},
        group_match::GroupMembers,
        index::VariantIndex,
        product::{create_product, slugify},
        variant::{NewVariant, assign_option, create_variant, get_variant_by_id},
    },
    entities::{
        Datatype, attribute_option, attribute_type, product, variant, variant_attribute,
        variant_group,
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Axes in the order tests expect them on screen; unknown axes sort last.
const AXIS_ORDER: [&str; 4] = ["color", "size", "length", "number"];

/// Routes tracing output to the test harness. Safe to call more than once.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all store-backed tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

fn title_case(slug: &str) -> String {
    let mut chars = slug.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn axis_order(slug: &str) -> i32 {
    AXIS_ORDER
        .iter()
        .position(|axis| *axis == slug)
        .and_then(|p| i32::try_from(p).ok())
        .unwrap_or(100)
}

/// Creates a product with an empty description.
pub async fn create_test_product(db: &DatabaseConnection, name: &str) -> Result<product::Model> {
    create_product(db, name, None, "").await
}

/// Creates an active variant priced at 100 with 10 units, tagged with
/// `(attribute slug, value)` pairs. Attribute types and options are created
/// as needed.
pub async fn create_tagged_variant(
    db: &DatabaseConnection,
    product: &product::Model,
    sku: &str,
    tags: &[(&str, &str)],
) -> Result<variant::Model> {
    let new = NewVariant {
        stock_quantity: 10,
        ..NewVariant::new(product.id, sku, Decimal::ONE_HUNDRED)
    };
    let variant = create_variant(db, new).await?;

    for (slug, value) in tags {
        let kind =
            get_or_create_attribute_type(db, &title_case(slug), slug, Datatype::Text, axis_order(slug))
                .await?;
        let option = get_or_create_option(db, NewOption::new(kind.id, product.id, value)).await?;
        assign_option(db, variant.id, option.id).await?;
    }

    get_variant_by_id(db, variant.id)
        .await?
        .ok_or_else(|| Error::not_found("Variant", variant.id))
}

/// Creates an untagged active variant with the given price and stock.
pub async fn create_priced_variant(
    db: &DatabaseConnection,
    product: &product::Model,
    sku: &str,
    sell_price: Decimal,
    stock_quantity: i32,
) -> Result<variant::Model> {
    let new = NewVariant {
        stock_quantity,
        ..NewVariant::new(product.id, sku, sell_price)
    };
    create_variant(db, new).await
}

/// "Hair Extension" sold only as Black/30cm and Black/50cm.
pub async fn setup_extension_catalog() -> Result<(DatabaseConnection, product::Model)> {
    let db = setup_test_db().await?;
    let product = create_test_product(&db, "Hair Extension").await?;
    create_tagged_variant(&db, &product, "EXT-BLK-30", &[("color", "Black"), ("length", "30cm")])
        .await?;
    create_tagged_variant(&db, &product, "EXT-BLK-50", &[("color", "Black"), ("length", "50cm")])
        .await?;
    Ok((db, product))
}

/// "Basic T-Shirt" with three black sizes and a blue medium. Returns the
/// featured "Black Shirts" group; a second "Mediums" group follows it.
pub async fn setup_tshirt_catalog()
-> Result<(DatabaseConnection, product::Model, variant_group::Model)> {
    let db = setup_test_db().await?;
    let product = create_test_product(&db, "Basic T-Shirt").await?;
    let p = create_tagged_variant(&db, &product, "TS-BLK-P", &[("color", "Black"), ("size", "P")]).await?;
    let m = create_tagged_variant(&db, &product, "TS-BLK-M", &[("color", "Black"), ("size", "M")]).await?;
    let g = create_tagged_variant(&db, &product, "TS-BLK-G", &[("color", "Black"), ("size", "G")]).await?;
    let blue = create_tagged_variant(&db, &product, "TS-BLU-M", &[("color", "Blue"), ("size", "M")]).await?;

    let black = create_group(&db, product.id, "Black Shirts", None, true, 0).await?;
    add_variants(&db, black.id, &[p.id, m.id, g.id]).await?;
    let mediums = create_group(&db, product.id, "Mediums", None, false, 1).await?;
    add_variants(&db, mediums.id, &[m.id, blue.id]).await?;

    Ok((db, product, black))
}

/// An in-memory group of product 1 with the given members.
#[must_use]
pub fn group_members(id: i64, name: &str, is_featured: bool, variant_ids: Vec<i64>) -> GroupMembers {
    let now = chrono::Utc::now().naive_utc();
    GroupMembers {
        group: variant_group::Model {
            id,
            product_id: 1,
            name: name.to_string(),
            slug: slugify(name),
            description: String::new(),
            is_active: true,
            is_featured,
            display_order: 0,
            featured_image_id: None,
            created_at: now,
            updated_at: now,
        },
        variant_ids,
    }
}

/// Builds a [`VariantIndex`] for product 1 without a database.
///
/// Variant ids are assigned from 1 in insertion order. Attribute types are
/// ordered by first use unless [`IndexBuilder::attribute`] says otherwise, and
/// options default to display order 0.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    types: Vec<attribute_type::Model>,
    options: Vec<attribute_option::Model>,
    variants: Vec<variant::Model>,
    tags: Vec<variant_attribute::Model>,
}

impl IndexBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn type_id(&mut self, slug: &str) -> i64 {
        if let Some(kind) = self.types.iter().find(|t| t.slug == slug) {
            return kind.id;
        }
        let id = i64::try_from(self.types.len()).unwrap_or(i64::MAX) + 1;
        self.types.push(attribute_type::Model {
            id,
            name: title_case(slug),
            slug: slug.to_string(),
            datatype: Datatype::Text,
            display_order: i32::try_from(id).unwrap_or(i32::MAX),
        });
        id
    }

    fn option_id(&mut self, slug: &str, value: &str) -> i64 {
        let type_id = self.type_id(slug);
        if let Some(option) = self
            .options
            .iter()
            .find(|o| o.attribute_type_id == type_id && o.value == value)
        {
            return option.id;
        }
        let id = i64::try_from(self.options.len()).unwrap_or(i64::MAX) + 1;
        self.options.push(attribute_option::Model {
            id,
            attribute_type_id: type_id,
            product_id: 1,
            value: value.to_string(),
            display_value: None,
            color_hex: None,
            display_order: 0,
        });
        id
    }

    fn push_variant(mut self, sku: &str, tags: &[(&str, &str)], is_active: bool) -> Self {
        let now = chrono::Utc::now().naive_utc();
        let variant_id = i64::try_from(self.variants.len()).unwrap_or(i64::MAX) + 1;
        for (slug, value) in tags {
            let option_id = self.option_id(slug, value);
            let type_id = self.type_id(slug);
            let tag_id = i64::try_from(self.tags.len()).unwrap_or(i64::MAX) + 1;
            self.tags.push(variant_attribute::Model {
                id: tag_id,
                variant_id,
                attribute_option_id: option_id,
                attribute_type_id: type_id,
            });
        }
        self.variants.push(variant::Model {
            id: variant_id,
            product_id: 1,
            sku: sku.to_string(),
            name: format!("Test - {sku}"),
            auto_name: true,
            cost_price: None,
            sell_price: Decimal::ONE_HUNDRED,
            compare_at_price: None,
            stock_quantity: 10,
            track_inventory: true,
            allow_backorder: false,
            low_stock_threshold: 5,
            weight: None,
            is_active,
            created_at: now,
            updated_at: now,
        });
        self
    }

    /// Adds an active variant.
    #[must_use]
    pub fn variant(self, sku: &str, tags: &[(&str, &str)]) -> Self {
        self.push_variant(sku, tags, true)
    }

    /// Adds an inactive variant.
    #[must_use]
    pub fn inactive_variant(self, sku: &str, tags: &[(&str, &str)]) -> Self {
        self.push_variant(sku, tags, false)
    }

    /// Declares an attribute type, or moves an existing one, to `display_order`.
    #[must_use]
    pub fn attribute(mut self, slug: &str, display_order: i32) -> Self {
        let id = self.type_id(slug);
        if let Some(kind) = self.types.iter_mut().find(|t| t.id == id) {
            kind.display_order = display_order;
        }
        self
    }

    /// Sets the display order of an option, creating it when missing.
    #[must_use]
    pub fn option_order(mut self, slug: &str, value: &str, display_order: i32) -> Self {
        let id = self.option_id(slug, value);
        if let Some(option) = self.options.iter_mut().find(|o| o.id == id) {
            option.display_order = display_order;
        }
        self
    }

    /// The raw rows, for tests that tamper with them before indexing.
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        Vec<attribute_type::Model>,
        Vec<attribute_option::Model>,
        Vec<variant::Model>,
        Vec<variant_attribute::Model>,
    ) {
        (self.types, self.options, self.variants, self.tags)
    }

    /// Indexes the rows as product 1.
    #[must_use]
    pub fn build(self) -> VariantIndex {
        let (types, options, variants, tags) = self.into_parts();
        VariantIndex::from_parts(1, types, options, variants, tags)
    }
}
