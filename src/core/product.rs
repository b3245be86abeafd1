//! Product business logic - Handles all product-related operations.
//!
//! This module provides functions for creating and retrieving products and for
//! the derived facts the storefront needs about them (attribute axes in use,
//! variant counts). All functions are async and return Result types.

use crate::{
    core::index::VariantIndex,
    entities::{Product, Variant, attribute_type, product, variant},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Turns a display name into a URL-safe slug: lowercase ASCII letters and
/// digits separated by single hyphens.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
    }
    slug
}

/// Creates a new product. The slug is derived from the name when not given.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The slug is empty after normalisation or already taken
/// - The database insert operation fails
#[instrument(skip(db, description))]
pub async fn create_product<C>(
    db: &C,
    name: &str,
    slug: Option<&str>,
    description: &str,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput {
            message: "Product name cannot be empty".to_string(),
        });
    }

    let slug = slug.map_or_else(|| slugify(name), slugify);
    if slug.is_empty() {
        return Err(Error::InvalidInput {
            message: format!("Cannot derive a slug for product '{name}'"),
        });
    }
    if get_product_by_slug(db, &slug).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("Product slug '{slug}' already exists"),
        });
    }

    let now = chrono::Utc::now().naive_utc();
    let product = product::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slug),
        description: Set(description.to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let product = product.insert(db).await?;
    info!(product_id = product.id, slug = %product.slug, "Created product");
    Ok(product)
}

/// Finds a product by slug, returning None if not found.
pub async fn get_product_by_slug<C>(db: &C, slug: &str) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by its unique ID.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all active products, ordered alphabetically by name.
pub async fn get_all_active_products<C>(db: &C) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Attribute types used by any variant of the product, ordered by
/// `(display_order, name)`.
pub async fn attribute_types_for_product<C>(
    db: &C,
    product_id: i64,
) -> Result<Vec<attribute_type::Model>>
where
    C: ConnectionTrait,
{
    let index = VariantIndex::load(db, product_id).await?;
    Ok(index.attribute_types().to_vec())
}

/// Returns `(all variants, active variants)` for the product.
pub async fn variant_counts<C>(db: &C, product_id: i64) -> Result<(u64, u64)>
where
    C: ConnectionTrait,
{
    let total = Variant::find()
        .filter(variant::Column::ProductId.eq(product_id))
        .count(db)
        .await?;
    let active = Variant::find()
        .filter(variant::Column::ProductId.eq(product_id))
        .filter(variant::Column::IsActive.eq(true))
        .count(db)
        .await?;
    Ok((total, active))
}
