//! Attribute catalog business logic - attribute types and product-scoped options.
//!
//! Options are created on demand when a product's variants are tagged and are
//! unique per `(attribute type, product, value)`. An option referenced by any
//! variant cannot be deleted; the refusal is reported as a warning outcome
//! rather than an error.

use crate::{
    core::product::slugify,
    entities::{
        AttributeOption, AttributeType, Datatype, VariantAttribute, attribute_option,
        attribute_type, variant_attribute,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument, warn};

/// Input for [`get_or_create_option`].
#[derive(Debug, Clone, Copy)]
pub struct NewOption<'a> {
    /// Axis of the option
    pub attribute_type_id: i64,
    /// Product scoping the option
    pub product_id: i64,
    /// Raw value
    pub value: &'a str,
    /// Storefront label
    pub display_value: Option<&'a str>,
    /// Swatch color (`#RRGGBB`)
    pub color_hex: Option<&'a str>,
    /// Position within the axis
    pub display_order: i32,
}

impl<'a> NewOption<'a> {
    /// Option with no label, swatch, or explicit ordering.
    #[must_use]
    pub const fn new(attribute_type_id: i64, product_id: i64, value: &'a str) -> Self {
        Self {
            attribute_type_id,
            product_id,
            value,
            display_value: None,
            color_hex: None,
            display_order: 0,
        }
    }
}

/// Result of [`delete_option`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionDeletion {
    /// The option was removed
    Deleted,
    /// The option is still referenced and was kept
    InUse {
        /// Number of variants tagged with the option
        variant_count: u64,
    },
}

/// True for `#RRGGBB` hex colors.
#[must_use]
pub fn is_valid_color_hex(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Creates an attribute type. The slug is derived from the name when not given.
///
/// # Errors
/// Returns an error if the name is blank or the slug is already taken.
#[instrument(skip(db))]
pub async fn create_attribute_type<C>(
    db: &C,
    name: &str,
    slug: Option<&str>,
    datatype: Datatype,
    display_order: i32,
) -> Result<attribute_type::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput {
            message: "Attribute type name cannot be empty".to_string(),
        });
    }
    let slug = slug.map_or_else(|| slugify(name), slugify);
    if slug.is_empty() {
        return Err(Error::InvalidInput {
            message: format!("Cannot derive a slug for attribute type '{name}'"),
        });
    }
    if get_attribute_type_by_slug(db, &slug).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("Attribute type slug '{slug}' already exists"),
        });
    }

    let attribute = attribute_type::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slug),
        datatype: Set(datatype),
        display_order: Set(display_order),
        ..Default::default()
    };
    let attribute = attribute.insert(db).await?;
    info!(attribute_type_id = attribute.id, slug = %attribute.slug, "Created attribute type");
    Ok(attribute)
}

/// Finds an attribute type by slug.
pub async fn get_attribute_type_by_slug<C>(db: &C, slug: &str) -> Result<Option<attribute_type::Model>>
where
    C: ConnectionTrait,
{
    AttributeType::find()
        .filter(attribute_type::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the attribute type with `slug`, creating it when missing.
pub async fn get_or_create_attribute_type<C>(
    db: &C,
    name: &str,
    slug: &str,
    datatype: Datatype,
    display_order: i32,
) -> Result<attribute_type::Model>
where
    C: ConnectionTrait,
{
    match get_attribute_type_by_slug(db, &slugify(slug)).await? {
        Some(existing) => Ok(existing),
        None => create_attribute_type(db, name, Some(slug), datatype, display_order).await,
    }
}

/// All attribute types in `(display_order, name)` order.
pub async fn get_all_attribute_types<C>(db: &C) -> Result<Vec<attribute_type::Model>>
where
    C: ConnectionTrait,
{
    AttributeType::find()
        .order_by_asc(attribute_type::Column::DisplayOrder)
        .order_by_asc(attribute_type::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds the option `(attribute type, product, value)`.
pub async fn find_option<C>(
    db: &C,
    attribute_type_id: i64,
    product_id: i64,
    value: &str,
) -> Result<Option<attribute_option::Model>>
where
    C: ConnectionTrait,
{
    AttributeOption::find()
        .filter(attribute_option::Column::AttributeTypeId.eq(attribute_type_id))
        .filter(attribute_option::Column::ProductId.eq(product_id))
        .filter(attribute_option::Column::Value.eq(value))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the product-scoped option for `value`, creating it when missing.
///
/// Presentation fields are only applied on creation.
///
/// # Errors
/// Returns an error if the value is blank, the swatch color is malformed, or
/// the attribute type does not exist.
#[instrument(skip(db))]
pub async fn get_or_create_option<C>(db: &C, new: NewOption<'_>) -> Result<attribute_option::Model>
where
    C: ConnectionTrait,
{
    let value = new.value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput {
            message: "Option value cannot be empty".to_string(),
        });
    }
    if let Some(hex) = new.color_hex {
        if !is_valid_color_hex(hex) {
            return Err(Error::InvalidInput {
                message: format!("Color must be in #RRGGBB format, got '{hex}'"),
            });
        }
    }

    if let Some(existing) = find_option(db, new.attribute_type_id, new.product_id, value).await? {
        return Ok(existing);
    }
    if AttributeType::find_by_id(new.attribute_type_id).one(db).await?.is_none() {
        return Err(Error::not_found("AttributeType", new.attribute_type_id));
    }

    let option = attribute_option::ActiveModel {
        attribute_type_id: Set(new.attribute_type_id),
        product_id: Set(new.product_id),
        value: Set(value.to_string()),
        display_value: Set(new.display_value.map(str::to_string)),
        color_hex: Set(new.color_hex.map(str::to_string)),
        display_order: Set(new.display_order),
        ..Default::default()
    };
    option.insert(db).await.map_err(Into::into)
}

/// Updates the label, swatch and ordering of an existing option.
///
/// # Errors
/// Returns an error if the option does not exist or the color is malformed.
pub async fn update_option_presentation<C>(
    db: &C,
    option_id: i64,
    display_value: Option<&str>,
    color_hex: Option<&str>,
    display_order: i32,
) -> Result<attribute_option::Model>
where
    C: ConnectionTrait,
{
    if let Some(hex) = color_hex {
        if !is_valid_color_hex(hex) {
            return Err(Error::InvalidInput {
                message: format!("Color must be in #RRGGBB format, got '{hex}'"),
            });
        }
    }
    let mut option: attribute_option::ActiveModel = AttributeOption::find_by_id(option_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("AttributeOption", option_id))?
        .into();
    option.display_value = Set(display_value.map(str::to_string));
    option.color_hex = Set(color_hex.map(str::to_string));
    option.display_order = Set(display_order);
    option.update(db).await.map_err(Into::into)
}

/// Options of a product in `(display_order, value)` order.
pub async fn options_for_product<C>(db: &C, product_id: i64) -> Result<Vec<attribute_option::Model>>
where
    C: ConnectionTrait,
{
    AttributeOption::find()
        .filter(attribute_option::Column::ProductId.eq(product_id))
        .order_by_asc(attribute_option::Column::DisplayOrder)
        .order_by_asc(attribute_option::Column::Value)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes an option unless some variant still references it.
///
/// # Errors
/// Returns [`Error::NotFound`] if the option does not exist.
#[instrument(skip(db))]
pub async fn delete_option<C>(db: &C, option_id: i64) -> Result<OptionDeletion>
where
    C: ConnectionTrait,
{
    let option = AttributeOption::find_by_id(option_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("AttributeOption", option_id))?;

    let variant_count = VariantAttribute::find()
        .filter(variant_attribute::Column::AttributeOptionId.eq(option_id))
        .count(db)
        .await?;
    if variant_count > 0 {
        warn!(
            option_id,
            value = %option.value,
            variant_count,
            "Option is in use and was not deleted"
        );
        return Ok(OptionDeletion::InUse { variant_count });
    }

    AttributeOption::delete_by_id(option_id).exec(db).await?;
    info!(option_id, value = %option.value, "Deleted attribute option");
    Ok(OptionDeletion::Deleted)
}
