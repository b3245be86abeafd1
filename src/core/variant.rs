//! Variant business logic - SKUs and the option tags that place them on each axis.
//!
//! A variant carries at most one option per attribute type. Assigning a second
//! option of the same type replaces the first. Variant names are generated
//! from the product name and option labels unless they were set by hand.

use crate::{
    core::selection::Selection,
    entities::{
        AttributeOption, AttributeType, Product, Variant, VariantAttribute, attribute_option,
        attribute_type, variant, variant_attribute,
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Stock level at or below which new variants are flagged as low.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Input for [`create_variant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    /// Owning product
    pub product_id: i64,
    /// Catalog-wide unique SKU
    pub sku: String,
    /// Explicit name; generated from the options when `None`
    pub name: Option<String>,
    /// Purchase cost
    pub cost_price: Option<Decimal>,
    /// Storefront price
    pub sell_price: Decimal,
    /// "Was" price
    pub compare_at_price: Option<Decimal>,
    /// Units on hand
    pub stock_quantity: i32,
    /// Whether stock is tracked at all
    pub track_inventory: bool,
    /// Whether orders are accepted without stock
    pub allow_backorder: bool,
    /// Low stock threshold
    pub low_stock_threshold: i32,
    /// Weight in kilograms
    pub weight: Option<Decimal>,
    /// Whether the variant is visible to navigation
    pub is_active: bool,
}

impl NewVariant {
    /// An active, tracked variant with no stock and default thresholds.
    pub fn new(product_id: i64, sku: impl Into<String>, sell_price: Decimal) -> Self {
        Self {
            product_id,
            sku: sku.into(),
            name: None,
            cost_price: None,
            sell_price,
            compare_at_price: None,
            stock_quantity: 0,
            track_inventory: true,
            allow_backorder: false,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            weight: None,
            is_active: true,
        }
    }
}

/// Rejects negative prices.
///
/// # Errors
/// Returns [`Error::InvalidPrice`] naming the offending column.
pub fn validate_price(field: &'static str, amount: Option<Decimal>) -> Result<()> {
    match amount {
        Some(amount) if amount.is_sign_negative() && !amount.is_zero() => {
            Err(Error::InvalidPrice { field, amount })
        }
        _ => Ok(()),
    }
}

/// Creates a variant.
///
/// # Errors
/// Returns an error if:
/// - The SKU is blank or already used by any product
/// - A price is negative
/// - The product does not exist
#[instrument(skip(db, new), fields(sku = %new.sku))]
pub async fn create_variant<C>(db: &C, new: NewVariant) -> Result<variant::Model>
where
    C: ConnectionTrait,
{
    let sku = new.sku.trim().to_string();
    if sku.is_empty() {
        return Err(Error::InvalidInput {
            message: "SKU cannot be empty".to_string(),
        });
    }
    validate_price("cost", new.cost_price)?;
    validate_price("sell", Some(new.sell_price))?;
    validate_price("compare", new.compare_at_price)?;

    let product = Product::find_by_id(new.product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product", new.product_id))?;
    if get_variant_by_sku(db, &sku).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("SKU '{sku}' already exists"),
        });
    }

    let explicit_name = new.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let (name, auto_name) = match explicit_name {
        Some(name) => (name.to_string(), false),
        None => (format!("{} - {sku}", product.name), true),
    };

    let now = chrono::Utc::now().naive_utc();
    let variant = variant::ActiveModel {
        product_id: Set(product.id),
        sku: Set(sku),
        name: Set(name),
        auto_name: Set(auto_name),
        cost_price: Set(new.cost_price),
        sell_price: Set(new.sell_price),
        compare_at_price: Set(new.compare_at_price),
        stock_quantity: Set(new.stock_quantity),
        track_inventory: Set(new.track_inventory),
        allow_backorder: Set(new.allow_backorder),
        low_stock_threshold: Set(new.low_stock_threshold),
        weight: Set(new.weight),
        is_active: Set(new.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let variant = variant.insert(db).await?;
    info!(variant_id = variant.id, product_id = product.id, "Created variant");
    Ok(variant)
}

/// Finds a variant by SKU.
pub async fn get_variant_by_sku<C>(db: &C, sku: &str) -> Result<Option<variant::Model>>
where
    C: ConnectionTrait,
{
    Variant::find()
        .filter(variant::Column::Sku.eq(sku))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a variant by id.
pub async fn get_variant_by_id<C>(db: &C, variant_id: i64) -> Result<Option<variant::Model>>
where
    C: ConnectionTrait,
{
    Variant::find_by_id(variant_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All variants of a product in SKU order.
pub async fn variants_for_product<C>(db: &C, product_id: i64) -> Result<Vec<variant::Model>>
where
    C: ConnectionTrait,
{
    Variant::find()
        .filter(variant::Column::ProductId.eq(product_id))
        .order_by_asc(variant::Column::Sku)
        .order_by_asc(variant::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn require_variant<C>(db: &C, variant_id: i64) -> Result<variant::Model>
where
    C: ConnectionTrait,
{
    get_variant_by_id(db, variant_id)
        .await?
        .ok_or_else(|| Error::not_found("Variant", variant_id))
}

/// Tags `variant_id` with `option_id`, replacing any option of the same type.
///
/// Generated names are refreshed afterwards.
///
/// # Errors
/// Returns an error if the variant or option does not exist, or if the option
/// belongs to another product.
#[instrument(skip(db))]
pub async fn assign_option<C>(
    db: &C,
    variant_id: i64,
    option_id: i64,
) -> Result<variant_attribute::Model>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let variant = require_variant(&txn, variant_id).await?;
    let option = AttributeOption::find_by_id(option_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("AttributeOption", option_id))?;
    if option.product_id != variant.product_id {
        return Err(Error::InvalidInput {
            message: format!(
                "Option {option_id} belongs to product {}, not {}",
                option.product_id, variant.product_id
            ),
        });
    }

    let existing = VariantAttribute::find()
        .filter(variant_attribute::Column::VariantId.eq(variant_id))
        .filter(variant_attribute::Column::AttributeTypeId.eq(option.attribute_type_id))
        .one(&txn)
        .await?;

    let tag = match existing {
        Some(tag) if tag.attribute_option_id == option_id => tag,
        Some(tag) => {
            debug!(
                variant_id,
                old_option = tag.attribute_option_id,
                new_option = option_id,
                "Replacing option on variant"
            );
            let mut tag: variant_attribute::ActiveModel = tag.into();
            tag.attribute_option_id = Set(option_id);
            tag.update(&txn).await?
        }
        None => {
            variant_attribute::ActiveModel {
                variant_id: Set(variant_id),
                attribute_option_id: Set(option_id),
                attribute_type_id: Set(option.attribute_type_id),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    if variant.auto_name {
        refresh_name(&txn, variant).await?;
    }

    txn.commit().await?;
    Ok(tag)
}

/// Removes the option carried on the given attribute type, if any.
/// Returns whether a tag was removed.
pub async fn unassign_attribute<C>(db: &C, variant_id: i64, attribute_type_id: i64) -> Result<bool>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;
    let variant = require_variant(&txn, variant_id).await?;
    let result = VariantAttribute::delete_many()
        .filter(variant_attribute::Column::VariantId.eq(variant_id))
        .filter(variant_attribute::Column::AttributeTypeId.eq(attribute_type_id))
        .exec(&txn)
        .await?;
    if result.rows_affected > 0 && variant.auto_name {
        refresh_name(&txn, variant).await?;
    }
    txn.commit().await?;
    Ok(result.rows_affected > 0)
}

/// The variant's options paired with their attribute types, in
/// `(display_order, name)` type order. Dangling tags are skipped.
async fn tagged_options<C>(
    db: &C,
    variant_id: i64,
) -> Result<Vec<(attribute_type::Model, attribute_option::Model)>>
where
    C: ConnectionTrait,
{
    let tags = VariantAttribute::find()
        .filter(variant_attribute::Column::VariantId.eq(variant_id))
        .all(db)
        .await?;
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let option_ids: Vec<i64> = tags.iter().map(|t| t.attribute_option_id).collect();
    let options = AttributeOption::find()
        .filter(attribute_option::Column::Id.is_in(option_ids))
        .all(db)
        .await?;
    let type_ids: Vec<i64> = options.iter().map(|o| o.attribute_type_id).collect();
    let types: HashMap<i64, attribute_type::Model> = AttributeType::find()
        .filter(attribute_type::Column::Id.is_in(type_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let mut pairs: Vec<(attribute_type::Model, attribute_option::Model)> = options
        .into_iter()
        .filter_map(|option| Some((types.get(&option.attribute_type_id)?.clone(), option)))
        .collect();
    pairs.sort_by(|(a, _), (b, _)| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.name.cmp(&b.name))
            .then(a.id.cmp(&b.id))
    });
    Ok(pairs)
}

/// The variant's tags as a `slug -> value` selection.
pub async fn variant_options<C>(db: &C, variant_id: i64) -> Result<Selection>
where
    C: ConnectionTrait,
{
    Ok(tagged_options(db, variant_id)
        .await?
        .into_iter()
        .map(|(kind, option)| (kind.slug, option.value))
        .collect())
}

/// `"{product} - {label / label ...}"` in attribute type order, or
/// `"{product} - {sku}"` for a variant without options.
pub async fn derive_variant_name<C>(db: &C, variant: &variant::Model) -> Result<String>
where
    C: ConnectionTrait,
{
    let product = Product::find_by_id(variant.product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product", variant.product_id))?;

    let labels: Vec<String> = tagged_options(db, variant.id)
        .await?
        .iter()
        .map(|(_, option)| option.label().to_string())
        .collect();
    if labels.is_empty() {
        Ok(format!("{} - {}", product.name, variant.sku))
    } else {
        Ok(format!("{} - {}", product.name, labels.join(" / ")))
    }
}

async fn refresh_name<C>(db: &C, variant: variant::Model) -> Result<variant::Model>
where
    C: ConnectionTrait,
{
    let name = derive_variant_name(db, &variant).await?;
    if name == variant.name {
        return Ok(variant);
    }
    let mut active: variant::ActiveModel = variant.into();
    active.name = Set(name);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

/// Regenerates the name of a variant whose name was not set by hand.
///
/// # Errors
/// Returns [`Error::NotFound`] if the variant does not exist.
pub async fn refresh_variant_name<C>(db: &C, variant_id: i64) -> Result<variant::Model>
where
    C: ConnectionTrait,
{
    let variant = require_variant(db, variant_id).await?;
    if !variant.auto_name {
        return Ok(variant);
    }
    refresh_name(db, variant).await
}

/// Sets an explicit name; generated names stop following option changes.
pub async fn rename_variant<C>(db: &C, variant_id: i64, name: &str) -> Result<variant::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput {
            message: "Variant name cannot be empty".to_string(),
        });
    }
    let mut variant: variant::ActiveModel = require_variant(db, variant_id).await?.into();
    variant.name = Set(name.to_string());
    variant.auto_name = Set(false);
    variant.updated_at = Set(chrono::Utc::now().naive_utc());
    variant.update(db).await.map_err(Into::into)
}

/// Activates or deactivates a variant. Inactive variants are invisible to navigation.
#[instrument(skip(db))]
pub async fn set_variant_active<C>(db: &C, variant_id: i64, is_active: bool) -> Result<variant::Model>
where
    C: ConnectionTrait,
{
    let mut variant: variant::ActiveModel = require_variant(db, variant_id).await?.into();
    variant.is_active = Set(is_active);
    variant.updated_at = Set(chrono::Utc::now().naive_utc());
    let variant = variant.update(db).await?;
    info!(variant_id, is_active, "Updated variant visibility");
    Ok(variant)
}

/// Overwrites the stock level.
pub async fn set_stock_quantity<C>(db: &C, variant_id: i64, quantity: i32) -> Result<variant::Model>
where
    C: ConnectionTrait,
{
    let mut variant: variant::ActiveModel = require_variant(db, variant_id).await?.into();
    variant.stock_quantity = Set(quantity);
    variant.updated_at = Set(chrono::Utc::now().naive_utc());
    variant.update(db).await.map_err(Into::into)
}
