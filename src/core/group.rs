//! Variant group business logic - curated display buckets of variants.
//!
//! Provides functions for creating groups, managing their membership and
//! summarising their prices and stock. Groups are ordered by
//! `(display_order, name, id)` everywhere; navigation relies on that order for
//! its tie-breaks.

use crate::{
    core::{group_match::GroupMembers, index::VariantIndex, product::slugify},
    entities::{
        Product, Variant, VariantGroup, VariantGroupMembership, attribute_option, variant,
        variant_group, variant_group_membership,
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Currency prefix used in formatted price ranges.
pub const CURRENCY_PREFIX: &str = "R$";

/// Price and stock facts about a group's members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSummary {
    /// Number of member variants, active or not
    pub variant_count: usize,
    /// Number of active member variants
    pub active_variant_count: usize,
    /// Lowest sell price among active members
    pub min_price: Option<Decimal>,
    /// Highest sell price among active members
    pub max_price: Option<Decimal>,
    /// Units on hand across active members
    pub total_stock: i64,
}

impl GroupSummary {
    /// Summarises the given member variants.
    pub fn from_variants<'a, I>(variants: I) -> Self
    where
        I: IntoIterator<Item = &'a variant::Model>,
    {
        let mut summary = Self::default();
        for variant in variants {
            summary.variant_count += 1;
            if !variant.is_active {
                continue;
            }
            summary.active_variant_count += 1;
            summary.total_stock += i64::from(variant.stock_quantity);
            summary.min_price = Some(
                summary
                    .min_price
                    .map_or(variant.sell_price, |min| min.min(variant.sell_price)),
            );
            summary.max_price = Some(
                summary
                    .max_price
                    .map_or(variant.sell_price, |max| max.max(variant.sell_price)),
            );
        }
        summary
    }

    /// `"R$ 79.90"` for a single price, `"R$ 79.90 - R$ 99.90"` for a range,
    /// `None` when no member is active.
    #[must_use]
    pub fn price_range(&self) -> Option<String> {
        let (min, max) = (self.min_price?, self.max_price?);
        if min == max {
            Some(format!("{CURRENCY_PREFIX} {min:.2}"))
        } else {
            Some(format!("{CURRENCY_PREFIX} {min:.2} - {CURRENCY_PREFIX} {max:.2}"))
        }
    }
}

/// Creates a group for a product. The slug is derived from the name when not
/// given and must be unique within the product.
///
/// # Errors
/// Returns an error if the name is blank, the product does not exist, or the
/// slug is already used by another group of the product.
#[instrument(skip(db))]
pub async fn create_group<C>(
    db: &C,
    product_id: i64,
    name: &str,
    slug: Option<&str>,
    is_featured: bool,
    display_order: i32,
) -> Result<variant_group::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput {
            message: "Group name cannot be empty".to_string(),
        });
    }

    if Product::find_by_id(product_id).one(db).await?.is_none() {
        return Err(Error::not_found("Product", product_id));
    }

    let slug = slug.map_or_else(|| slugify(name), slugify);
    if get_group_by_slug(db, product_id, &slug).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("Group slug '{slug}' already exists for product {product_id}"),
        });
    }

    let now = chrono::Utc::now().naive_utc();
    let group = variant_group::ActiveModel {
        product_id: Set(product_id),
        name: Set(name.to_string()),
        slug: Set(slug),
        description: Set(String::new()),
        is_active: Set(true),
        is_featured: Set(is_featured),
        display_order: Set(display_order),
        featured_image_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let group = group.insert(db).await?;
    info!(group_id = group.id, slug = %group.slug, "Created variant group");
    Ok(group)
}

/// Retrieves a group by id.
pub async fn get_group_by_id<C>(db: &C, group_id: i64) -> Result<Option<variant_group::Model>>
where
    C: ConnectionTrait,
{
    VariantGroup::find_by_id(group_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a group by its product-scoped slug.
pub async fn get_group_by_slug<C>(
    db: &C,
    product_id: i64,
    slug: &str,
) -> Result<Option<variant_group::Model>>
where
    C: ConnectionTrait,
{
    VariantGroup::find()
        .filter(variant_group::Column::ProductId.eq(product_id))
        .filter(variant_group::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Active groups of a product in `(display_order, name, id)` order.
pub async fn active_groups<C>(db: &C, product_id: i64) -> Result<Vec<variant_group::Model>>
where
    C: ConnectionTrait,
{
    VariantGroup::find()
        .filter(variant_group::Column::ProductId.eq(product_id))
        .filter(variant_group::Column::IsActive.eq(true))
        .order_by_asc(variant_group::Column::DisplayOrder)
        .order_by_asc(variant_group::Column::Name)
        .order_by_asc(variant_group::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Member variant ids of a group in `(display_order, id)` membership order.
pub async fn member_ids<C>(db: &C, group_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    Ok(VariantGroupMembership::find()
        .filter(variant_group_membership::Column::VariantGroupId.eq(group_id))
        .order_by_asc(variant_group_membership::Column::DisplayOrder)
        .order_by_asc(variant_group_membership::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.variant_id)
        .collect())
}

/// Active groups of a product together with their member ids, in ranking order.
pub async fn active_groups_with_members<C>(db: &C, product_id: i64) -> Result<Vec<GroupMembers>>
where
    C: ConnectionTrait,
{
    let groups = active_groups(db, product_id).await?;
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let group_ids: Vec<i64> = groups.iter().map(|g| g.id).collect();
    let memberships = VariantGroupMembership::find()
        .filter(variant_group_membership::Column::VariantGroupId.is_in(group_ids))
        .order_by_asc(variant_group_membership::Column::DisplayOrder)
        .order_by_asc(variant_group_membership::Column::Id)
        .all(db)
        .await?;

    let mut by_group: HashMap<i64, Vec<i64>> = HashMap::new();
    for membership in memberships {
        by_group
            .entry(membership.variant_group_id)
            .or_default()
            .push(membership.variant_id);
    }

    Ok(groups
        .into_iter()
        .map(|group| GroupMembers {
            variant_ids: by_group.remove(&group.id).unwrap_or_default(),
            group,
        })
        .collect())
}

/// Adds variants to a group and returns how many memberships were created.
///
/// Variants of other products, unknown ids and existing members are skipped.
/// New members are appended after the current ones.
///
/// # Errors
/// Returns [`Error::NotFound`] if the group does not exist.
#[instrument(skip(db))]
pub async fn add_variants<C>(db: &C, group_id: i64, variant_ids: &[i64]) -> Result<usize>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let group = get_group_by_id(&txn, group_id)
        .await?
        .ok_or_else(|| Error::not_found("VariantGroup", group_id))?;
    let existing = member_ids(&txn, group_id).await?;

    let candidates = if variant_ids.is_empty() {
        Vec::new()
    } else {
        Variant::find()
            .filter(variant::Column::Id.is_in(variant_ids.to_vec()))
            .filter(variant::Column::ProductId.eq(group.product_id))
            .all(&txn)
            .await?
    };
    let valid: std::collections::HashSet<i64> = candidates.iter().map(|v| v.id).collect();

    let mut next_order = i32::try_from(existing.len()).unwrap_or(i32::MAX);
    let mut added = Vec::new();
    for &variant_id in variant_ids {
        if !valid.contains(&variant_id) || existing.contains(&variant_id) || added.contains(&variant_id) {
            continue;
        }
        variant_group_membership::ActiveModel {
            variant_group_id: Set(group_id),
            variant_id: Set(variant_id),
            display_order: Set(next_order),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        next_order = next_order.saturating_add(1);
        added.push(variant_id);
    }

    txn.commit().await?;
    info!(group_id, added = added.len(), "Added variants to group");
    Ok(added.len())
}

/// Removes variants from a group and returns how many memberships were deleted.
///
/// # Errors
/// Returns [`Error::NotFound`] if the group does not exist.
#[instrument(skip(db))]
pub async fn remove_variants<C>(db: &C, group_id: i64, variant_ids: &[i64]) -> Result<u64>
where
    C: ConnectionTrait,
{
    if get_group_by_id(db, group_id).await?.is_none() {
        return Err(Error::not_found("VariantGroup", group_id));
    }
    if variant_ids.is_empty() {
        return Ok(0);
    }

    let result = VariantGroupMembership::delete_many()
        .filter(variant_group_membership::Column::VariantGroupId.eq(group_id))
        .filter(variant_group_membership::Column::VariantId.is_in(variant_ids.to_vec()))
        .exec(db)
        .await?;
    info!(group_id, removed = result.rows_affected, "Removed variants from group");
    Ok(result.rows_affected)
}

/// Member variants of a group in membership order.
pub async fn group_variants<C>(db: &C, group_id: i64, active_only: bool) -> Result<Vec<variant::Model>>
where
    C: ConnectionTrait,
{
    let ids = member_ids(db, group_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = Variant::find().filter(variant::Column::Id.is_in(ids.clone()));
    if active_only {
        query = query.filter(variant::Column::IsActive.eq(true));
    }
    let mut by_id: HashMap<i64, variant::Model> = query
        .all(db)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();

    Ok(ids.into_iter().filter_map(|id| by_id.remove(&id)).collect())
}

/// Price and stock summary for a group.
pub async fn group_summary<C>(db: &C, group_id: i64) -> Result<GroupSummary>
where
    C: ConnectionTrait,
{
    let variants = group_variants(db, group_id, false).await?;
    Ok(GroupSummary::from_variants(&variants))
}

/// Options carried by every member of the group, inactive ones included.
pub async fn common_attribute_options<C>(
    db: &C,
    group: &variant_group::Model,
) -> Result<Vec<attribute_option::Model>>
where
    C: ConnectionTrait,
{
    let index = VariantIndex::load(db, group.product_id).await?;
    let ids = member_ids(db, group.id).await?;
    Ok(index.common_options(&ids).into_iter().cloned().collect())
}
