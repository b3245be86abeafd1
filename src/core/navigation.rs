//! Navigation orchestrator - composes availability, group and variant scoring.
//!
//! [`find_best_match`] answers "where should this selection land?" with a group
//! page when some group explains the selection well enough, a single SKU
//! otherwise, or an explicit `none`. [`navigation_data`] builds the per-axis
//! selector state of a group detail page. Both are recomputed from scratch on
//! every call.

use crate::{
    core::{
        availability::{Availability, available_options_for_all_types},
        group::{GroupSummary, active_groups_with_members, member_ids},
        group_match::{GroupMembers, best_group},
        index::VariantIndex,
        selection::Selection,
        variant_match::best_variant,
    },
    entities::{Product, product, variant_group},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

/// Most related groups listed on a group page.
pub const RELATED_GROUP_LIMIT: usize = 10;

/// Message of a `none` result.
pub const NO_MATCH_MESSAGE: &str = "No matching group or variant found";

/// Outcome of [`find_best_match`], serialized with a `type` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BestMatch {
    /// A group page represents the selection
    Group {
        /// Group id
        id: i64,
        /// Group name
        name: String,
        /// Group slug
        slug: String,
        /// Slug of the owning product
        product_slug: String,
        /// Group score for the selection
        match_score: i32,
        /// Number of member variants
        variant_count: usize,
        /// Formatted price range of the active members
        price_range: Option<String>,
        /// Per-axis availability for the selection
        available_options: Availability,
    },
    /// A single SKU is the best landing page
    Variant {
        /// Variant id
        id: i64,
        /// Variant SKU
        sku: String,
        /// Variant name
        name: String,
        /// Slug of the owning product
        product_slug: String,
        /// Storefront price
        sell_price: Decimal,
        /// Whether the SKU can be ordered
        is_in_stock: bool,
        /// Number of selection pairs
        match_score: i32,
        /// Per-axis availability for the selection
        available_options: Availability,
    },
    /// The product has nothing to show for the selection
    None {
        /// Human readable explanation
        message: String,
        /// Per-axis availability for the selection
        available_options: Availability,
    },
}

impl BestMatch {
    /// `"group"`, `"variant"` or `"none"`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Group { .. } => "group",
            Self::Variant { .. } => "variant",
            Self::None { .. } => "none",
        }
    }

    /// Availability attached to every outcome.
    #[must_use]
    pub const fn available_options(&self) -> &Availability {
        match self {
            Self::Group {
                available_options, ..
            }
            | Self::Variant {
                available_options, ..
            }
            | Self::None {
                available_options, ..
            } => available_options,
        }
    }
}

fn saturating_score(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Picks the landing page for `selection` from an already loaded snapshot.
///
/// `groups` must be the product's active groups in ranking order. A group
/// wins when its score is at least the number of selection pairs.
#[must_use]
pub fn best_match(
    index: &VariantIndex,
    groups: &[GroupMembers],
    product: &product::Model,
    selection: &Selection,
) -> BestMatch {
    let (group, group_score) = best_group(index, groups, selection);
    let variant = best_variant(index, selection);
    let available_options = available_options_for_all_types(index, selection);
    let pairs = saturating_score(selection.len());

    if let Some(group) = group.filter(|_| group_score >= pairs) {
        let members = groups
            .iter()
            .find(|g| g.group.id == group.id)
            .map(|g| g.variant_ids.as_slice())
            .unwrap_or_default();
        let summary = GroupSummary::from_variants(
            members
                .iter()
                .filter_map(|id| index.variant(*id))
                .map(|v| &v.variant),
        );
        return BestMatch::Group {
            id: group.id,
            name: group.name.clone(),
            slug: group.slug.clone(),
            product_slug: product.slug.clone(),
            match_score: group_score,
            variant_count: members.len(),
            price_range: summary.price_range(),
            available_options,
        };
    }

    if let Some(found) = variant {
        let variant = &found.variant;
        return BestMatch::Variant {
            id: variant.id,
            sku: variant.sku.clone(),
            name: variant.name.clone(),
            product_slug: product.slug.clone(),
            sell_price: variant.sell_price,
            is_in_stock: variant.is_in_stock(),
            match_score: pairs,
            available_options,
        };
    }

    BestMatch::None {
        message: NO_MATCH_MESSAGE.to_string(),
        available_options,
    }
}

/// Loads the product snapshot and its groups, then picks the landing page.
#[instrument(skip(db, product), fields(product = %product.slug))]
pub async fn find_best_match<C>(
    db: &C,
    product: &product::Model,
    selection: &Selection,
) -> Result<BestMatch>
where
    C: ConnectionTrait,
{
    let index = VariantIndex::load(db, product.id).await?;
    let groups = active_groups_with_members(db, product.id).await?;
    let result = best_match(&index, &groups, product, selection);
    debug!(kind = result.kind(), pairs = selection.len(), "Resolved best match");
    Ok(result)
}

/// `{id, name, slug}` of a group or product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Row id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Slug
    pub slug: String,
}

/// Option state on a group page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationOption {
    /// Option id
    pub id: i64,
    /// Raw value
    pub value: String,
    /// Storefront label
    pub display_value: String,
    /// Swatch color
    pub color_hex: Option<String>,
    /// Carried by some active member of the group
    pub is_current: bool,
    /// Carried by every active member of the group
    pub is_fixed: bool,
}

/// Selector state of one axis on a group page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisNavigation {
    /// The axis
    pub attribute_type: Summary,
    /// True when every active member shares one value on this axis
    pub is_fixed: bool,
    /// The shared value, when fixed
    pub fixed_value: Option<String>,
    /// Options used by the product's active variants, in storefront order
    pub options: Vec<NavigationOption>,
}

/// Another active group of the same product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedGroup {
    /// Group id
    pub id: i64,
    /// Group name
    pub name: String,
    /// Group slug
    pub slug: String,
    /// Number of member variants
    pub variant_count: usize,
}

/// Payload of a group detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupNavigation {
    /// The group being shown
    pub current_group: Summary,
    /// Its product
    pub product: Summary,
    /// `slug -> value` shared by every active member
    pub common_attributes: BTreeMap<String, String>,
    /// Selector state per axis, in attribute type order
    pub attribute_navigation: Vec<AxisNavigation>,
    /// Other active groups, at most [`RELATED_GROUP_LIMIT`]
    pub related_groups: Vec<RelatedGroup>,
}

/// Builds the group page payload from an already loaded snapshot.
///
/// `groups` are the product's active groups in ranking order; the current
/// group is excluded from the related list.
#[must_use]
pub fn group_navigation(
    index: &VariantIndex,
    product: &product::Model,
    group: &variant_group::Model,
    member_ids: &[i64],
    groups: &[GroupMembers],
) -> GroupNavigation {
    let members = index.active_members(member_ids);

    let common_attributes: BTreeMap<String, String> = index
        .common_options(member_ids)
        .into_iter()
        .filter_map(|option| Some((index.slug_of(option)?.to_string(), option.value.clone())))
        .collect();

    let attribute_navigation = index
        .attribute_types()
        .iter()
        .map(|attribute| {
            let slug = attribute.slug.as_str();
            let fixed_value = common_attributes.get(slug).cloned();
            let current: BTreeSet<&str> = members
                .iter()
                .filter_map(|variant| index.value_of(variant, slug))
                .collect();
            let options = index
                .distinct_options(index.active_variants(), slug)
                .into_iter()
                .map(|option| NavigationOption {
                    id: option.id,
                    value: option.value.clone(),
                    display_value: option.label().to_string(),
                    color_hex: option.color_hex.clone(),
                    is_current: current.contains(option.value.as_str()),
                    is_fixed: fixed_value.as_deref() == Some(option.value.as_str()),
                })
                .collect();
            AxisNavigation {
                attribute_type: Summary {
                    id: attribute.id,
                    name: attribute.name.clone(),
                    slug: attribute.slug.clone(),
                },
                is_fixed: fixed_value.is_some(),
                fixed_value,
                options,
            }
        })
        .collect();

    let related_groups = groups
        .iter()
        .filter(|other| other.group.id != group.id)
        .take(RELATED_GROUP_LIMIT)
        .map(|other| RelatedGroup {
            id: other.group.id,
            name: other.group.name.clone(),
            slug: other.group.slug.clone(),
            variant_count: other.variant_ids.len(),
        })
        .collect();

    GroupNavigation {
        current_group: Summary {
            id: group.id,
            name: group.name.clone(),
            slug: group.slug.clone(),
        },
        product: Summary {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
        },
        common_attributes,
        attribute_navigation,
        related_groups,
    }
}

/// Loads everything a group page needs and builds its payload.
///
/// # Errors
/// Returns [`Error::NotFound`] if the group's product no longer exists.
#[instrument(skip(db, group), fields(group_id = group.id))]
pub async fn navigation_data<C>(db: &C, group: &variant_group::Model) -> Result<GroupNavigation>
where
    C: ConnectionTrait,
{
    let product = Product::find_by_id(group.product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product", group.product_id))?;
    let index = VariantIndex::load(db, product.id).await?;
    let members = member_ids(db, group.id).await?;
    let groups = active_groups_with_members(db, product.id).await?;
    Ok(group_navigation(&index, &product, group, &members, &groups))
}
