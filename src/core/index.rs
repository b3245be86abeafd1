//! Variant index - a per-call snapshot of one product's variants and their tags.
//!
//! Every navigation entry point loads a fresh index with a handful of filtered
//! queries and then works purely in memory. Rows that vanish between those
//! queries (a variant or option deleted concurrently) are skipped, so a
//! changing catalog can yield a stale answer but never a failure.

use crate::{
    core::selection::Selection,
    entities::{
        AttributeOption, AttributeType, Variant, VariantAttribute, attribute_option,
        attribute_type, variant, variant_attribute,
    },
    errors::Result,
};
use sea_orm::{QueryOrder, prelude::*};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// A variant together with its `attribute slug -> option id` tags.
#[derive(Debug, Clone)]
pub struct IndexedVariant {
    /// The variant row
    pub variant: variant::Model,
    tags: BTreeMap<String, i64>,
}

impl IndexedVariant {
    /// Option id carried on the given axis.
    #[must_use]
    pub fn option_id(&self, slug: &str) -> Option<i64> {
        self.tags.get(slug).copied()
    }

    /// All option ids carried by the variant.
    pub fn option_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.tags.values().copied()
    }
}

/// Snapshot of a product's attribute catalog and variants.
#[derive(Debug, Clone, Default)]
pub struct VariantIndex {
    product_id: i64,
    types: Vec<attribute_type::Model>,
    options: HashMap<i64, attribute_option::Model>,
    variants: Vec<IndexedVariant>,
}

impl VariantIndex {
    /// Loads the snapshot for `product_id` from the store.
    pub async fn load<C>(db: &C, product_id: i64) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        let variants = Variant::find()
            .filter(variant::Column::ProductId.eq(product_id))
            .order_by_asc(variant::Column::Sku)
            .order_by_asc(variant::Column::Id)
            .all(db)
            .await?;

        let options = AttributeOption::find()
            .filter(attribute_option::Column::ProductId.eq(product_id))
            .all(db)
            .await?;

        let variant_ids: Vec<i64> = variants.iter().map(|v| v.id).collect();
        let tags = if variant_ids.is_empty() {
            Vec::new()
        } else {
            VariantAttribute::find()
                .filter(variant_attribute::Column::VariantId.is_in(variant_ids))
                .all(db)
                .await?
        };

        let type_ids: BTreeSet<i64> = options.iter().map(|o| o.attribute_type_id).collect();
        let types = if type_ids.is_empty() {
            Vec::new()
        } else {
            AttributeType::find()
                .filter(attribute_type::Column::Id.is_in(type_ids))
                .all(db)
                .await?
        };

        debug!(
            product_id,
            variants = variants.len(),
            options = options.len(),
            tags = tags.len(),
            "Loaded variant index"
        );
        Ok(Self::from_parts(product_id, types, options, variants, tags))
    }

    /// Builds the snapshot from rows already in memory.
    ///
    /// Tags pointing at unknown options or types are dropped, as are options
    /// of other products. Attribute types are kept only when some variant of
    /// the product uses them.
    #[must_use]
    pub fn from_parts(
        product_id: i64,
        types: Vec<attribute_type::Model>,
        options: Vec<attribute_option::Model>,
        mut variants: Vec<variant::Model>,
        tags: Vec<variant_attribute::Model>,
    ) -> Self {
        let type_slugs: HashMap<i64, String> =
            types.iter().map(|t| (t.id, t.slug.clone())).collect();
        let options: HashMap<i64, attribute_option::Model> = options
            .into_iter()
            .filter(|o| o.product_id == product_id && type_slugs.contains_key(&o.attribute_type_id))
            .map(|o| (o.id, o))
            .collect();

        variants.retain(|v| v.product_id == product_id);
        variants.sort_by(|a, b| a.sku.cmp(&b.sku).then(a.id.cmp(&b.id)));

        let mut tags_by_variant: HashMap<i64, BTreeMap<String, i64>> = HashMap::new();
        for tag in tags {
            let Some(option) = options.get(&tag.attribute_option_id) else {
                continue;
            };
            let Some(slug) = type_slugs.get(&option.attribute_type_id) else {
                continue;
            };
            tags_by_variant
                .entry(tag.variant_id)
                .or_default()
                .insert(slug.clone(), option.id);
        }

        let variants: Vec<IndexedVariant> = variants
            .into_iter()
            .map(|variant| IndexedVariant {
                tags: tags_by_variant.remove(&variant.id).unwrap_or_default(),
                variant,
            })
            .collect();

        let used_slugs: BTreeSet<&str> = variants
            .iter()
            .flat_map(|v| v.tags.keys().map(String::as_str))
            .collect();
        let mut types: Vec<attribute_type::Model> = types
            .into_iter()
            .filter(|t| used_slugs.contains(t.slug.as_str()))
            .collect();
        types.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
                .then(a.id.cmp(&b.id))
        });

        Self {
            product_id,
            types,
            options,
            variants,
        }
    }

    /// Product the snapshot belongs to.
    #[must_use]
    pub const fn product_id(&self) -> i64 {
        self.product_id
    }

    /// Attribute types used by the product, ordered by `(display_order, name)`.
    #[must_use]
    pub fn attribute_types(&self) -> &[attribute_type::Model] {
        &self.types
    }

    /// Looks up an option of this product by id.
    #[must_use]
    pub fn option(&self, option_id: i64) -> Option<&attribute_option::Model> {
        self.options.get(&option_id)
    }

    /// Every variant, active or not, in `(sku, id)` order.
    #[must_use]
    pub fn variants(&self) -> &[IndexedVariant] {
        &self.variants
    }

    /// Active variants in `(sku, id)` order.
    pub fn active_variants(&self) -> impl Iterator<Item = &IndexedVariant> {
        self.variants.iter().filter(|v| v.variant.is_active)
    }

    /// Looks up a variant by id.
    #[must_use]
    pub fn variant(&self, variant_id: i64) -> Option<&IndexedVariant> {
        self.variants.iter().find(|v| v.variant.id == variant_id)
    }

    /// Value carried by `variant` on the `slug` axis.
    #[must_use]
    pub fn value_of(&self, variant: &IndexedVariant, slug: &str) -> Option<&str> {
        variant
            .option_id(slug)
            .and_then(|id| self.options.get(&id))
            .map(|o| o.value.as_str())
    }

    /// True when `variant` is tagged `slug = value`.
    #[must_use]
    pub fn has_tag(&self, variant: &IndexedVariant, slug: &str, value: &str) -> bool {
        self.value_of(variant, slug) == Some(value)
    }

    /// Number of selection pairs the variant satisfies.
    #[must_use]
    pub fn matching_pairs(&self, variant: &IndexedVariant, selection: &Selection) -> usize {
        selection
            .iter()
            .filter(|(slug, value)| self.has_tag(variant, slug, value))
            .count()
    }

    /// The variant's tags as a selection.
    #[must_use]
    pub fn tags_of(&self, variant: &IndexedVariant) -> Selection {
        variant
            .tags
            .iter()
            .filter_map(|(slug, id)| Some((slug.clone(), self.options.get(id)?.value.clone())))
            .collect()
    }

    /// Sorts options into storefront order: `(display_order, value, id)`.
    pub fn sort_options(options: &mut [&attribute_option::Model]) {
        options.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.value.cmp(&b.value))
                .then(a.id.cmp(&b.id))
        });
    }

    /// Distinct options on `slug` used by the given variants, in storefront order.
    #[must_use]
    pub fn distinct_options<'a, I>(&'a self, variants: I, slug: &str) -> Vec<&'a attribute_option::Model>
    where
        I: IntoIterator<Item = &'a IndexedVariant>,
    {
        let ids: BTreeSet<i64> = variants
            .into_iter()
            .filter_map(|v| v.option_id(slug))
            .collect();
        let mut options: Vec<&attribute_option::Model> =
            ids.iter().filter_map(|id| self.options.get(id)).collect();
        Self::sort_options(&mut options);
        options
    }

    /// Members among `member_ids`, active or not, in index order. Unknown ids are ignored.
    #[must_use]
    pub fn members(&self, member_ids: &[i64]) -> Vec<&IndexedVariant> {
        let wanted: BTreeSet<i64> = member_ids.iter().copied().collect();
        self.variants
            .iter()
            .filter(|v| wanted.contains(&v.variant.id))
            .collect()
    }

    /// Active members among `member_ids`, in index order. Unknown ids are ignored.
    #[must_use]
    pub fn active_members(&self, member_ids: &[i64]) -> Vec<&IndexedVariant> {
        self.members(member_ids)
            .into_iter()
            .filter(|v| v.variant.is_active)
            .collect()
    }

    /// Options carried by every member (usage count equals member count).
    ///
    /// Inactive members count too, so one deactivated SKU with a different
    /// value keeps the axis open. Empty when the group has no members.
    #[must_use]
    pub fn common_options(&self, member_ids: &[i64]) -> Vec<&attribute_option::Model> {
        let members = self.members(member_ids);
        if members.is_empty() {
            return Vec::new();
        }

        let mut usage: HashMap<i64, usize> = HashMap::new();
        for member in &members {
            for option_id in member.option_ids() {
                *usage.entry(option_id).or_default() += 1;
            }
        }

        let mut common: Vec<&attribute_option::Model> = usage
            .into_iter()
            .filter(|&(_, count)| count == members.len())
            .filter_map(|(id, _)| self.options.get(&id))
            .collect();
        Self::sort_options(&mut common);
        common
    }

    /// Slug of the attribute type an option belongs to.
    #[must_use]
    pub fn slug_of(&self, option: &attribute_option::Model) -> Option<&str> {
        self.types
            .iter()
            .find(|t| t.id == option.attribute_type_id)
            .map(|t| t.slug.as_str())
    }
}
