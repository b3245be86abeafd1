//! Catalog seeding - loads a [`CatalogConfig`] into the store.
//!
//! Every row is looked up by its natural key (slug or SKU) before being
//! created, so seeding the same catalog twice changes nothing. The whole seed
//! runs in one transaction.

use crate::{
    config::catalog::{CatalogConfig, GroupConfig, ProductConfig},
    core::{
        attribute::{NewOption, get_attribute_type_by_slug, get_or_create_attribute_type, get_or_create_option},
        group::{add_variants, create_group, get_group_by_slug},
        index::VariantIndex,
        product::{create_product, get_product_by_slug, slugify},
        selection::Selection,
        variant::{NewVariant, assign_option, create_variant, get_variant_by_sku},
    },
    entities::{attribute_type, product},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, DatabaseTransaction, TransactionTrait};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Rows created by [`seed_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// New attribute types
    pub attribute_types: usize,
    /// New products
    pub products: usize,
    /// New variants
    pub variants: usize,
    /// New groups
    pub groups: usize,
    /// New group memberships
    pub memberships: usize,
}

/// Seeds the catalog described by `config`.
///
/// # Errors
/// Returns an error if a variant references an attribute type that is neither
/// declared nor already stored, or if any write fails. Nothing is written in
/// that case.
#[instrument(skip(db, config))]
pub async fn seed_catalog<C>(db: &C, config: &CatalogConfig) -> Result<SeedReport>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;
    let mut report = SeedReport::default();

    let mut types: HashMap<String, attribute_type::Model> = HashMap::new();
    for declared in &config.attribute_types {
        let slug = slugify(&declared.slug);
        if get_attribute_type_by_slug(&txn, &slug).await?.is_none() {
            report.attribute_types += 1;
        }
        let kind = get_or_create_attribute_type(
            &txn,
            &declared.name,
            &slug,
            declared.datatype,
            declared.display_order,
        )
        .await?;
        types.insert(kind.slug.clone(), kind);
    }

    for product_config in &config.products {
        seed_product(&txn, product_config, &mut types, &mut report).await?;
    }

    txn.commit().await?;
    info!(?report, "Seeded catalog");
    Ok(report)
}

async fn attribute_for(
    txn: &DatabaseTransaction,
    types: &mut HashMap<String, attribute_type::Model>,
    slug: &str,
) -> Result<attribute_type::Model> {
    if let Some(kind) = types.get(slug) {
        return Ok(kind.clone());
    }
    let kind = get_attribute_type_by_slug(txn, slug)
        .await?
        .ok_or_else(|| Error::Config {
            message: format!("Unknown attribute type '{slug}'"),
        })?;
    types.insert(slug.to_string(), kind.clone());
    Ok(kind)
}

async fn seed_product(
    txn: &DatabaseTransaction,
    config: &ProductConfig,
    types: &mut HashMap<String, attribute_type::Model>,
    report: &mut SeedReport,
) -> Result<product::Model> {
    let slug = config
        .slug
        .as_deref()
        .map_or_else(|| slugify(&config.name), slugify);
    let product = match get_product_by_slug(txn, &slug).await? {
        Some(existing) => existing,
        None => {
            report.products += 1;
            create_product(txn, &config.name, Some(&slug), &config.description).await?
        }
    };

    for option in &config.options {
        let kind = attribute_for(txn, types, &option.attribute).await?;
        get_or_create_option(
            txn,
            NewOption {
                display_value: option.display_value.as_deref(),
                color_hex: option.color_hex.as_deref(),
                display_order: option.display_order,
                ..NewOption::new(kind.id, product.id, &option.value)
            },
        )
        .await?;
    }

    for variant_config in &config.variants {
        let variant = match get_variant_by_sku(txn, &variant_config.sku).await? {
            Some(existing) => existing,
            None => {
                report.variants += 1;
                let new = NewVariant {
                    name: variant_config.name.clone(),
                    cost_price: variant_config.cost_price,
                    compare_at_price: variant_config.compare_at_price,
                    stock_quantity: variant_config.stock_quantity,
                    is_active: variant_config.is_active,
                    ..NewVariant::new(product.id, variant_config.sku.clone(), variant_config.sell_price)
                };
                create_variant(txn, new).await?
            }
        };

        for (slug, value) in &variant_config.options {
            let kind = attribute_for(txn, types, slug).await?;
            let option =
                get_or_create_option(txn, NewOption::new(kind.id, product.id, value)).await?;
            assign_option(txn, variant.id, option.id).await?;
        }
    }

    for group_config in &config.groups {
        seed_group(txn, &product, group_config, report).await?;
    }

    Ok(product)
}

async fn seed_group<C>(
    txn: &C,
    product: &product::Model,
    config: &GroupConfig,
    report: &mut SeedReport,
) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let slug = config
        .slug
        .as_deref()
        .map_or_else(|| slugify(&config.name), slugify);
    let group = match get_group_by_slug(txn, product.id, &slug).await? {
        Some(existing) => existing,
        None => {
            report.groups += 1;
            create_group(
                txn,
                product.id,
                &config.name,
                Some(&slug),
                config.featured,
                config.display_order,
            )
            .await?
        }
    };

    let mut members = Vec::new();
    if !config.members.is_empty() {
        let index = VariantIndex::load(txn, product.id).await?;
        let wanted: Selection = config.members.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        members.extend(
            index
                .variants()
                .iter()
                .filter(|v| index.matching_pairs(v, &wanted) == wanted.len())
                .map(|v| v.variant.id),
        );
    }
    for sku in &config.skus {
        let variant = get_variant_by_sku(txn, sku)
            .await?
            .ok_or_else(|| Error::not_found("Variant", sku))?;
        members.push(variant.id);
    }

    report.memberships += add_variants(txn, group.id, &members).await?;
    Ok(())
}
