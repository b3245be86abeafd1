//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`; the composite uniqueness rules of the
//! catalog (product-scoped option values, one option per axis per variant,
//! group slugs per product, one membership per pair) are added as unique indexes.

use crate::entities::{
    AttributeOption, AttributeType, PriceHistory, Product, Variant, VariantAttribute,
    VariantGroup, VariantGroupMembership, attribute_option, variant_attribute, variant_group,
    variant_group_membership,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

/// Fallback used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/catalog.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the given database URL.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_attribute_options_type_product_value")
            .table(AttributeOption)
            .col(attribute_option::Column::AttributeTypeId)
            .col(attribute_option::Column::ProductId)
            .col(attribute_option::Column::Value)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_variant_attributes_variant_type")
            .table(VariantAttribute)
            .col(variant_attribute::Column::VariantId)
            .col(variant_attribute::Column::AttributeTypeId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_variant_groups_product_slug")
            .table(VariantGroup)
            .col(variant_group::Column::ProductId)
            .col(variant_group::Column::Slug)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_memberships_group_variant")
            .table(VariantGroupMembership)
            .col(variant_group_membership::Column::VariantGroupId)
            .col(variant_group_membership::Column::VariantId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}

/// Creates all catalog tables and unique indexes if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Product).await?;
    create_table(db, &schema, AttributeType).await?;
    create_table(db, &schema, AttributeOption).await?;
    create_table(db, &schema, Variant).await?;
    create_table(db, &schema, VariantAttribute).await?;
    create_table(db, &schema, VariantGroup).await?;
    create_table(db, &schema, VariantGroupMembership).await?;
    create_table(db, &schema, PriceHistory).await?;

    for index in unique_indexes() {
        db.execute(builder.build(&index)).await?;
    }

    info!("Catalog tables ensured");
    Ok(())
}
