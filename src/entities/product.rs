//! Product entity - The base product that owns variants, options and groups.
//!
//! A product such as "Hair Extension" is sold through several variants, each
//! tagged with one option per attribute axis. Deleting a product cascades to
//! its variants, groups and product-scoped attribute options.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Basic T-Shirt")
    pub name: String,
    /// URL-safe unique identifier used by storefront lookups
    #[sea_orm(unique)]
    pub slug: String,
    /// Free-form description
    pub description: String,
    /// Inactive products are hidden from the storefront
    pub is_active: bool,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many variants
    #[sea_orm(has_many = "super::variant::Entity")]
    Variants,
    /// One product has many display groups
    #[sea_orm(has_many = "super::variant_group::Entity")]
    VariantGroups,
    /// One product scopes many attribute options
    #[sea_orm(has_many = "super::attribute_option::Entity")]
    AttributeOptions,
}

impl Related<super::variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl Related<super::variant_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VariantGroups.def()
    }
}

impl Related<super::attribute_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttributeOptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
