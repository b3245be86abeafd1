//! Variant group entity - A curated display bucket of variants (e.g. "Black Shirts").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Variant group database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "variant_groups")]
pub struct Model {
    /// Unique identifier for the group
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning product
    pub product_id: i64,
    /// Display name
    pub name: String,
    /// URL-safe identifier, unique within the product
    pub slug: String,
    /// Free-form description
    pub description: String,
    /// Inactive groups are never ranked or listed
    pub is_active: bool,
    /// Featured groups are the landing page for an empty selection
    pub is_featured: bool,
    /// Position among the product's groups
    pub display_order: i32,
    /// Image shown for the group, when one is set
    pub featured_image_id: Option<i64>,
    /// When the group was created
    pub created_at: DateTime,
    /// When the group was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `VariantGroup` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each group belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    /// Membership rows of this group
    #[sea_orm(has_many = "super::variant_group_membership::Entity")]
    Memberships,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::variant_group_membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
