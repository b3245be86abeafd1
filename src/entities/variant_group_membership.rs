//! Variant group membership entity - Ordered link between a group and a variant.
//!
//! A variant appears at most once per group, enforced by a unique index on
//! `(variant_group_id, variant_id)`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "variant_group_memberships")]
pub struct Model {
    /// Unique identifier for the membership
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Group the variant belongs to
    pub variant_group_id: i64,
    /// Member variant
    pub variant_id: i64,
    /// Position of the variant within the group
    pub display_order: i32,
}

/// Defines relationships between memberships and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each membership belongs to one group
    #[sea_orm(
        belongs_to = "super::variant_group::Entity",
        from = "Column::VariantGroupId",
        to = "super::variant_group::Column::Id",
        on_delete = "Cascade"
    )]
    VariantGroup,
    /// Each membership references one variant
    #[sea_orm(
        belongs_to = "super::variant::Entity",
        from = "Column::VariantId",
        to = "super::variant::Column::Id",
        on_delete = "Cascade"
    )]
    Variant,
}

impl Related<super::variant_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VariantGroup.def()
    }
}

impl Related<super::variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
