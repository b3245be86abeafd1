//! Variant attribute entity - Join row tagging a variant with one option.
//!
//! The attribute type of the option is copied into the row so the store can
//! enforce "one option per attribute type per variant" with a unique index on
//! `(variant_id, attribute_type_id)`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Variant attribute database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "variant_attributes")]
pub struct Model {
    /// Unique identifier for the tag
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tagged variant
    pub variant_id: i64,
    /// Option applied to the variant
    pub attribute_option_id: i64,
    /// Axis of the option, mirrored from `attribute_options`
    pub attribute_type_id: i64,
}

/// Defines relationships between `VariantAttribute` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each tag belongs to one variant
    #[sea_orm(
        belongs_to = "super::variant::Entity",
        from = "Column::VariantId",
        to = "super::variant::Column::Id",
        on_delete = "Cascade"
    )]
    Variant,
    /// Each tag references one option
    #[sea_orm(
        belongs_to = "super::attribute_option::Entity",
        from = "Column::AttributeOptionId",
        to = "super::attribute_option::Column::Id",
        on_delete = "Cascade"
    )]
    AttributeOption,
}

impl Related<super::variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variant.def()
    }
}

impl Related<super::attribute_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttributeOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
