//! Attribute option entity - A concrete value on an axis, scoped to one product.
//!
//! `(attribute_type_id, product_id, value)` is unique. The same visible value
//! ("Black") on two products is two distinct options.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attribute option database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attribute_options")]
pub struct Model {
    /// Unique identifier for the option
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Axis this option belongs to
    pub attribute_type_id: i64,
    /// Product that scopes this option
    pub product_id: i64,
    /// Raw value matched against selections (e.g., "30cm")
    pub value: String,
    /// Optional label shown instead of `value`
    pub display_value: Option<String>,
    /// Swatch color in `#RRGGBB` form
    pub color_hex: Option<String>,
    /// Position of the option within its axis
    pub display_order: i32,
}

impl Model {
    /// Label for the storefront: the display value when set, otherwise the raw value.
    #[must_use]
    pub fn label(&self) -> &str {
        match self.display_value.as_deref() {
            Some(display) if !display.is_empty() => display,
            _ => &self.value,
        }
    }
}

/// Defines relationships between `AttributeOption` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each option belongs to one attribute type
    #[sea_orm(
        belongs_to = "super::attribute_type::Entity",
        from = "Column::AttributeTypeId",
        to = "super::attribute_type::Column::Id",
        on_delete = "Cascade"
    )]
    AttributeType,
    /// Each option is scoped to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    /// Variants tagged with this option
    #[sea_orm(has_many = "super::variant_attribute::Entity")]
    VariantAttributes,
}

impl Related<super::attribute_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttributeType.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::variant_attribute::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VariantAttributes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
