//! Attribute type entity - A named axis of variation such as Color or Length.
//!
//! Attribute types are global; the concrete values on each axis are
//! [`super::attribute_option`] rows scoped to a single product.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How option values on this axis should be interpreted by the storefront
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    /// Free text ("Black", "M")
    #[sea_orm(string_value = "text")]
    Text,
    /// Integer values ("5")
    #[sea_orm(string_value = "number")]
    Number,
    /// Decimal values ("2.5")
    #[sea_orm(string_value = "decimal")]
    Decimal,
    /// Color swatch, options carry a hex code
    #[sea_orm(string_value = "color")]
    Color,
}

impl std::str::FromStr for Datatype {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "decimal" => Ok(Self::Decimal),
            "color" => Ok(Self::Color),
            other => Err(format!("unknown attribute datatype '{other}'")),
        }
    }
}

/// Attribute type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attribute_types")]
pub struct Model {
    /// Unique identifier for the attribute type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g., "Color")
    pub name: String,
    /// Selection key used in navigation queries (e.g., "color")
    #[sea_orm(unique)]
    pub slug: String,
    /// Interpretation of option values
    pub datatype: Datatype,
    /// Position of the axis in selectors and derived variant names
    pub display_order: i32,
}

/// Defines relationships between `AttributeType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One attribute type has many product-scoped options
    #[sea_orm(has_many = "super::attribute_option::Entity")]
    Options,
}

impl Related<super::attribute_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Options.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
