//! Price history entity - Append-only audit of variant price changes.
//!
//! Rows are written by the explicit price update path, one per changed price
//! column, and are never updated afterwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which price column changed
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// `cost_price`
    #[sea_orm(string_value = "cost")]
    Cost,
    /// `sell_price`
    #[sea_orm(string_value = "sell")]
    Sell,
    /// `compare_at_price`
    #[sea_orm(string_value = "compare")]
    Compare,
}

/// Price history database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_history")]
pub struct Model {
    /// Unique identifier for the audit row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Variant whose price changed
    pub variant_id: i64,
    /// Which price column changed
    pub change_type: ChangeType,
    /// Price before the change, `None` when previously unset
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub old_price: Option<Decimal>,
    /// Price after the change, `None` when cleared
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub new_price: Option<Decimal>,
    /// Who made the change, when known
    pub changed_by: Option<String>,
    /// When the change was recorded
    pub changed_at: DateTimeUtc,
    /// Free-form note attached to the change
    pub notes: String,
}

impl Model {
    /// `new - old`, or `None` when either side is unset.
    #[must_use]
    pub fn price_difference(&self) -> Option<Decimal> {
        Some(self.new_price? - self.old_price?)
    }

    /// Change relative to the old price in percent; `None` when the old price is unset or zero.
    #[must_use]
    pub fn percentage_change(&self) -> Option<Decimal> {
        let old = self.old_price.filter(|old| !old.is_zero())?;
        Some(self.price_difference()? / old * Decimal::ONE_HUNDRED)
    }
}

/// Defines relationships between `PriceHistory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each audit row belongs to one variant
    #[sea_orm(
        belongs_to = "super::variant::Entity",
        from = "Column::VariantId",
        to = "super::variant::Column::Id",
        on_delete = "Cascade"
    )]
    Variant,
}

impl Related<super::variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
