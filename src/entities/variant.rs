//! Variant entity - A sellable SKU tagged with one option per attribute type.
//!
//! Prices are stored as decimals. Stock facts (`is_in_stock`, `is_low_stock`)
//! and price facts (`is_on_sale`, `discount_percentage`, `profit_margin`) are
//! derived from the row and never stored.

use rust_decimal::prelude::ToPrimitive;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Variant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "variants")]
pub struct Model {
    /// Unique identifier for the variant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning product
    pub product_id: i64,
    /// Stock keeping unit, unique across the whole catalog
    #[sea_orm(unique)]
    pub sku: String,
    /// Display name, derived from the product and option labels unless set by hand
    pub name: String,
    /// True when `name` was generated and should follow option changes
    pub auto_name: bool,
    /// Purchase cost
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub cost_price: Option<Decimal>,
    /// Storefront price
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub sell_price: Decimal,
    /// "Was" price used to advertise a discount
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub compare_at_price: Option<Decimal>,
    /// Units on hand
    pub stock_quantity: i32,
    /// When false the variant is always considered in stock
    pub track_inventory: bool,
    /// Allow orders when stock is exhausted
    pub allow_backorder: bool,
    /// Stock level at or below which the variant is flagged as low
    pub low_stock_threshold: i32,
    /// Weight in kilograms
    #[sea_orm(column_type = "Decimal(Some((10, 3)))", nullable)]
    pub weight: Option<Decimal>,
    /// Inactive variants are invisible to navigation
    pub is_active: bool,
    /// When the variant was created
    pub created_at: DateTime,
    /// When the variant was last modified
    pub updated_at: DateTime,
}

impl Model {
    /// A variant can be sold when inventory is untracked, stock remains, or backorders are allowed.
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        !self.track_inventory || self.stock_quantity > 0 || self.allow_backorder
    }

    /// Tracked variants with some stock left, but no more than the threshold.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.track_inventory
            && self.stock_quantity > 0
            && self.stock_quantity <= self.low_stock_threshold
    }

    /// On sale when the compare-at price is above the sell price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price
            .is_some_and(|compare| compare > self.sell_price)
    }

    /// Whole-percent discount relative to the compare-at price, 0 when not on sale.
    #[must_use]
    pub fn discount_percentage(&self) -> u32 {
        match self.compare_at_price {
            Some(compare) if compare > self.sell_price => {
                ((compare - self.sell_price) / compare * Decimal::ONE_HUNDRED)
                    .trunc()
                    .to_u32()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Margin over cost in percent; `None` without a non-zero cost price.
    #[must_use]
    pub fn profit_margin(&self) -> Option<Decimal> {
        let cost = self.cost_price.filter(|cost| !cost.is_zero())?;
        Some((self.sell_price - cost) / cost * Decimal::ONE_HUNDRED)
    }
}

/// Defines relationships between Variant and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each variant belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    /// Option tags of this variant
    #[sea_orm(has_many = "super::variant_attribute::Entity")]
    VariantAttributes,
    /// Group memberships of this variant
    #[sea_orm(has_many = "super::variant_group_membership::Entity")]
    Memberships,
    /// Audit trail of price changes
    #[sea_orm(has_many = "super::price_history::Entity")]
    PriceHistory,
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

impl Related<super::variant_group_membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::price_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
