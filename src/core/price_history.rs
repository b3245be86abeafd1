//! Price auditing - explicit price updates that leave an audit trail.
//!
//! Every price write goes through [`update_variant_prices`], which stores the
//! new prices and one `price_history` row per changed column in a single
//! transaction. Unchanged columns produce no rows.

use crate::{
    core::variant::validate_price,
    entities::{ChangeType, PriceHistory, Variant, price_history, variant},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Target prices for a variant. `None` clears an optional price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceUpdate {
    /// New cost price
    pub cost_price: Option<Decimal>,
    /// New sell price
    pub sell_price: Decimal,
    /// New compare-at price
    pub compare_at_price: Option<Decimal>,
}

impl PriceUpdate {
    /// The variant's current prices, as a starting point for edits.
    #[must_use]
    pub const fn from_variant(variant: &variant::Model) -> Self {
        Self {
            cost_price: variant.cost_price,
            sell_price: variant.sell_price,
            compare_at_price: variant.compare_at_price,
        }
    }
}

/// A single price column change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceChange {
    /// Which column changed
    pub change_type: ChangeType,
    /// Previous value
    pub old_price: Option<Decimal>,
    /// New value
    pub new_price: Option<Decimal>,
}

/// Compares old and new prices column by column, in cost, sell, compare order.
#[must_use]
pub fn price_changes(old: &PriceUpdate, new: &PriceUpdate) -> Vec<PriceChange> {
    [
        (ChangeType::Cost, old.cost_price, new.cost_price),
        (ChangeType::Sell, Some(old.sell_price), Some(new.sell_price)),
        (ChangeType::Compare, old.compare_at_price, new.compare_at_price),
    ]
    .into_iter()
    .filter(|(_, old_price, new_price)| old_price != new_price)
    .map(|(change_type, old_price, new_price)| PriceChange {
        change_type,
        old_price,
        new_price,
    })
    .collect()
}

/// Writes one audit row per changed price column and returns the rows.
pub async fn record_price_changes<C>(
    db: &C,
    variant_id: i64,
    old: &PriceUpdate,
    new: &PriceUpdate,
    changed_by: Option<&str>,
) -> Result<Vec<price_history::Model>>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();
    let mut rows = Vec::new();
    for change in price_changes(old, new) {
        let row = price_history::ActiveModel {
            variant_id: Set(variant_id),
            change_type: Set(change.change_type),
            old_price: Set(change.old_price),
            new_price: Set(change.new_price),
            changed_by: Set(changed_by.map(str::to_string)),
            changed_at: Set(now),
            notes: Set(String::new()),
            ..Default::default()
        };
        rows.push(row.insert(db).await?);
    }
    Ok(rows)
}

/// Updates a variant's prices and records the changes atomically.
///
/// # Errors
/// Returns an error if:
/// - The variant does not exist
/// - A new price is negative
/// - The database update operation fails
#[instrument(skip(db))]
pub async fn update_variant_prices<C>(
    db: &C,
    variant_id: i64,
    update: PriceUpdate,
    changed_by: Option<&str>,
) -> Result<(variant::Model, Vec<price_history::Model>)>
where
    C: TransactionTrait,
{
    validate_price("cost", update.cost_price)?;
    validate_price("sell", Some(update.sell_price))?;
    validate_price("compare", update.compare_at_price)?;

    let txn = db.begin().await?;

    let current = Variant::find_by_id(variant_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Variant", variant_id))?;
    let old = PriceUpdate::from_variant(&current);
    if old == update {
        txn.commit().await?;
        return Ok((current, Vec::new()));
    }

    let mut active: variant::ActiveModel = current.into();
    active.cost_price = Set(update.cost_price);
    active.sell_price = Set(update.sell_price);
    active.compare_at_price = Set(update.compare_at_price);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = active.update(&txn).await?;

    let history = record_price_changes(&txn, variant_id, &old, &update, changed_by).await?;
    txn.commit().await?;

    info!(variant_id, changes = history.len(), "Updated variant prices");
    Ok((updated, history))
}

/// Audit rows of a variant, newest first.
pub async fn price_history_for_variant<C>(db: &C, variant_id: i64) -> Result<Vec<price_history::Model>>
where
    C: ConnectionTrait,
{
    PriceHistory::find()
        .filter(price_history::Column::VariantId.eq(variant_id))
        .order_by_desc(price_history::Column::ChangedAt)
        .order_by_desc(price_history::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_changes_only_reports_changed_columns() {
        let old = PriceUpdate {
            cost_price: Some(dec!(50)),
            sell_price: dec!(100),
            compare_at_price: None,
        };
        let new = PriceUpdate {
            sell_price: dec!(90),
            compare_at_price: Some(dec!(100)),
            ..old
        };

        let changes = price_changes(&old, &new);
        let kinds: Vec<ChangeType> = changes.iter().map(|c| c.change_type).collect();
        assert_eq!(kinds, [ChangeType::Sell, ChangeType::Compare]);
        assert_eq!(changes[1].old_price, None);
        assert!(price_changes(&old, &old).is_empty());
    }

    #[tokio::test]
    async fn test_update_variant_prices_records_history() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Basic T-Shirt").await?;
        let variant = create_priced_variant(&db, &product, "TS-001", dec!(100), 5).await?;

        let update = PriceUpdate {
            sell_price: dec!(80),
            compare_at_price: Some(dec!(100)),
            ..PriceUpdate::from_variant(&variant)
        };
        let (updated, rows) = update_variant_prices(&db, variant.id, update, Some("admin")).await?;
        assert_eq!(updated.sell_price, dec!(80));
        assert!(updated.is_on_sale());
        assert_eq!(updated.discount_percentage(), 20);
        assert_eq!(rows.len(), 2);

        let history = price_history_for_variant(&db, variant.id).await?;
        assert_eq!(history.len(), 2);
        let sell = history
            .iter()
            .find(|h| h.change_type == ChangeType::Sell)
            .unwrap();
        assert_eq!(sell.old_price, Some(dec!(100)));
        assert_eq!(sell.new_price, Some(dec!(80)));
        assert_eq!(sell.price_difference(), Some(dec!(-20)));
        assert_eq!(sell.percentage_change(), Some(dec!(-20)));
        assert_eq!(sell.changed_by.as_deref(), Some("admin"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unchanged_prices_write_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Basic T-Shirt").await?;
        let variant = create_priced_variant(&db, &product, "TS-001", dec!(100), 5).await?;

        let (_, rows) =
            update_variant_prices(&db, variant.id, PriceUpdate::from_variant(&variant), None).await?;
        assert!(rows.is_empty());
        assert!(price_history_for_variant(&db, variant.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_newest_change_first() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Basic T-Shirt").await?;
        let variant = create_priced_variant(&db, &product, "TS-001", dec!(100), 5).await?;

        let first = PriceUpdate {
            sell_price: dec!(90),
            ..PriceUpdate::from_variant(&variant)
        };
        update_variant_prices(&db, variant.id, first, None).await?;
        let second = PriceUpdate {
            sell_price: dec!(85),
            ..first
        };
        update_variant_prices(&db, variant.id, second, None).await?;

        let history = price_history_for_variant(&db, variant.id).await?;
        let latest: Vec<Option<Decimal>> = history.iter().map(|h| h.new_price).collect();
        assert_eq!(latest, [Some(dec!(85)), Some(dec!(90))]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_bad_input() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Basic T-Shirt").await?;
        let variant = create_priced_variant(&db, &product, "TS-001", dec!(100), 5).await?;

        let negative = PriceUpdate {
            sell_price: dec!(-1),
            ..PriceUpdate::from_variant(&variant)
        };
        let result = update_variant_prices(&db, variant.id, negative, None).await;
        assert!(matches!(result, Err(Error::InvalidPrice { field: "sell", .. })));

        let missing = update_variant_prices(&db, 9999, PriceUpdate::from_variant(&variant), None).await;
        assert!(matches!(missing, Err(ref e) if e.is_not_found()));
        Ok(())
    }
}
