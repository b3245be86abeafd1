//! Variant match scoring - picks a single SKU for a selection.
//!
//! Used when no display group represents the selection well. The policy, in
//! order: first active variant for an empty selection; first exact
//! (conjunctive) match; the variant satisfying the most pairs; and finally the
//! first active variant. Variants are enumerated in `(sku, id)` order, so ties
//! resolve to the lowest SKU.

use crate::{
    core::{
        index::{IndexedVariant, VariantIndex},
        selection::Selection,
    },
    entities::variant,
    errors::Result,
};
use sea_orm::ConnectionTrait;
use tracing::instrument;

/// Best variant for `selection`; `None` only when the product has no active variants.
#[must_use]
pub fn best_variant<'a>(index: &'a VariantIndex, selection: &Selection) -> Option<&'a IndexedVariant> {
    let first = index.active_variants().next()?;
    if selection.is_empty() {
        return Some(first);
    }

    if let Some(exact) = index
        .active_variants()
        .find(|v| index.matching_pairs(v, selection) == selection.len())
    {
        return Some(exact);
    }

    let mut best: Option<&IndexedVariant> = None;
    let mut best_score = 0;
    for candidate in index.active_variants() {
        let score = index.matching_pairs(candidate, selection);
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }

    best.or(Some(first))
}

/// Loads the product snapshot and picks the best variant.
#[instrument(skip(db))]
pub async fn find_best_matching_variant<C>(
    db: &C,
    product_id: i64,
    selection: &Selection,
) -> Result<Option<variant::Model>>
where
    C: ConnectionTrait,
{
    let index = VariantIndex::load(db, product_id).await?;
    Ok(best_variant(&index, selection).map(|v| v.variant.clone()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{IndexBuilder, setup_extension_catalog};

    fn sku(found: Option<&IndexedVariant>) -> Option<&str> {
        found.map(|v| v.variant.sku.as_str())
    }

    fn shirts() -> VariantIndex {
        IndexBuilder::new()
            .variant("TS-BLK-M", &[("color", "Black"), ("size", "M")])
            .variant("TS-BLK-G", &[("color", "Black"), ("size", "G")])
            .variant("TS-BLU-G", &[("color", "Blue"), ("size", "G")])
            .build()
    }

    #[test]
    fn test_empty_selection_returns_first_active() {
        let index = IndexBuilder::new()
            .inactive_variant("A-0", &[("color", "Black")])
            .variant("B-1", &[("color", "Blue")])
            .build();
        assert_eq!(sku(best_variant(&index, &Selection::new())), Some("B-1"));
    }

    #[test]
    fn test_no_active_variants_returns_none() {
        let index = IndexBuilder::new()
            .inactive_variant("A-0", &[("color", "Black")])
            .build();
        assert!(best_variant(&index, &Selection::new()).is_none());
        let selection = Selection::new().with("color", "Black");
        assert!(best_variant(&index, &selection).is_none());
    }

    #[test]
    fn test_exact_match_wins() {
        let index = shirts();
        let selection = Selection::new().with("color", "Blue").with("size", "G");
        assert_eq!(sku(best_variant(&index, &selection)), Some("TS-BLU-G"));
    }

    #[test]
    fn test_partial_match_prefers_most_pairs() {
        let index = shirts();
        // No blue medium exists; both blue-G and the black ones satisfy one pair.
        let selection = Selection::new().with("color", "Blue").with("size", "M");
        assert_eq!(sku(best_variant(&index, &selection)), Some("TS-BLK-M"));

        let selection = Selection::new()
            .with("color", "Blue")
            .with("size", "G")
            .with("fit", "Slim");
        assert_eq!(sku(best_variant(&index, &selection)), Some("TS-BLU-G"));
    }

    #[test]
    fn test_falls_back_to_first_active_when_nothing_matches() {
        let index = shirts();
        let selection = Selection::new().with("color", "Green");
        assert_eq!(sku(best_variant(&index, &selection)), Some("TS-BLK-G"));
    }

    #[tokio::test]
    async fn test_find_best_matching_variant_from_store() -> Result<()> {
        let (db, product) = setup_extension_catalog().await?;
        let selection = Selection::new().with("length", "50cm");
        let found = find_best_matching_variant(&db, product.id, &selection).await?;
        assert_eq!(found.unwrap().sku, "EXT-BLK-50");

        let fallback = find_best_matching_variant(&db, 9999, &Selection::new()).await?;
        assert!(fallback.is_none());
        Ok(())
    }
}
