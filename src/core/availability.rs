//! Option availability - which values stay reachable from a partial selection.
//!
//! Dependencies between axes are never configured; they are inferred from the
//! variants that actually exist. If "Blonde" only ships in 50cm, selecting
//! `color=Blonde` leaves `length` with the single option "50cm".
//!
//! Each axis is resolved independently against the *other* selections. Axes are
//! not jointly reduced, so the storefront can show dead-end combinations instead
//! of silently hiding them.

use crate::{
    core::{index::VariantIndex, selection::Selection},
    entities::attribute_option,
    errors::Result,
};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::instrument;

/// One selectable option on an axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionChoice {
    /// Option id
    pub id: i64,
    /// Raw value used in selections
    pub value: String,
    /// Storefront label
    pub display_value: String,
    /// Swatch color, when the option has one
    pub color_hex: Option<String>,
    /// True when this value is the current selection on its axis
    pub is_selected: bool,
}

/// Reachable options for one attribute axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisAvailability {
    /// Attribute type name
    pub name: String,
    /// Attribute type slug
    pub slug: String,
    /// Reachable options in `(display_order, value)` order
    pub options: Vec<OptionChoice>,
}

/// Per-axis availability keyed by attribute slug.
pub type Availability = BTreeMap<String, AxisAvailability>;

/// Options of `target_slug` carried by at least one active variant that
/// satisfies every selection on the other axes.
///
/// A selection entry for `target_slug` itself is ignored. An empty result means
/// no such combination exists.
#[must_use]
pub fn available_options<'a>(
    index: &'a VariantIndex,
    selection: &Selection,
    target_slug: &str,
) -> Vec<&'a attribute_option::Model> {
    let candidates = index.active_variants().filter(|variant| {
        selection
            .iter()
            .filter(|(slug, _)| *slug != target_slug)
            .all(|(slug, value)| index.has_tag(variant, slug, value))
    });
    index.distinct_options(candidates, target_slug)
}

/// Availability for every axis used by the product, each computed with that
/// axis' own selection removed.
#[must_use]
pub fn available_options_for_all_types(index: &VariantIndex, selection: &Selection) -> Availability {
    index
        .attribute_types()
        .iter()
        .map(|attribute| {
            let others = selection.without(&attribute.slug);
            let current = selection.get(&attribute.slug);
            let options = available_options(index, &others, &attribute.slug)
                .into_iter()
                .map(|option| OptionChoice {
                    id: option.id,
                    value: option.value.clone(),
                    display_value: option.label().to_string(),
                    color_hex: option.color_hex.clone(),
                    is_selected: current == Some(option.value.as_str()),
                })
                .collect();
            (
                attribute.slug.clone(),
                AxisAvailability {
                    name: attribute.name.clone(),
                    slug: attribute.slug.clone(),
                    options,
                },
            )
        })
        .collect()
}

/// Loads the product snapshot and resolves the options of one axis.
#[instrument(skip(db))]
pub async fn load_available_options<C>(
    db: &C,
    product_id: i64,
    selection: &Selection,
    target_slug: &str,
) -> Result<Vec<attribute_option::Model>>
where
    C: ConnectionTrait,
{
    let index = VariantIndex::load(db, product_id).await?;
    Ok(available_options(&index, selection, target_slug)
        .into_iter()
        .cloned()
        .collect())
}

/// Loads the product snapshot and resolves every axis.
#[instrument(skip(db))]
pub async fn load_availability<C>(db: &C, product_id: i64, selection: &Selection) -> Result<Availability>
where
    C: ConnectionTrait,
{
    let index = VariantIndex::load(db, product_id).await?;
    Ok(available_options_for_all_types(&index, selection))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{IndexBuilder, setup_extension_catalog};
    use proptest::prelude::*;

    fn values(options: &[&attribute_option::Model]) -> Vec<String> {
        options.iter().map(|o| o.value.clone()).collect()
    }

    fn extension_index() -> VariantIndex {
        IndexBuilder::new()
            .variant("EXT-BLK-30", &[("color", "Black"), ("length", "30cm")])
            .variant("EXT-BLK-50", &[("color", "Black"), ("length", "50cm")])
            .build()
    }

    #[test]
    fn test_missing_combination_yields_empty_set() {
        let index = extension_index();
        let blonde = Selection::new().with("color", "Blonde");
        assert!(available_options(&index, &blonde, "length").is_empty());
        assert_eq!(
            values(&available_options(&index, &Selection::new(), "length")),
            ["30cm", "50cm"]
        );
    }

    #[test]
    fn test_own_selection_is_ignored() {
        let index = extension_index();
        let selection = Selection::new().with("length", "30cm");
        assert_eq!(
            values(&available_options(&index, &selection, "length")),
            ["30cm", "50cm"]
        );
    }

    #[test]
    fn test_unknown_target_is_empty() {
        let index = extension_index();
        assert!(available_options(&index, &Selection::new(), "size").is_empty());
    }

    #[test]
    fn test_inactive_variants_are_not_reachable() {
        let index = IndexBuilder::new()
            .variant("T-1", &[("number", "5"), ("length", "230m")])
            .inactive_variant("T-2", &[("number", "5"), ("length", "100m")])
            .variant("T-3", &[("number", "8"), ("length", "100m")])
            .build();
        let selection = Selection::new().with("number", "5");
        assert_eq!(values(&available_options(&index, &selection, "length")), ["230m"]);
    }

    #[test]
    fn test_options_follow_display_order_then_value() {
        let index = IndexBuilder::new()
            .variant("S-1", &[("size", "S")])
            .variant("S-2", &[("size", "M")])
            .variant("S-3", &[("size", "L")])
            .option_order("size", "S", 0)
            .option_order("size", "M", 1)
            .option_order("size", "L", 2)
            .build();
        assert_eq!(
            values(&available_options(&index, &Selection::new(), "size")),
            ["S", "M", "L"]
        );
    }

    #[test]
    fn test_all_types_marks_selected_and_excludes_own_axis() {
        let index = IndexBuilder::new()
            .variant("EXT-BLK-30", &[("color", "Black"), ("length", "30cm")])
            .variant("EXT-BLK-50", &[("color", "Black"), ("length", "50cm")])
            .variant("EXT-BLO-50", &[("color", "Blonde"), ("length", "50cm")])
            .build();
        let selection = Selection::new().with("color", "Black");
        let availability = available_options_for_all_types(&index, &selection);

        let color = &availability["color"];
        let colors: Vec<(&str, bool)> = color
            .options
            .iter()
            .map(|o| (o.value.as_str(), o.is_selected))
            .collect();
        assert_eq!(colors, [("Black", true), ("Blonde", false)]);

        let length = &availability["length"];
        let lengths: Vec<&str> = length.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(lengths, ["30cm", "50cm"]);
        assert!(length.options.iter().all(|o| !o.is_selected));
    }

    #[test]
    fn test_all_types_surfaces_dead_ends() {
        let index = IndexBuilder::new()
            .variant("EXT-BLK-30", &[("color", "Black"), ("length", "30cm")])
            .variant("EXT-BLO-50", &[("color", "Blonde"), ("length", "50cm")])
            .build();
        let selection = Selection::new().with("color", "Black").with("length", "50cm");
        let availability = available_options_for_all_types(&index, &selection);

        // Each axis is resolved against the other one only.
        let colors: Vec<&str> = availability["color"].options.iter().map(|o| o.value.as_str()).collect();
        let lengths: Vec<&str> = availability["length"].options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(colors, ["Blonde"]);
        assert_eq!(lengths, ["30cm"]);
    }

    #[tokio::test]
    async fn test_load_available_options_from_store() -> Result<()> {
        let (db, product) = setup_extension_catalog().await?;
        let selection = Selection::new().with("color", "Blonde");
        assert!(load_available_options(&db, product.id, &selection, "length").await?.is_empty());

        let all = load_available_options(&db, product.id, &Selection::new(), "length").await?;
        let lengths: Vec<&str> = all.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(lengths, ["30cm", "50cm"]);

        let availability = load_availability(&db, product.id, &Selection::new()).await?;
        assert_eq!(availability.len(), 2);
        Ok(())
    }

    const COLORS: [&str; 3] = ["Black", "Blonde", "Brown"];
    const LENGTHS: [&str; 3] = ["30cm", "50cm", "70cm"];
    const SIZES: [&str; 2] = ["S", "M"];

    fn catalog_strategy() -> impl Strategy<Value = Vec<(usize, usize, usize, bool)>> {
        prop::collection::vec((0..3usize, 0..3usize, 0..2usize, any::<bool>()), 0..12)
    }

    fn build(rows: &[(usize, usize, usize, bool)]) -> VariantIndex {
        rows.iter()
            .enumerate()
            .fold(IndexBuilder::new(), |builder, (i, &(c, l, s, active))| {
                let tags = [("color", COLORS[c]), ("length", LENGTHS[l]), ("size", SIZES[s])];
                let sku = format!("SKU-{i:02}");
                if active {
                    builder.variant(&sku, &tags)
                } else {
                    builder.inactive_variant(&sku, &tags)
                }
            })
            .build()
    }

    proptest! {
        #[test]
        fn adding_a_constraint_never_grows_availability(
            rows in catalog_strategy(),
            color in 0..3usize,
            size in 0..2usize,
        ) {
            let index = build(&rows);
            let base = Selection::new().with("color", COLORS[color]);
            let narrowed = base.clone().with("size", SIZES[size]);

            let wide = values(&available_options(&index, &base, "length"));
            let narrow = values(&available_options(&index, &narrowed, "length"));
            prop_assert!(narrow.iter().all(|v| wide.contains(v)));
        }

        #[test]
        fn empty_selection_lists_values_of_active_variants(rows in catalog_strategy()) {
            let index = build(&rows);
            let mut expected: Vec<&str> = rows
                .iter()
                .filter(|r| r.3)
                .map(|r| LENGTHS[r.1])
                .collect();
            expected.sort_unstable();
            expected.dedup();

            let got = values(&available_options(&index, &Selection::new(), "length"));
            prop_assert_eq!(got, expected);
        }
    }
}
