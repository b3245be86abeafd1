//! Group match scoring - ranks display groups against a selection.
//!
//! For every selected `(slug, value)` a group earns 2 points when all of its
//! active members carry the tag (the tag defines the group), 1 point when only
//! some do, and nothing otherwise. A group without active members scores
//! [`UNRANKABLE`] and can never be chosen.

use crate::{
    core::{index::VariantIndex, selection::Selection},
    entities::variant_group,
    errors::Result,
};
use sea_orm::ConnectionTrait;
use tracing::{debug, instrument};

/// Score of a group that has no active members.
pub const UNRANKABLE: i32 = -1;

/// A group and the ids of its member variants, in membership order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembers {
    /// The group row
    pub group: variant_group::Model,
    /// Member variant ids
    pub variant_ids: Vec<i64>,
}

/// Scores one group, in `[-1, 2 * selection.len()]`.
#[must_use]
pub fn score_group(index: &VariantIndex, members: &GroupMembers, selection: &Selection) -> i32 {
    let active = index.active_members(&members.variant_ids);
    if active.is_empty() {
        return UNRANKABLE;
    }

    selection
        .iter()
        .map(|(slug, value)| {
            let matching = active
                .iter()
                .filter(|variant| index.has_tag(variant, slug, value))
                .count();
            if matching == active.len() {
                2
            } else if matching > 0 {
                1
            } else {
                0
            }
        })
        .sum()
}

/// Picks the best group among `groups`, which must already be in
/// `(display_order, name, id)` order. The first group wins a tie.
///
/// With an empty selection the first featured group is returned, falling back
/// to the first group; in that case the score is 0. Groups without active
/// members are never returned.
#[must_use]
pub fn best_group<'a>(
    index: &VariantIndex,
    groups: &'a [GroupMembers],
    selection: &Selection,
) -> (Option<&'a variant_group::Model>, i32) {
    if selection.is_empty() {
        let rankable: Vec<&GroupMembers> = groups
            .iter()
            .filter(|g| !index.active_members(&g.variant_ids).is_empty())
            .collect();
        let landing = rankable
            .iter()
            .copied()
            .find(|g| g.group.is_featured)
            .or_else(|| rankable.first().copied())
            .map(|g| &g.group);
        return (landing, 0);
    }

    let mut best: Option<&variant_group::Model> = None;
    let mut best_score = UNRANKABLE;
    for members in groups {
        let score = score_group(index, members, selection);
        if score > best_score {
            best_score = score;
            best = Some(&members.group);
        }
    }
    (best, best_score)
}

/// Loads the product snapshot and its active groups, then ranks them.
#[instrument(skip(db))]
pub async fn find_best_matching_group<C>(
    db: &C,
    product_id: i64,
    selection: &Selection,
) -> Result<(Option<variant_group::Model>, i32)>
where
    C: ConnectionTrait,
{
    let index = VariantIndex::load(db, product_id).await?;
    let groups = crate::core::group::active_groups_with_members(db, product_id).await?;
    let (group, score) = best_group(&index, &groups, selection);
    debug!(group = ?group.map(|g| g.id), score, "Ranked variant groups");
    Ok((group.cloned(), score))
}
