//! Core business logic - framework-agnostic catalog and navigation operations.
//!
//! Every function takes the database connection as a parameter. The navigation
//! engine (`index`, `availability`, `group_match`, `variant_match`,
//! `navigation`) is pure over a [`index::VariantIndex`] snapshot, with thin
//! async wrappers that load the snapshot first.

/// Attribute types and product-scoped options
pub mod attribute;
/// Which option values remain reachable from a partial selection
pub mod availability;
/// Variant groups, membership and price summaries
pub mod group;
/// Group scoring against a selection
pub mod group_match;
/// Per-call snapshot of a product's variants and tags
pub mod index;
/// Best match and group page payloads
pub mod navigation;
/// Explicit price updates and their audit trail
pub mod price_history;
/// Products and slugs
pub mod product;
/// Idempotent catalog seeding from configuration
pub mod seed;
/// The `slug -> value` selection map
pub mod selection;
/// Variants and option assignment
pub mod variant;
/// Variant scoring against a selection
pub mod variant_match;
