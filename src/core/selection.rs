//! Attribute selections - the user's in-progress navigation state.
//!
//! A [`Selection`] maps attribute type slugs to option values, e.g.
//! `{color: "Black", length: "30cm"}`. The same type doubles as the tag set of
//! a single variant. Parsing is permissive: malformed entries are dropped, never
//! rejected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query keys that carry request routing rather than attribute selections.
pub const RESERVED_KEYS: [&str; 2] = ["product_slug", "format"];

/// Ordered mapping from attribute slug to selected value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, String>);

impl Selection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, slug: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(slug, value);
        self
    }

    /// Sets the value for `slug`, returning the previous value.
    pub fn insert(&mut self, slug: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(slug.into(), value.into())
    }

    /// Selected value for `slug`.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&str> {
        self.0.get(slug).map(String::as_str)
    }

    /// Number of constrained axes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(slug, value)` pairs in slug order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy of this selection with `slug` removed.
    #[must_use]
    pub fn without(&self, slug: &str) -> Self {
        let mut other = self.clone();
        other.0.remove(slug);
        other
    }

    /// Builds a selection from decoded query pairs.
    ///
    /// Reserved keys, blank keys and blank values are skipped.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut selection = Self::new();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref().trim(), value.as_ref());
            if key.is_empty() || value.is_empty() || RESERVED_KEYS.contains(&key) {
                continue;
            }
            selection.insert(key, value);
        }
        selection
    }

    /// Parses an `application/x-www-form-urlencoded` query string such as
    /// `color=Black&length=30cm`. A leading `?` is accepted.
    #[must_use]
    pub fn parse_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_query_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Parses `slug=value` arguments, ignoring entries without a separator.
    pub fn parse_assignments<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::from_query_pairs(items.into_iter().filter_map(|item| item.split_once('=')))
    }

    /// Parses a single `slug:value` attribute filter.
    #[must_use]
    pub fn parse_filter(filter: &str) -> Option<(&str, &str)> {
        let (slug, value) = filter.split_once(':')?;
        (!slug.trim().is_empty() && !value.is_empty()).then(|| (slug.trim(), value))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Selection {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
