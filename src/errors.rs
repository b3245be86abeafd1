//! Unified error type for the catalog and its navigation engine.
//!
//! Navigation reads never fail because a match is missing; absence is a normal
//! outcome. Errors here are reserved for store failures, bad input on the
//! write path, and lookups of entities that must exist.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by catalog operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure reported by the relational store
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A product, group, variant, option or attribute type does not exist
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of entity that was looked up
        entity: &'static str,
        /// The id or slug used for the lookup
        key: String,
    },

    /// A uniqueness rule would be violated (slug, sku, option value)
    #[error("Conflict: {message}")]
    Conflict {
        /// Which rule was violated
        message: String,
    },

    /// Input failed validation on the write path
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Why the input was rejected
        message: String,
    },

    /// A price was negative
    #[error("Invalid {field} price: {amount}")]
    InvalidPrice {
        /// Which price column was rejected
        field: &'static str,
        /// The rejected amount
        amount: Decimal,
    },

    /// JSON encoding of a navigation payload failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// True when the error describes a missing entity.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
