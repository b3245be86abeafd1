//! Application settings read from the environment.
//!
//! `main` loads `.env` with `dotenvy` before calling [`Settings::from_env`], so
//! values may come from either the process environment or the file.

use std::path::PathBuf;

/// Default seed catalog path, relative to the working directory.
pub const DEFAULT_CATALOG_CONFIG: &str = "catalog.toml";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings shared by the CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Connection string for the relational store
    pub database_url: String,
    /// Location of the TOML seed catalog
    pub catalog_config: PathBuf,
}

impl Settings {
    /// Reads `DATABASE_URL` and `CATALOG_CONFIG`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_url: super::database::get_database_url(),
            catalog_config: std::env::var("CATALOG_CONFIG")
                .map_or_else(|_| PathBuf::from(DEFAULT_CATALOG_CONFIG), PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_have_usable_defaults() {
        let settings = Settings::from_env();
        assert!(!settings.database_url.is_empty());
        assert!(!settings.catalog_config.as_os_str().is_empty());
    }
}
