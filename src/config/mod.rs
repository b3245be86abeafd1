/// Database configuration and connection management
pub mod database;

/// Seed catalog loading from catalog.toml
pub mod catalog;

/// Environment-driven application settings
pub mod settings;
