pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod money;
pub mod report;
pub mod services;

/// Application version from Cargo.toml (single source of truth)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
