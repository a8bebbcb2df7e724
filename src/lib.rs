// ==========================================
// Product Catalog Import - Library root
// ==========================================
// Layers: domain (entities) -> repository (SQLite gateway + job ledger)
//   -> importer (file-to-catalog pipeline)
// ==========================================

pub mod config;
pub mod db;
pub mod domain;
pub mod importer;
pub mod logging;
pub mod repository;

/// Crate version, surfaced by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name used in logs
pub const APP_NAME: &str = "catalog-import";
