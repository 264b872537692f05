//! hub-catalog-postgres: PostgreSQL adapter for the bundle-group catalog.
//!
//! [`PgCatalogStore`] implements both core ports against the tables in
//! `sql/schema.sql`.

pub mod config;
pub mod store;

pub use config::{mask_database_url, DatabaseConfig};
pub use store::PgCatalogStore;
