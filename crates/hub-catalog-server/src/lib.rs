//! hub-catalog-server: REST binding for the bundle-group catalog.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod router;
