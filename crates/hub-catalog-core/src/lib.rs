//! hub-catalog-core: bundle-group catalog domain.
//!
//! Pure domain types, port traits, filter normalization, entity ↔ DTO
//! mapping and the paged result envelope. Storage adapters implement
//! [`ports::BundleGroupStore`] and [`ports::CategoryDirectory`]; transport
//! bindings call [`service::CatalogService`].

pub mod auth;
pub mod dto;
pub mod error;
pub mod filter;
pub mod mapper;
pub mod memory;
pub mod paging;
pub mod ports;
pub mod service;
pub mod types;

pub use error::CatalogError;
