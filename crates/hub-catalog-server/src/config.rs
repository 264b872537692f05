//! Server configuration from the environment.
//!
//!   HUB_CATALOG_BIND_ADDR  - listen address (default: 0.0.0.0:8080)
//!   HUB_CATALOG_STORE      - `postgres` (default) or `memory`
//!   HUB_CATALOG_JWT_SECRET - JWT HMAC secret (required)
//!
//! Postgres settings (`DATABASE_URL`, `DATABASE_POOL_SIZE`) are read by
//! [`hub_catalog_postgres::DatabaseConfig`].

use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use hub_catalog_postgres::DatabaseConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!(
                "HUB_CATALOG_STORE must be 'postgres' or 'memory', got '{other}'"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub store: StoreBackend,
    pub jwt_secret: String,
    pub database: DatabaseConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("HUB_CATALOG_BIND_ADDR")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let store = lookup("HUB_CATALOG_STORE")
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or(StoreBackend::Postgres);

        let jwt_secret = lookup("HUB_CATALOG_JWT_SECRET")
            .context("HUB_CATALOG_JWT_SECRET must be set")?;
        if jwt_secret.is_empty() {
            bail!("HUB_CATALOG_JWT_SECRET must not be empty");
        }

        let mut database = DatabaseConfig::default();
        if let Some(url) = lookup("DATABASE_URL") {
            database.database_url = url;
        }
        if let Some(size) = lookup("DATABASE_POOL_SIZE") {
            database.max_connections = size
                .parse()
                .with_context(|| format!("DATABASE_POOL_SIZE is not a number: '{size}'"))?;
        }

        Ok(Self {
            bind_addr,
            store,
            jwt_secret,
            database,
        })
    }
}
