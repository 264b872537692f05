//! hub-catalog-server: standalone REST server for the bundle-group catalog.
//!
//! See [`hub_catalog_server::config`] for the environment it reads.

use std::sync::Arc;

use anyhow::{Context, Result};
use hub_catalog_core::memory::MemoryCatalogStore;
use hub_catalog_core::service::{CatalogService, CatalogServiceImpl};
use hub_catalog_postgres::PgCatalogStore;
use hub_catalog_server::config::{ServerConfig, StoreBackend};
use hub_catalog_server::middleware::jwt::JwtConfig;
use hub_catalog_server::router::build_router;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hub_catalog_server=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let service: Arc<dyn CatalogService> = match config.store {
        StoreBackend::Postgres => {
            let pool = config
                .database
                .connect()
                .await
                .context("failed to connect to database")?;
            let store = Arc::new(PgCatalogStore::new(pool));
            store.verify_schema().await?;
            tracing::info!("Using Postgres catalog store");
            Arc::new(CatalogServiceImpl::new(store.clone(), store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory catalog store; data is lost on exit");
            let store = Arc::new(MemoryCatalogStore::new());
            Arc::new(CatalogServiceImpl::new(store.clone(), store))
        }
    };

    let jwt_config = JwtConfig::from_secret(config.jwt_secret.as_bytes());
    let app = build_router(service, jwt_config);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("hub-catalog-server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
