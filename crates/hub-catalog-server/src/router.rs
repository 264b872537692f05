//! Router construction for the catalog server.

use std::sync::Arc;

use axum::{middleware as axum_mw, routing::get, Extension, Router};
use hub_catalog_core::service::CatalogService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::jwt::{jwt_auth, JwtConfig};

/// Build the full axum router with all routes and middleware.
pub fn build_router(service: Arc<dyn CatalogService>, jwt_config: JwtConfig) -> Router {
    let api = Router::new()
        .route(
            "/api/bundlegroups/",
            get(handlers::bundle_groups::list).post(handlers::bundle_groups::create),
        )
        .route(
            "/api/bundlegroups/filtered",
            get(handlers::bundle_groups::list_filtered),
        )
        .route(
            "/api/bundlegroups/:id",
            get(handlers::bundle_groups::get).post(handlers::bundle_groups::update),
        )
        .route(
            "/api/categories/",
            get(handlers::categories::list_categories),
        )
        .layer(axum_mw::from_fn(jwt_auth))
        .layer(Extension(jwt_config));

    let public = Router::new().route("/health", get(handlers::health::health));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(api)
        .layer(Extension(service))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
