//! /api/bundlegroups routes.
//!
//! Reads are public; create and update check the caller's roles before the
//! body is parsed or the core service is called.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Extension, Path, RawQuery};
use axum::http::StatusCode;
use axum::Json;
use hub_catalog_core::auth::CatalogOperation;
use hub_catalog_core::dto::{BundleGroup, BundleGroupNoId};
use hub_catalog_core::paging::PagedContent;
use hub_catalog_core::service::CatalogService;
use hub_catalog_core::CatalogError;

use crate::error::AppError;
use crate::middleware::jwt::{authorize, Principal};
use crate::query::QueryParams;

type Service = Extension<Arc<dyn CatalogService>>;

/// GET /api/bundlegroups/?organisationId=
pub async fn list(
    Extension(service): Service,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<BundleGroup>>, AppError> {
    let params = QueryParams::parse(query.as_deref());
    let groups = service
        .list_bundle_groups(params.single("organisationId"))
        .await?;
    Ok(Json(groups))
}

/// GET /api/bundlegroups/filtered
pub async fn list_filtered(
    Extension(service): Service,
    RawQuery(query): RawQuery,
) -> Result<Json<PagedContent<BundleGroup>>, AppError> {
    let raw = QueryParams::parse(query.as_deref()).raw_filter()?;
    Ok(Json(service.list_bundle_groups_filtered(&raw).await?))
}

/// GET /api/bundlegroups/:id
pub async fn get(
    Extension(service): Service,
    Path(id): Path<String>,
) -> Result<Json<BundleGroup>, AppError> {
    service
        .get_bundle_group(&id)
        .await?
        .map(Json)
        .ok_or_else(|| CatalogError::NotFound(format!("bundle group {id}")).into())
}

/// Parse a write body once the caller has been authorized.
fn parse_body(bytes: &Bytes) -> Result<BundleGroupNoId, AppError> {
    Json::<BundleGroupNoId>::from_bytes(bytes)
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// POST /api/bundlegroups/
pub async fn create(
    Extension(service): Service,
    principal: Option<Extension<Principal>>,
    bytes: Bytes,
) -> Result<(StatusCode, Json<BundleGroup>), AppError> {
    authorize(
        principal.as_ref().map(|p| &p.0),
        CatalogOperation::CreateBundleGroup,
    )?;
    let body = parse_body(&bytes)?;
    let created = service.create_bundle_group(&body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/bundlegroups/:id
pub async fn update(
    Extension(service): Service,
    principal: Option<Extension<Principal>>,
    Path(id): Path<String>,
    bytes: Bytes,
) -> Result<Json<BundleGroup>, AppError> {
    authorize(
        principal.as_ref().map(|p| &p.0),
        CatalogOperation::UpdateBundleGroup,
    )?;
    let body = parse_body(&bytes)?;
    Ok(Json(service.update_bundle_group(&id, &body).await?))
}
