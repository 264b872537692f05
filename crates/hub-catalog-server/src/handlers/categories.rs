//! GET /api/categories/

use std::sync::Arc;

use axum::{extract::Extension, Json};
use hub_catalog_core::dto::CategoryDto;
use hub_catalog_core::service::CatalogService;

use crate::error::AppError;

pub async fn list_categories(
    Extension(service): Extension<Arc<dyn CatalogService>>,
) -> Result<Json<Vec<CategoryDto>>, AppError> {
    Ok(Json(service.list_categories().await?))
}
