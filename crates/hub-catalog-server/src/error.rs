//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hub_catalog_core::CatalogError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Catalog(CatalogError),
    /// Query string the catalog could not interpret (missing/non-numeric paging).
    BadRequest(String),
    /// No usable bearer token on a protected operation.
    Unauthorized(String),
    /// Valid token without any of the required roles.
    Forbidden(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(err) => StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Catalog(CatalogError::StorageFailure(err)) => {
                tracing::error!("storage failure: {:#}", err);
                "internal storage error".to_string()
            }
            Self::Catalog(err) => err.to_string(),
            Self::BadRequest(msg) | Self::Unauthorized(msg) | Self::Forbidden(msg) => msg,
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_errors_keep_their_status() {
        let not_found = AppError::from(CatalogError::NotFound("bundle group 7".into()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        let bad = AppError::from(CatalogError::UnknownStatus("LIVE".into()));
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        let storage = AppError::from(CatalogError::StorageFailure(anyhow::anyhow!("boom")));
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_errors() {
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn storage_detail_is_not_leaked() {
        use http_body_util::BodyExt;

        let response =
            AppError::from(CatalogError::StorageFailure(anyhow::anyhow!("password=hunter2")))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal storage error");
    }
}
