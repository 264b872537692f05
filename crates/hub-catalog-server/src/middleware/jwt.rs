//! Bearer-token decoding.
//!
//! Every request passes through [`jwt_auth`]. A valid token becomes a
//! [`Principal`] request extension; no token leaves the request anonymous
//! so public reads keep working. A token that is present but fails to
//! decode is rejected with 401 straight away.

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use hub_catalog_core::auth::{CatalogOperation, Role};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AppError;

#[derive(Clone)]
pub struct JwtConfig {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtConfig {
    /// HS256 with the shared secret. `exp` is checked when present.
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn decode(&self, token: &str) -> Result<Principal, AppError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("invalid token: {e}")))?;
        Ok(Principal::from(data.claims))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub sub: String,
    pub roles: Vec<Role>,
}

impl From<JwtClaims> for Principal {
    // Roles outside the catalog's vocabulary are ignored.
    fn from(claims: JwtClaims) -> Self {
        Self {
            sub: claims.sub,
            roles: claims.roles.iter().filter_map(|r| r.parse().ok()).collect(),
        }
    }
}

/// Reject the caller unless `principal` may run `operation`.
pub fn authorize(
    principal: Option<&Principal>,
    operation: CatalogOperation,
) -> Result<(), AppError> {
    if operation.is_public() {
        return Ok(());
    }
    let principal = principal.ok_or_else(|| {
        AppError::Unauthorized("a bearer token is required for this operation".into())
    })?;
    if operation.permits(&principal.roles) {
        Ok(())
    } else {
        warn!(sub = %principal.sub, ?operation, "caller lacks a required role");
        Err(AppError::Forbidden(format!(
            "'{}' may not perform {:?}",
            principal.sub, operation
        )))
    }
}

pub async fn jwt_auth(
    Extension(config): Extension<JwtConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let Some(header) = header {
        let Some(token) = header.strip_prefix("Bearer ") else {
            return AppError::Unauthorized("expected a Bearer token".into()).into_response();
        };
        match config.decode(token.trim()) {
            Ok(principal) => {
                debug!(sub = %principal.sub, roles = ?principal.roles, "authenticated");
                request.extensions_mut().insert(principal);
            }
            Err(err) => return err.into_response(),
        }
    }

    next.run(request).await
}
