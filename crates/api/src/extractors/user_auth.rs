//! User JWT authentication extractor.
//!
//! Validates the Bearer token issued by the sign-on service and exposes the
//! username it was issued for.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared::jwt::JwtError;

use crate::app::AppState;
use crate::error::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated dashboard user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuth {
    /// Username from the JWT subject claim.
    pub username: String,
    /// JWT ID (jti), logged for session tracing.
    pub jti: String,
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = bearer_token(auth_header).ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let claims = state.jwt.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected user token");
            match e {
                JwtError::TokenExpired => ApiError::Unauthorized("Token expired".to_string()),
                _ => ApiError::Unauthorized("Invalid or expired token".to_string()),
            }
        })?;

        Ok(UserAuth {
            username: claims.sub,
            jti: claims.jti,
        })
    }
}
