//! Bearer-token authentication for inventory and alert handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use stockroom_core::error::CoreError;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller decoded from `Authorization: Bearer <jwt>`.
///
/// Rejects with 401 when the header is absent, malformed, or carries a token
/// that fails signature or expiry checks.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Token subject.
    pub user_id: String,
    pub role: String,
    pub permissions: Vec<String>,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

/// Raw token from the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;
    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized("Expected Authorization: Bearer <token>"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            unauthorized("Invalid or expired token")
        })?;

        Ok(Self {
            user_id: claims.sub,
            role: claims.role,
            permissions: claims.permissions,
        })
    }
}
