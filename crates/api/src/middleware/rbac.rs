//! Role- and permission-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects callers that lack the
//! required grant, so authorization is enforced at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use stockroom_core::error::CoreError;
use stockroom_core::roles::can_read_alerts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires any authenticated caller.
///
/// Equivalent to [`AuthUser`], named for routes where "authentication
/// required" should read explicitly.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}

/// Requires the `admin` role or an `inventory:admin` / `alerts:read`
/// permission. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn alert_feed(RequireAlertReader(user): RequireAlertReader) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAlertReader(pub AuthUser);

impl FromRequestParts<AppState> for RequireAlertReader {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_read_alerts(&user.role, &user.permissions) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role or inventory:admin / alerts:read permission required".into(),
            )));
        }
        Ok(RequireAlertReader(user))
    }
}
