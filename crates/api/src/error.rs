use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stockroom_core::error::CoreError;
use stockroom_db::StoreError;

/// Message returned for every 500 so internals never leak to clients.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error type returned by every handler and extractor.
///
/// Renders as `{"error": <message>, "code": <CODE>}` with a matching status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database failure the persistence layer could not classify.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed query or body values caught in the HTTP layer.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => AppError::Core(core),
            StoreError::Database(db) => AppError::Database(db),
        }
    }
}

/// Status and stable error code for a domain error.
fn core_status(err: &CoreError) -> (StatusCode, &'static str) {
    match err {
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        CoreError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        CoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        CoreError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

/// Client-facing text of a domain error, without the `Display` prefix.
fn core_message(err: &CoreError) -> String {
    match err {
        CoreError::Validation(msg)
        | CoreError::Conflict(msg)
        | CoreError::Unauthorized(msg)
        | CoreError::Forbidden(msg) => msg.clone(),
        CoreError::NotFound { .. } => err.to_string(),
        CoreError::Internal(_) => INTERNAL_MESSAGE.to_string(),
    }
}

impl AppError {
    fn status_code_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => {
                let (status, code) = core_status(core);
                (status, code, core_message(core))
            }
            AppError::Database(sqlx::Error::RowNotFound) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            ),
            AppError::Database(_) | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.status_code_message();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed with internal error");
        }

        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}
