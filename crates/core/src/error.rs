/// Domain error taxonomy shared by the store, the alert evaluator and the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] keyed by any displayable value.
    pub fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        CoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
