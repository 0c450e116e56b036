use stockroom_core::error::CoreError;

/// PostgreSQL `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL `check_violation`.
const PG_CHECK_VIOLATION: &str = "23514";

/// Error returned by the inventory store, repositories and alert evaluator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level error (validation, conflict, not found).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An unexpected database error.
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    /// Constraint violations become domain errors; everything else stays a
    /// database error.
    ///
    /// - Unique violations on a `uq_` constraint map to `Conflict`.
    /// - Check violations map to `Validation`.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) if constraint.starts_with("uq_") => {
                    return StoreError::Core(CoreError::Conflict(format!(
                        "Duplicate value violates unique constraint: {constraint}"
                    )));
                }
                Some(PG_CHECK_VIOLATION) => {
                    return StoreError::Core(CoreError::Validation(format!(
                        "Value violates check constraint: {constraint}"
                    )));
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}
