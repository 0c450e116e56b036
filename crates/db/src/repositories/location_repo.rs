//! Repository for the `locations` table.

use sqlx::PgPool;

use crate::models::location::{CreateLocation, Location};

/// Column list for `locations` queries.
const COLUMNS: &str = "id, code, name, is_active, created_at, updated_at";

/// Provides query operations for stock locations.
pub struct LocationRepo;

impl LocationRepo {
    /// Register a location, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateLocation) -> Result<Location, sqlx::Error> {
        let query = format!(
            "INSERT INTO locations (code, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Whether an active location with the given code exists.
    pub async fn exists(pool: &PgPool, code: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM locations WHERE code = $1 AND is_active = TRUE)",
        )
        .bind(code)
        .fetch_one(pool)
        .await
    }
}
