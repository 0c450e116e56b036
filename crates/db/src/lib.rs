//! Persistence layer for the stockroom inventory service.
//!
//! - [`models`] -- row structs and request DTOs.
//! - [`repositories`] -- SQL repositories over `&PgPool`.
//! - [`repository`] -- the [`InventoryRepository`] seam and its Postgres implementation.
//! - [`memory`] -- an in-memory [`InventoryRepository`] with the same constraints.
//! - [`store`] -- [`InventoryStore`], stock mutations and invariant enforcement.
//! - [`alerts`] -- [`AlertEvaluator`], on-demand low-stock classification.

pub mod alerts;
pub mod error;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod repository;
pub mod store;

use sqlx::postgres::PgPoolOptions;

pub use alerts::AlertEvaluator;
pub use error::StoreError;
pub use memory::InMemoryInventoryRepository;
pub use repository::{InventoryRepository, PgInventoryRepository};
pub use store::{InventoryStore, StoreConfig};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
