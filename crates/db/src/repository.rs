//! The inventory persistence seam.
//!
//! [`InventoryStore`](crate::store::InventoryStore) and
//! [`AlertEvaluator`](crate::alerts::AlertEvaluator) only talk to storage
//! through [`InventoryRepository`], so the same logic runs against Postgres in
//! production and against [`InMemoryInventoryRepository`](crate::memory::InMemoryInventoryRepository)
//! in tests.

use async_trait::async_trait;
use sqlx::PgPool;
use stockroom_core::types::DbId;

use crate::error::StoreError;
use crate::models::inventory::{
    InventoryFilter, InventoryItem, NewInventoryItem, UpdateInventoryItem,
};
use crate::repositories::{InventoryRepo, LocationRepo};

/// Storage operations backing the inventory store.
///
/// Implementations must enforce the table constraints: unique
/// `(sku, location)` (reported as `CoreError::Conflict`), non-negative stock
/// and threshold, and `is_low_stock == (stock <= threshold)` after every
/// write.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn find_by_id(&self, id: DbId) -> Result<Option<InventoryItem>, StoreError>;

    async fn find_by_sku(
        &self,
        sku: &str,
        location: Option<&str>,
    ) -> Result<Vec<InventoryItem>, StoreError>;

    async fn insert(&self, item: &NewInventoryItem) -> Result<InventoryItem, StoreError>;

    /// Apply a patch atomically. `None` when `id` does not exist.
    async fn update(
        &self,
        id: DbId,
        patch: &UpdateInventoryItem,
    ) -> Result<Option<InventoryItem>, StoreError>;

    async fn list_active(&self, filter: &InventoryFilter) -> Result<Vec<InventoryItem>, StoreError>;

    async fn location_exists(&self, code: &str) -> Result<bool, StoreError>;

    /// Storage reachability check for the health endpoint.
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// [`InventoryRepository`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgInventoryRepository {
    pool: PgPool,
}

impl PgInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryRepository for PgInventoryRepository {
    async fn find_by_id(&self, id: DbId) -> Result<Option<InventoryItem>, StoreError> {
        Ok(InventoryRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_sku(
        &self,
        sku: &str,
        location: Option<&str>,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        Ok(InventoryRepo::find_by_sku(&self.pool, sku, location).await?)
    }

    async fn insert(&self, item: &NewInventoryItem) -> Result<InventoryItem, StoreError> {
        Ok(InventoryRepo::create(&self.pool, item).await?)
    }

    async fn update(
        &self,
        id: DbId,
        patch: &UpdateInventoryItem,
    ) -> Result<Option<InventoryItem>, StoreError> {
        Ok(InventoryRepo::update(&self.pool, id, patch).await?)
    }

    async fn list_active(&self, filter: &InventoryFilter) -> Result<Vec<InventoryItem>, StoreError> {
        Ok(InventoryRepo::list_active(&self.pool, filter).await?)
    }

    async fn location_exists(&self, code: &str) -> Result<bool, StoreError> {
        Ok(LocationRepo::exists(&self.pool, code).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
