//! In-memory [`InventoryRepository`].
//!
//! Mirrors the `inventory` table constraints so store and evaluator logic can
//! be exercised without a database. Rows live behind a `std::sync::Mutex`;
//! no lock is held across an `.await`.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use stockroom_core::error::CoreError;
use stockroom_core::inventory::is_low_stock;
use stockroom_core::types::DbId;

use crate::error::StoreError;
use crate::models::inventory::{
    InventoryFilter, InventoryItem, NewInventoryItem, UpdateInventoryItem,
};
use crate::repository::InventoryRepository;

#[derive(Default)]
struct Table {
    rows: Vec<InventoryItem>,
    next_id: DbId,
}

/// Process-local inventory table.
#[derive(Default)]
pub struct InMemoryInventoryRepository {
    table: Mutex<Table>,
    locations: Mutex<HashSet<String>>,
}

impl InMemoryInventoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a set of known location codes.
    pub fn with_locations<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let repo = Self::new();
        if let Ok(mut locations) = repo.locations.lock() {
            locations.extend(codes.into_iter().map(Into::into));
        }
        repo
    }

    /// Overwrite a row as-is, bypassing the patch rules. Useful for seeding
    /// timestamps such as `last_restocked_at`.
    pub fn put(&self, item: InventoryItem) -> Result<(), StoreError> {
        let mut table = self.table()?;
        table.next_id = table.next_id.max(item.id);
        match table.rows.iter_mut().find(|r| r.id == item.id) {
            Some(row) => *row = item,
            None => table.rows.push(item),
        }
        Ok(())
    }

    fn table(&self) -> Result<MutexGuard<'_, Table>, StoreError> {
        self.table
            .lock()
            .map_err(|_| CoreError::Internal("inventory table lock poisoned".into()).into())
    }
}

fn check_constraints(stock: i32, threshold: i32) -> Result<(), StoreError> {
    if stock < 0 || threshold < 0 {
        return Err(CoreError::Validation(
            "Value violates check constraint: ck_inventory_non_negative".into(),
        )
        .into());
    }
    Ok(())
}

#[async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn find_by_id(&self, id: DbId) -> Result<Option<InventoryItem>, StoreError> {
        Ok(self.table()?.rows.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_sku(
        &self,
        sku: &str,
        location: Option<&str>,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        let mut found: Vec<InventoryItem> = self
            .table()?
            .rows
            .iter()
            .filter(|r| r.sku == sku && location.map_or(true, |l| r.location == l))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.location.cmp(&b.location));
        Ok(found)
    }

    async fn insert(&self, item: &NewInventoryItem) -> Result<InventoryItem, StoreError> {
        check_constraints(item.stock, item.threshold)?;
        let mut table = self.table()?;
        if table
            .rows
            .iter()
            .any(|r| r.sku == item.sku && r.location == item.location)
        {
            return Err(CoreError::Conflict(
                "Duplicate value violates unique constraint: uq_inventory_sku_location".into(),
            )
            .into());
        }

        table.next_id += 1;
        let now = Utc::now();
        let row = InventoryItem {
            id: table.next_id,
            product_id: item.product_id,
            variant_id: item.variant_id,
            sku: item.sku.clone(),
            stock: item.stock,
            location: item.location.clone(),
            threshold: item.threshold,
            is_low_stock: is_low_stock(item.stock, item.threshold),
            is_active: true,
            metadata: item.metadata.clone(),
            last_restocked_at: None,
            last_counted_at: None,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: DbId,
        patch: &UpdateInventoryItem,
    ) -> Result<Option<InventoryItem>, StoreError> {
        let mut table = self.table()?;
        let Some(row) = table.rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        let stock = patch.stock.unwrap_or(row.stock);
        let threshold = patch.threshold.unwrap_or(row.threshold);
        check_constraints(stock, threshold)?;

        let now = Utc::now();
        if let Some(new_stock) = patch.stock {
            if new_stock > row.stock {
                row.last_restocked_at = Some(now);
            }
            row.last_counted_at = Some(now);
        }
        row.stock = stock;
        row.threshold = threshold;
        row.is_low_stock = is_low_stock(stock, threshold);
        if let Some(active) = patch.is_active {
            row.is_active = active;
        }
        if let Some(metadata) = &patch.metadata {
            row.metadata = metadata.clone();
        }
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn list_active(&self, filter: &InventoryFilter) -> Result<Vec<InventoryItem>, StoreError> {
        let mut rows: Vec<InventoryItem> = self
            .table()?
            .rows
            .iter()
            .filter(|r| r.is_active)
            .filter(|r| filter.product_ids.is_empty() || filter.product_ids.contains(&r.product_id))
            .filter(|r| filter.locations.is_empty() || filter.locations.contains(&r.location))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn location_exists(&self, code: &str) -> Result<bool, StoreError> {
        let locations = self
            .locations
            .lock()
            .map_err(|_| CoreError::Internal("location set lock poisoned".into()))?;
        Ok(locations.contains(code))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.table().map(|_| ())
    }
}
