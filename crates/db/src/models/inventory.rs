//! Inventory entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::stock_alert::{percent_of_threshold, StockAlert, StockLevels};
use stockroom_core::types::{DbId, Timestamp};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Inventory rows
// ---------------------------------------------------------------------------

/// A row from the `inventory` table: stock of one product or variant at one
/// location.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: DbId,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub sku: String,
    pub stock: i32,
    pub location: String,
    pub threshold: i32,
    /// Always equal to `stock <= threshold`.
    pub is_low_stock: bool,
    pub is_active: bool,
    pub metadata: serde_json::Value,
    pub last_restocked_at: Option<Timestamp>,
    pub last_counted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StockLevels for InventoryItem {
    fn product_id(&self) -> Uuid {
        self.product_id
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn stock(&self) -> i32 {
        self.stock
    }

    fn threshold(&self) -> i32 {
        self.threshold
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn last_restocked_at(&self) -> Option<Timestamp> {
        self.last_restocked_at
    }
}

impl From<&InventoryItem> for StockAlert {
    fn from(item: &InventoryItem) -> Self {
        StockAlert {
            inventory_id: item.id,
            product_id: item.product_id,
            variant_id: item.variant_id,
            sku: item.sku.clone(),
            location: item.location.clone(),
            stock: item.stock,
            threshold: item.threshold,
            level: item.level(),
            is_active: item.is_active,
            percent_of_threshold: percent_of_threshold(item.stock, item.threshold),
            last_restocked_at: item.last_restocked_at,
            last_counted_at: item.last_counted_at,
        }
    }
}

/// DTO for creating an inventory record.
///
/// `sku` is generated from the product and variant ids when omitted and
/// `threshold` falls back to the store's configured default.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryItem {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub sku: Option<String>,
    pub stock: i32,
    pub location: String,
    pub threshold: Option<i32>,
    pub metadata: Option<serde_json::Value>,
}

/// A fully resolved row ready for insertion.
#[derive(Debug, Clone)]
pub struct NewInventoryItem {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub sku: String,
    pub stock: i32,
    pub location: String,
    pub threshold: i32,
    pub is_low_stock: bool,
    pub metadata: serde_json::Value,
}

/// DTO for patching an inventory record. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryItem {
    pub stock: Option<i32>,
    pub threshold: Option<i32>,
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

/// Optional product and location narrowing for active-row scans.
#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
    pub product_ids: Vec<Uuid>,
    pub locations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Bulk sync
// ---------------------------------------------------------------------------

/// One entry of a bulk sync request. Same shape as a single create.
pub type BulkSyncItem = CreateInventoryItem;

fn default_true() -> bool {
    true
}

/// What bulk sync may do with each item.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSyncOptions {
    #[serde(default = "default_true")]
    pub create_missing: bool,
    #[serde(default = "default_true")]
    pub update_existing: bool,
}

impl Default for BulkSyncOptions {
    fn default() -> Self {
        Self {
            create_missing: true,
            update_existing: true,
        }
    }
}

/// A single failed bulk sync entry, reported at its input index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSyncError {
    pub index: usize,
    pub sku: Option<String>,
    pub location: String,
    pub error: String,
}

/// Result of processing one bulk sync entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
    Skipped,
}

/// Aggregate result of a bulk sync. Partial application is expected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSyncReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<BulkSyncError>,
}

impl BulkSyncReport {
    /// Count a successfully processed entry.
    pub fn record(mut self, outcome: SyncOutcome) -> Self {
        match outcome {
            SyncOutcome::Created => self.created += 1,
            SyncOutcome::Updated => self.updated += 1,
            SyncOutcome::Skipped => self.skipped += 1,
        }
        self
    }

    /// Count a failed entry and keep its error in input order.
    pub fn record_failure(mut self, error: BulkSyncError) -> Self {
        self.failed += 1;
        self.errors.push(error);
        self
    }
}
