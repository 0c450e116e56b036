//! Inventory store: stock mutations with invariant enforcement.
//!
//! Every write is validated here before it reaches the repository, and the
//! repository enforces the same constraints again at the storage layer.

use std::sync::Arc;

use stockroom_core::error::CoreError;
use stockroom_core::inventory::{
    is_low_stock, validate_location, validate_metadata, validate_sku, validate_stock,
    validate_threshold, DEFAULT_THRESHOLD,
};
use stockroom_core::sku;
use stockroom_core::types::DbId;

use crate::error::StoreError;
use crate::models::inventory::{
    BulkSyncError, BulkSyncItem, BulkSyncOptions, BulkSyncReport, CreateInventoryItem,
    InventoryItem, NewInventoryItem, SyncOutcome, UpdateInventoryItem,
};
use crate::repository::InventoryRepository;

/// Store behaviour that varies per deployment.
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Reject creates whose location is not a registered, active location.
    pub validate_locations: bool,
    /// Threshold used when a create omits one.
    pub default_threshold: i32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            validate_locations: false,
            default_threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Source of truth for stock levels.
pub struct InventoryStore {
    repo: Arc<dyn InventoryRepository>,
    config: StoreConfig,
}

impl InventoryStore {
    pub fn new(repo: Arc<dyn InventoryRepository>, config: StoreConfig) -> Self {
        Self { repo, config }
    }

    /// All records for a SKU, optionally narrowed to one location. An empty
    /// result is not an error.
    pub async fn get_by_sku(
        &self,
        sku: &str,
        location: Option<&str>,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        self.repo.find_by_sku(sku, location).await
    }

    pub async fn get_by_id(&self, id: DbId) -> Result<InventoryItem, StoreError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Inventory", id).into())
    }

    /// Create a record.
    ///
    /// Generates the SKU when omitted and applies the default threshold.
    /// Fails with `Conflict` on a duplicate `(sku, location)` and with
    /// `NotFound` for an unknown location when location validation is on.
    pub async fn create(&self, input: &CreateInventoryItem) -> Result<InventoryItem, StoreError> {
        let threshold = input.threshold.unwrap_or(self.config.default_threshold);
        validate_stock(input.stock)?;
        validate_threshold(threshold)?;
        validate_location(&input.location)?;
        if let Some(metadata) = &input.metadata {
            validate_metadata(metadata)?;
        }
        let sku = resolve_sku(input)?;

        if self.config.validate_locations && !self.repo.location_exists(&input.location).await? {
            return Err(CoreError::not_found("Location", &input.location).into());
        }

        if !self
            .repo
            .find_by_sku(&sku, Some(&input.location))
            .await?
            .is_empty()
        {
            return Err(CoreError::Conflict(format!(
                "Inventory for sku '{sku}' already exists at location '{}'",
                input.location
            ))
            .into());
        }

        let row = NewInventoryItem {
            product_id: input.product_id,
            variant_id: input.variant_id,
            sku,
            stock: input.stock,
            location: input.location.clone(),
            threshold,
            is_low_stock: is_low_stock(input.stock, threshold),
            metadata: input
                .metadata
                .clone()
                .unwrap_or_else(|| serde_json::json!({})),
        };
        let item = self.repo.insert(&row).await?;

        tracing::info!(
            id = item.id,
            sku = %item.sku,
            location = %item.location,
            stock = item.stock,
            threshold = item.threshold,
            "Inventory record created"
        );
        Ok(item)
    }

    /// Apply the supplied fields of `patch` to record `id`.
    ///
    /// `is_low_stock` is recomputed whenever stock or threshold changes.
    pub async fn update(
        &self,
        id: DbId,
        patch: &UpdateInventoryItem,
    ) -> Result<InventoryItem, StoreError> {
        validate_patch(patch)?;
        let item = self
            .repo
            .update(id, patch)
            .await?
            .ok_or_else(|| StoreError::from(CoreError::not_found("Inventory", id)))?;

        tracing::debug!(
            id,
            sku = %item.sku,
            stock = item.stock,
            threshold = item.threshold,
            is_low_stock = item.is_low_stock,
            "Inventory record updated"
        );
        Ok(item)
    }

    /// Apply `patch` to every record for `sku`, optionally narrowed to one
    /// location. Fails with `NotFound` when nothing matches.
    pub async fn update_by_sku(
        &self,
        sku: &str,
        location: Option<&str>,
        patch: &UpdateInventoryItem,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        validate_patch(patch)?;
        let matches = self.repo.find_by_sku(sku, location).await?;
        if matches.is_empty() {
            return Err(CoreError::not_found("Inventory", sku).into());
        }

        let mut updated = Vec::with_capacity(matches.len());
        for item in matches {
            updated.push(self.update(item.id, patch).await?);
        }
        Ok(updated)
    }

    /// Create or update a batch of records.
    ///
    /// Items are processed sequentially and independently: a failing item is
    /// reported with its input index and the batch carries on. The batch is
    /// not transactional, so partial application is the normal outcome.
    pub async fn bulk_sync(
        &self,
        items: &[BulkSyncItem],
        options: BulkSyncOptions,
    ) -> BulkSyncReport {
        let mut report = BulkSyncReport::default();
        for (index, item) in items.iter().enumerate() {
            let resolved = resolve_sku(item);
            let sku = resolved.as_ref().ok().cloned().or_else(|| item.sku.clone());
            let result = match resolved {
                Ok(sku) => self.sync_one(item, &sku, options).await,
                Err(err) => Err(err.into()),
            };
            report = match result {
                Ok(outcome) => report.record(outcome),
                Err(err) => {
                    tracing::warn!(
                        index,
                        sku = ?sku,
                        location = %item.location,
                        error = %err,
                        "Bulk sync item failed"
                    );
                    report.record_failure(BulkSyncError {
                        index,
                        sku,
                        location: item.location.clone(),
                        error: err.to_string(),
                    })
                }
            };
        }

        tracing::info!(
            total = items.len(),
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            "Bulk sync finished"
        );
        report
    }

    async fn sync_one(
        &self,
        item: &BulkSyncItem,
        sku: &str,
        options: BulkSyncOptions,
    ) -> Result<SyncOutcome, StoreError> {
        let existing = self.repo.find_by_sku(sku, Some(&item.location)).await?;
        match existing.first() {
            Some(record) if options.update_existing => {
                let patch = UpdateInventoryItem {
                    stock: Some(item.stock),
                    threshold: item.threshold,
                    is_active: None,
                    metadata: item.metadata.clone(),
                };
                self.update(record.id, &patch).await?;
                Ok(SyncOutcome::Updated)
            }
            None if options.create_missing => {
                let create = CreateInventoryItem {
                    sku: Some(sku.to_string()),
                    ..item.clone()
                };
                self.create(&create).await?;
                Ok(SyncOutcome::Created)
            }
            _ => Ok(SyncOutcome::Skipped),
        }
    }
}

/// The caller's SKU, length-checked, or one generated from the ids.
fn resolve_sku(input: &CreateInventoryItem) -> Result<String, CoreError> {
    match &input.sku {
        Some(sku) => {
            validate_sku(sku)?;
            Ok(sku.clone())
        }
        None => Ok(sku::generate(&input.product_id, input.variant_id.as_ref())),
    }
}

fn validate_patch(patch: &UpdateInventoryItem) -> Result<(), CoreError> {
    if let Some(stock) = patch.stock {
        validate_stock(stock)?;
    }
    if let Some(threshold) = patch.threshold {
        validate_threshold(threshold)?;
    }
    if let Some(metadata) = &patch.metadata {
        validate_metadata(metadata)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
