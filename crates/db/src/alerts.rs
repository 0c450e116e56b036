//! Alert evaluator: on-demand stock health classification.
//!
//! Holds no alert state. Every call reads the current active rows through the
//! repository and classifies them with `stockroom_core::stock_alert`.

use std::sync::Arc;

use chrono::Utc;
use stockroom_core::error::CoreError;
use stockroom_core::stock_alert::{
    not_restocked_since, restock_cutoff, select_for_restock, RestockFilter, StockLevel,
    ThresholdBreaches,
};
use stockroom_core::types::Timestamp;

use crate::error::StoreError;
use crate::models::inventory::{InventoryFilter, InventoryItem};
use crate::repository::InventoryRepository;

/// Classifies the current inventory into low, critical and out-of-stock
/// buckets.
pub struct AlertEvaluator {
    repo: Arc<dyn InventoryRepository>,
}

impl AlertEvaluator {
    pub fn new(repo: Arc<dyn InventoryRepository>) -> Self {
        Self { repo }
    }

    /// Full classification sweep over all active records.
    pub async fn check_threshold_breaches(
        &self,
    ) -> Result<ThresholdBreaches<InventoryItem>, StoreError> {
        let items = self.repo.list_active(&InventoryFilter::default()).await?;
        let breaches = ThresholdBreaches::partition(items);
        tracing::debug!(
            low = breaches.low_stock.len(),
            critical = breaches.critical_low_stock.len(),
            out_of_stock = breaches.out_of_stock.len(),
            "Threshold breaches evaluated"
        );
        Ok(breaches)
    }

    pub async fn get_low_stock_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        self.bucket(StockLevel::Low).await
    }

    pub async fn get_critical_low_stock_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        self.bucket(StockLevel::CriticalLow).await
    }

    pub async fn get_out_of_stock_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        self.bucket(StockLevel::OutOfStock).await
    }

    /// Active records not restocked within the last `days` days, including
    /// records that were never restocked.
    pub async fn get_items_not_restocked_in_days(
        &self,
        days: i64,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        if days < 0 {
            return Err(CoreError::Validation(format!(
                "days must not be negative, got {days}"
            ))
            .into());
        }
        let cutoff = restock_cutoff(Utc::now(), days).ok_or_else(|| {
            CoreError::Validation(format!("days is out of range, got {days}"))
        })?;
        self.get_items_not_restocked_since(cutoff).await
    }

    pub async fn get_items_not_restocked_since(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        let items = self.repo.list_active(&InventoryFilter::default()).await?;
        Ok(not_restocked_since(items, cutoff))
    }

    /// Active records that need restocking, most depleted first.
    pub async fn get_items_needing_restock(
        &self,
        filter: &RestockFilter,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        let scope = InventoryFilter {
            product_ids: filter.product_ids.clone(),
            locations: filter.locations.clone(),
        };
        let items = self.repo.list_active(&scope).await?;
        Ok(select_for_restock(items, filter))
    }

    async fn bucket(&self, level: StockLevel) -> Result<Vec<InventoryItem>, StoreError> {
        Ok(self.check_threshold_breaches().await?.into_bucket(level))
    }
}
