//! Alert channel seam and the per-location digest it delivers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stockroom_core::stock_alert::{LocationCounts, StockAlert, StockLevel};
use stockroom_core::types::Timestamp;

use crate::delivery::email::EmailError;
use crate::delivery::webhook::WebhookError;

/// Where a dispatch should go. Channels without a destination are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub email_recipients: Vec<String>,
}

/// All alerts for a single location, the unit every channel delivers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDigest {
    pub location: String,
    pub counts: LocationCounts,
    pub alerts: Vec<StockAlert>,
    pub generated_at: Timestamp,
}

impl LocationDigest {
    pub fn new(location: String, alerts: Vec<StockAlert>, generated_at: Timestamp) -> Self {
        let mut counts = LocationCounts::default();
        for alert in &alerts {
            match alert.level {
                StockLevel::OutOfStock => counts.out_of_stock_count += 1,
                StockLevel::CriticalLow => counts.critical_count += 1,
                StockLevel::Low => counts.low_stock_count += 1,
                StockLevel::Healthy => {}
            }
        }
        Self {
            location,
            counts,
            alerts,
            generated_at,
        }
    }
}

/// Error type for a failed channel delivery.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error("Delivery failed: {0}")]
    Other(String),
}

/// A destination for low-stock digests.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether `options` give this channel somewhere to deliver to.
    fn applies(&self, _options: &NotificationOptions) -> bool {
        true
    }

    async fn deliver(
        &self,
        digest: &LocationDigest,
        options: &NotificationOptions,
    ) -> Result<(), DeliveryError>;
}
