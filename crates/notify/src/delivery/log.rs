//! Structured-log channel. Always applicable, never fails.

use async_trait::async_trait;

use crate::channel::{AlertChannel, DeliveryError, LocationDigest, NotificationOptions};

/// Emits one `warn` event per location digest.
#[derive(Debug, Default)]
pub struct LogChannel;

#[async_trait]
impl AlertChannel for LogChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(
        &self,
        digest: &LocationDigest,
        _options: &NotificationOptions,
    ) -> Result<(), DeliveryError> {
        tracing::warn!(
            location = %digest.location,
            low = digest.counts.low_stock_count,
            critical = digest.counts.critical_count,
            out_of_stock = digest.counts.out_of_stock_count,
            "Low stock alert"
        );
        Ok(())
    }
}
