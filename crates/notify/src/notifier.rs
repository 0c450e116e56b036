//! Location-grouped low-stock notification dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use stockroom_core::stock_alert::StockAlert;

use crate::channel::{AlertChannel, LocationDigest, NotificationOptions};
use crate::delivery::email::{EmailChannel, EmailConfig, EmailDelivery};
use crate::delivery::log::LogChannel;
use crate::delivery::webhook::{WebhookChannel, WebhookDelivery};

/// Fans classified alerts out to every configured channel, one digest per
/// location.
pub struct LowStockNotifier {
    channels: Vec<Arc<dyn AlertChannel>>,
}

impl LowStockNotifier {
    pub fn new(channels: Vec<Arc<dyn AlertChannel>>) -> Self {
        Self { channels }
    }

    /// Log channel plus webhook, plus email when SMTP is configured.
    ///
    /// `webhook_deadline` bounds each webhook delivery including retries. A
    /// webhook client that cannot be built is logged and left out.
    pub fn with_defaults(email: Option<EmailConfig>, webhook_deadline: Duration) -> Self {
        let mut channels: Vec<Arc<dyn AlertChannel>> = vec![Arc::new(LogChannel)];
        match WebhookDelivery::with_deadline(webhook_deadline) {
            Ok(delivery) => channels.push(Arc::new(WebhookChannel::new(delivery))),
            Err(e) => tracing::error!(error = %e, "Webhook channel disabled"),
        }
        if let Some(config) = email {
            channels.push(Arc::new(EmailChannel::new(EmailDelivery::new(config))));
        }
        Self::new(channels)
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Group `alerts` by location and deliver each group through every
    /// channel that applies to `options`.
    ///
    /// Deliveries run concurrently. An empty input dispatches nothing and
    /// reports success. Otherwise the result is `true` only when every
    /// delivery succeeded; a failed channel does not stop the others.
    pub async fn send_low_stock_notifications(
        &self,
        alerts: &[StockAlert],
        options: &NotificationOptions,
    ) -> bool {
        if alerts.is_empty() {
            return true;
        }

        let digests = group_into_digests(alerts);
        let channels: Vec<&Arc<dyn AlertChannel>> =
            self.channels.iter().filter(|c| c.applies(options)).collect();
        let channels = &channels;

        let deliveries = digests.iter().flat_map(move |digest| {
            channels.iter().map(move |channel| async move {
                let result = channel.deliver(digest, options).await;
                if let Err(e) = &result {
                    tracing::error!(
                        channel = channel.name(),
                        location = %digest.location,
                        error = %e,
                        "Low stock notification failed"
                    );
                }
                result.is_ok()
            })
        });
        let all_delivered = join_all(deliveries).await.into_iter().all(|ok| ok);

        tracing::info!(
            alerts = alerts.len(),
            locations = digests.len(),
            success = all_delivered,
            "Low stock notifications dispatched"
        );
        all_delivered
    }
}

/// One digest per distinct location, ordered by location code.
pub fn group_into_digests(alerts: &[StockAlert]) -> Vec<LocationDigest> {
    let mut groups: BTreeMap<&str, Vec<StockAlert>> = BTreeMap::new();
    for alert in alerts {
        groups
            .entry(alert.location.as_str())
            .or_default()
            .push(alert.clone());
    }
    let now = Utc::now();
    groups
        .into_iter()
        .map(|(location, alerts)| LocationDigest::new(location.to_string(), alerts, now))
        .collect()
}
