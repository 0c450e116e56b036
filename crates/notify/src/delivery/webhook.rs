//! Webhook delivery with exponential-backoff retry.
//!
//! [`WebhookDelivery`] POSTs a JSON-encoded [`LocationDigest`] to an external
//! URL. A failed attempt is retried after 1 s, 2 s and 4 s, so a digest gets
//! at most four attempts. The whole exchange, retries included, is bounded by
//! a deadline so callers waiting on a response are never held past it.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::channel::{AlertChannel, DeliveryError, LocationDigest, NotificationOptions};

/// Pause before each retry.
const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on one digest's delivery, retries included.
pub const DEFAULT_DELIVERY_DEADLINE: Duration = Duration::from_secs(20);

/// Event type sent in every webhook payload.
const EVENT_TYPE: &str = "inventory.low_stock";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),

    /// Retries did not succeed within the delivery deadline.
    #[error("Webhook delivery gave up after {0:?}")]
    DeadlineExceeded(Duration),
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Delivers low-stock digests to external webhook endpoints.
pub struct WebhookDelivery {
    client: reqwest::Client,
    deadline: Duration,
}

impl WebhookDelivery {
    /// Delivery service bounded by [`DEFAULT_DELIVERY_DEADLINE`].
    pub fn new() -> Result<Self, WebhookError> {
        Self::with_deadline(DEFAULT_DELIVERY_DEADLINE)
    }

    pub fn with_deadline(deadline: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, deadline })
    }

    /// Deliver a digest to a webhook URL with retry.
    ///
    /// Returns `Ok(())` on the first successful attempt, otherwise the error
    /// of the last attempt made.
    pub async fn deliver(&self, url: &str, digest: &LocationDigest) -> Result<(), WebhookError> {
        let payload = webhook_payload(digest);
        let payload = &payload;

        let result = send_with_retry(self.deadline, &RETRY_DELAYS, || {
            self.try_send(url, payload)
        })
        .await;
        if let Err(e) = &result {
            tracing::error!(url, location = %digest.location, error = %e, "Webhook delivery failed");
        }
        result
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, url: &str, payload: &serde_json::Value) -> Result<(), WebhookError> {
        let response = self.client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Run `send` until it succeeds, sleeping `delays[n]` after the n-th failure.
///
/// There is no pause after the final attempt. The whole loop is cut off at
/// `deadline`.
async fn send_with_retry<F, Fut>(
    deadline: Duration,
    delays: &[Duration],
    mut send: F,
) -> Result<(), WebhookError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), WebhookError>>,
{
    let attempts = async {
        let mut attempt = 0;
        loop {
            match send().await {
                Ok(()) => return Ok(()),
                Err(e) => match delays.get(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt = attempt + 1,
                            error = %e,
                            "Webhook delivery attempt failed, retrying"
                        );
                        tokio::time::sleep(*delay).await;
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    };

    tokio::time::timeout(deadline, attempts)
        .await
        .unwrap_or_else(|_| Err(WebhookError::DeadlineExceeded(deadline)))
}

/// JSON body posted for a digest.
fn webhook_payload(digest: &LocationDigest) -> serde_json::Value {
    serde_json::json!({
        "eventType": EVENT_TYPE,
        "location": digest.location,
        "counts": digest.counts,
        "alerts": digest.alerts,
        "timestamp": digest.generated_at,
    })
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// [`AlertChannel`] posting to `options.webhook_url`.
pub struct WebhookChannel {
    delivery: WebhookDelivery,
}

impl WebhookChannel {
    pub fn new(delivery: WebhookDelivery) -> Self {
        Self { delivery }
    }
}

#[async_trait]
impl AlertChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn applies(&self, options: &NotificationOptions) -> bool {
        options.webhook_url.is_some()
    }

    async fn deliver(
        &self,
        digest: &LocationDigest,
        options: &NotificationOptions,
    ) -> Result<(), DeliveryError> {
        let Some(url) = options.webhook_url.as_deref() else {
            return Ok(());
        };
        self.delivery.deliver(url, digest).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
