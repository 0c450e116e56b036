//! Low-stock digest emails via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport and sends one
//! plain-text email per location digest. If `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and no email channel is built.

use std::fmt::Write as _;

use async_trait::async_trait;

use crate::channel::{AlertChannel, DeliveryError, LocationDigest, NotificationOptions};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "stockroom@localhost";

/// SMTP settings for the email channel.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable        | Required | Default               |
    /// |-----------------|----------|-----------------------|
    /// | `SMTP_HOST`     | yes      |                       |
    /// | `SMTP_PORT`     | no       | `587`                 |
    /// | `SMTP_FROM`     | no       | `stockroom@localhost` |
    /// | `SMTP_USER`     | no       |                       |
    /// | `SMTP_PASSWORD` | no       |                       |
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let smtp_host = lookup("SMTP_HOST").filter(|h| !h.is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: lookup("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: lookup("SMTP_FROM").unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: lookup("SMTP_USER"),
            smtp_password: lookup("SMTP_PASSWORD"),
        })
    }
}

// ---------------------------------------------------------------------------
// Message rendering
// ---------------------------------------------------------------------------

fn subject(digest: &LocationDigest) -> String {
    format!(
        "[Stockroom] {} stock alert(s) at {}",
        digest.alerts.len(),
        digest.location
    )
}

fn body(digest: &LocationDigest) -> String {
    let mut out = format!(
        "Location: {}\nGenerated: {}\nLow: {}  Critical: {}  Out of stock: {}\n\n",
        digest.location,
        digest.generated_at,
        digest.counts.low_stock_count,
        digest.counts.critical_count,
        digest.counts.out_of_stock_count,
    );
    for alert in &digest.alerts {
        let _ = writeln!(
            out,
            "{:<20} {:>6} / {:<6} {}",
            alert.sku,
            alert.stock,
            alert.threshold,
            alert.level.as_str()
        );
    }
    out
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends digest emails via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send one digest email to a single recipient.
    pub async fn deliver(&self, to_email: &str, digest: &LocationDigest) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject(digest))
            .header(ContentType::TEXT_PLAIN)
            .body(body(digest))
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, location = %digest.location, "Low stock email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// [`AlertChannel`] mailing every address in `options.email_recipients`.
pub struct EmailChannel {
    delivery: EmailDelivery,
}

impl EmailChannel {
    pub fn new(delivery: EmailDelivery) -> Self {
        Self { delivery }
    }
}

#[async_trait]
impl AlertChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn applies(&self, options: &NotificationOptions) -> bool {
        !options.email_recipients.is_empty()
    }

    async fn deliver(
        &self,
        digest: &LocationDigest,
        options: &NotificationOptions,
    ) -> Result<(), DeliveryError> {
        for recipient in &options.email_recipients {
            self.delivery.deliver(recipient, digest).await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockroom_core::stock_alert::{StockAlert, StockLevel};
    use uuid::Uuid;

    fn alert(sku: &str, stock: i32, threshold: i32) -> StockAlert {
        StockAlert {
            inventory_id: 1,
            product_id: Uuid::nil(),
            variant_id: None,
            sku: sku.to_string(),
            location: "WH-1".to_string(),
            stock,
            threshold,
            level: StockLevel::classify(stock, threshold),
            is_active: true,
            percent_of_threshold: 0.0,
            last_restocked_at: None,
            last_counted_at: None,
        }
    }

    #[test]
    fn from_lookup_returns_none_without_smtp_host() {
        assert!(EmailConfig::from_lookup(|_| None).is_none());
    }

    #[test]
    fn from_lookup_applies_defaults() {
        let config = EmailConfig::from_lookup(|key| match key {
            "SMTP_HOST" => Some("smtp.example.com".to_string()),
            "SMTP_PORT" => Some("not-a-port".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.smtp_host, "smtp.example.com");
        assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);
        assert_eq!(config.from_address, DEFAULT_FROM_ADDRESS);
        assert!(config.smtp_user.is_none());
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }

    #[test]
    fn email_error_display_address() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = EmailError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("Email address parse error"));
    }

    #[test]
    fn subject_names_location_and_count() {
        let digest = LocationDigest::new(
            "WH-1".into(),
            vec![alert("A", 0, 5), alert("B", 4, 5)],
            Utc::now(),
        );
        assert_eq!(subject(&digest), "[Stockroom] 2 stock alert(s) at WH-1");
    }

    #[test]
    fn body_lists_each_alert() {
        let digest = LocationDigest::new(
            "WH-1".into(),
            vec![alert("A", 0, 5), alert("B", 4, 5)],
            Utc::now(),
        );
        let text = body(&digest);
        assert!(text.contains("Low: 1  Critical: 0  Out of stock: 1"));
        assert!(text.contains("out-of-stock"));
        assert!(text.contains("low-stock"));
    }

    #[test]
    fn channel_applies_only_with_recipients() {
        let channel = EmailChannel::new(EmailDelivery::new(EmailConfig {
            smtp_host: "localhost".into(),
            smtp_port: DEFAULT_SMTP_PORT,
            from_address: DEFAULT_FROM_ADDRESS.into(),
            smtp_user: None,
            smtp_password: None,
        }));
        assert!(!channel.applies(&NotificationOptions::default()));
        assert!(channel.applies(&NotificationOptions {
            email_recipients: vec!["ops@example.com".into()],
            ..Default::default()
        }));
    }
}
