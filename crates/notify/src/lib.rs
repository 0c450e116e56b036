//! Low-stock notification dispatch.
//!
//! - [`LowStockNotifier`] -- groups classified alerts by location and hands
//!   each location digest to every applicable channel.
//! - [`AlertChannel`] -- the delivery seam.
//! - [`delivery`] -- concrete channels (log, webhook, email).

pub mod channel;
pub mod delivery;
pub mod notifier;

pub use channel::{AlertChannel, DeliveryError, LocationDigest, NotificationOptions};
pub use delivery::email::{EmailChannel, EmailConfig, EmailDelivery};
pub use delivery::log::LogChannel;
pub use delivery::webhook::{WebhookChannel, WebhookDelivery, DEFAULT_DELIVERY_DEADLINE};
pub use notifier::LowStockNotifier;
