//! Notification delivery for newly observed transactions
//!
//! One notification per event, posted to a webhook as a rich embed.

pub mod discord;
pub mod retry;

pub use discord::{build_payload, EmbedStyle, WebhookDispatcher};
pub use retry::RetryPolicy;

use crate::error::AppResult;
use crate::models::{TransactionEvent, WatchedAddress};

/// Notification service trait
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `event` for `address` to `webhook_url`
    ///
    /// Returns only once the endpoint has accepted the notification, or with
    /// an error if delivery was abandoned.
    async fn send(
        &self,
        event: &TransactionEvent,
        address: &WatchedAddress,
        webhook_url: &str,
    ) -> AppResult<()>;
}
