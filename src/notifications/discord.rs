//! Discord-style webhook notifications
//!
//! Builds the rich-embed payload for a transaction event and delivers it,
//! retrying until the endpoint answers 204 (or the optional attempt cap is hit).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use super::retry::next_attempt;
use super::{Notifier, RetryPolicy};
use crate::constants::embed;
use crate::error::{AppError, AppResult};
use crate::metrics::MetricsState;
use crate::models::{TransactionEvent, WatchedAddress};

/// Presentation settings shared by every embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedStyle {
    pub username: String,
    pub avatar_url: String,
    pub footer_text: String,
    pub color: u32,
}

impl Default for EmbedStyle {
    fn default() -> Self {
        Self {
            username: embed::USERNAME.to_string(),
            avatar_url: embed::AVATAR_URL.to_string(),
            footer_text: embed::FOOTER_TEXT.to_string(),
            color: embed::COLOR,
        }
    }
}

fn field(name: &str, value: impl Into<String>) -> Value {
    json!({ "name": name, "value": value.into(), "inline": true })
}

/// Build the webhook payload for one event
pub fn build_payload(
    event: &TransactionEvent,
    address: &WatchedAddress,
    style: &EmbedStyle,
    timestamp: DateTime<Utc>,
) -> Value {
    let mut title = embed::DEFAULT_TITLE.to_string();
    let mut image = None;

    let mut fields = vec![field(
        "Mint Price",
        format!("{:.6}", event.balance_delta_sol.unwrap_or(0.0)),
    )];

    if !event.success {
        fields.push(field("Result of txn", "FAILED"));
    }

    if let Some(nft) = &event.nft {
        title = nft.name.clone();
        image = Some(json!({ "url": nft.image_url }));
        fields.push(field("Address Minted", address.name.as_str()));
        fields.push(field("Result of txn", "SUCCESS"));
        fields.push(field("Type of txn", "MINT"));
    }

    if let Some(destination) = event.transfer_destination.as_deref().filter(|d| !d.is_empty()) {
        fields.push(field("Source address", address.name.as_str()));
        fields.push(field("Result of txn", "SUCCESS"));
        fields.push(field("Destination address", destination));
        fields.push(field("Type of txn", "TRANSFER"));
    }

    let mut embed = json!({
        "title": title,
        "url": event.explorer_url,
        "color": style.color,
        "timestamp": timestamp.to_rfc3339(),
        "footer": {
            "text": style.footer_text,
            "icon_url": style.avatar_url,
        },
        "fields": fields,
    });

    if let (Some(image), Some(obj)) = (image, embed.as_object_mut()) {
        obj.insert("image".to_string(), image);
    }

    json!({
        "username": style.username,
        "avatar_url": style.avatar_url,
        "embeds": [embed],
    })
}

/// Webhook dispatcher with retry-until-accepted delivery
pub struct WebhookDispatcher {
    client: Client,
    style: EmbedStyle,
    retry: RetryPolicy,
    metrics: Option<Arc<MetricsState>>,
}

impl WebhookDispatcher {
    /// Create a new dispatcher
    pub fn new(style: EmbedStyle, retry: RetryPolicy, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            style,
            retry,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// POST `payload` until the endpoint answers 204; returns the number of attempts
    pub async fn deliver(&self, webhook_url: &str, payload: &Value, label: &str) -> AppResult<u32> {
        let mut attempts = 0u32;

        loop {
            attempts = next_attempt(attempts);
            if let Some(metrics) = &self.metrics {
                metrics.webhook_attempts.with_label_values(&[label]).inc();
            }

            let last_status = match self.client.post(webhook_url).json(payload).send().await {
                Ok(response) if response.status() == StatusCode::NO_CONTENT => {
                    return Ok(attempts);
                }
                Ok(response) => {
                    let status = response.status();
                    tracing::warn!(
                        address = label,
                        attempt = attempts,
                        status = status.as_u16(),
                        "Webhook did not accept notification, retrying"
                    );
                    Some(status.as_u16())
                }
                Err(e) => {
                    tracing::warn!(
                        address = label,
                        attempt = attempts,
                        error = %e,
                        "Webhook request failed, retrying"
                    );
                    None
                }
            };

            if !self.retry.allows_another(attempts) {
                tracing::error!(
                    address = label,
                    attempts,
                    status = ?last_status,
                    payload = %payload,
                    "Giving up on notification, dead-lettered"
                );
                return Err(AppError::WebhookRejected {
                    status: last_status,
                    attempts,
                });
            }

            let delay = self.retry.delay_for(attempts);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[async_trait]
impl Notifier for WebhookDispatcher {
    async fn send(
        &self,
        event: &TransactionEvent,
        address: &WatchedAddress,
        webhook_url: &str,
    ) -> AppResult<()> {
        let payload = build_payload(event, address, &self.style, Utc::now());
        let attempts = self.deliver(webhook_url, &payload, &address.name).await?;

        tracing::info!(
            address = %address.name,
            signature = %event.signature,
            kind = %event.kind,
            attempts,
            "Sent webhook notification"
        );

        Ok(())
    }
}
