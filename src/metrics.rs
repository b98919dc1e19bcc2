//! Prometheus metrics for mintwatch
//!
//! Exposes metrics endpoint for monitoring:
//! - Poll cycles and poll failures per address
//! - Newly observed signatures per address
//! - Dropped events by reason
//! - Delivered notifications and webhook attempts

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics state
pub struct MetricsState {
    /// Prometheus registry
    registry: Registry,
    /// Completed poll cycles
    pub polls: IntCounterVec,
    /// Poll cycles that failed to list signatures
    pub poll_failures: IntCounterVec,
    /// Signatures not present in the previous snapshot
    pub new_signatures: IntCounterVec,
    /// Events dropped before notification, by reason
    pub events_dropped: IntCounterVec,
    /// Notifications accepted by the webhook
    pub notifications_sent: IntCounterVec,
    /// Webhook POST attempts, including retries
    pub webhook_attempts: IntCounterVec,
}

fn counter_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    let counter = IntCounterVec::new(Opts::new(name, help), labels)
        .unwrap_or_else(|e| panic!("Failed to create {} counter: {}", name, e));
    registry
        .register(Box::new(counter.clone()))
        .unwrap_or_else(|e| panic!("Failed to register {}: {}", name, e));
    counter
}

impl MetricsState {
    /// Create a new metrics state with all metrics registered
    pub fn new() -> Self {
        let registry = Registry::new();

        let polls = counter_vec(
            &registry,
            "mintwatch_polls_total",
            "Total number of signature poll cycles",
            &["address"],
        );
        let poll_failures = counter_vec(
            &registry,
            "mintwatch_poll_failures_total",
            "Total number of failed signature polls",
            &["address"],
        );
        let new_signatures = counter_vec(
            &registry,
            "mintwatch_new_signatures_total",
            "Total number of newly observed signatures",
            &["address"],
        );
        let events_dropped = counter_vec(
            &registry,
            "mintwatch_events_dropped_total",
            "Total number of events dropped without notification",
            &["address", "reason"],
        );
        let notifications_sent = counter_vec(
            &registry,
            "mintwatch_notifications_sent_total",
            "Total number of notifications accepted by the webhook",
            &["address"],
        );
        let webhook_attempts = counter_vec(
            &registry,
            "mintwatch_webhook_attempts_total",
            "Total number of webhook POST attempts",
            &["address"],
        );

        Self {
            registry,
            polls,
            poll_failures,
            new_signatures,
            events_dropped,
            notifications_sent,
            webhook_attempts,
        }
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics handler - returns Prometheus metrics in text format
///
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.registry().gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("Content-Type", "text/plain; version=0.0.4")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        buffer,
    )
}

/// Create metrics router
pub fn metrics_router() -> Router<Arc<MetricsState>> {
    Router::new().route("/metrics", get(metrics_handler))
}
