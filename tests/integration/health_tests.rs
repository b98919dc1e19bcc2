//! Health and metrics endpoints

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use mintwatch::handlers::{health_router, AppState};
use mintwatch::metrics::{metrics_router, MetricsState};
use mintwatch::monitoring::{MonitorState, MonitorStatus, StatusBoard};
use mintwatch::WatchedAddress;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app(board: StatusBoard, metrics: Arc<MetricsState>) -> Router {
    let state = Arc::new(AppState {
        started_at: Utc::now(),
        board,
    });
    Router::new()
        .merge(health_router().with_state(state))
        .merge(metrics_router().with_state(metrics))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn polling(id: &str, name: &str) -> Arc<MonitorStatus> {
    let status = Arc::new(MonitorStatus::new(&WatchedAddress::new(id, name)));
    status.set_state(MonitorState::Polling);
    status.record_poll(3);
    status
}

#[tokio::test]
async fn test_health_reports_each_monitor() {
    let board = StatusBoard::new(vec![polling("Addr1", "Vault"), polling("Addr2", "Treasury")]);

    let (status, body) = get(app(board, Arc::new(MetricsState::new())), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    let monitors = json["monitors"].as_array().unwrap();
    assert_eq!(monitors.len(), 2);
    assert_eq!(monitors[0]["name"], "Vault");
    assert_eq!(monitors[0]["known_signatures"], 3);
}

#[tokio::test]
async fn test_health_degraded_after_poll_error() {
    let failing = polling("Addr1", "Vault");
    failing.record_error("HTTP 502");
    let board = StatusBoard::new(vec![failing, polling("Addr2", "Treasury")]);

    let (status, body) = get(app(board, Arc::new(MetricsState::new())), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["monitors"][0]["last_error"], "HTTP 502");
}

#[tokio::test]
async fn test_metrics_exposes_counters() {
    let metrics = Arc::new(MetricsState::new());
    metrics.polls.with_label_values(&["Vault"]).inc();
    metrics
        .events_dropped
        .with_label_values(&["Vault", "not_found"])
        .inc();

    let (status, body) = get(app(StatusBoard::default(), metrics), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("mintwatch_polls_total{address=\"Vault\"} 1"));
    assert!(text.contains("mintwatch_events_dropped_total"));
    assert!(text.contains("reason=\"not_found\""));
}
