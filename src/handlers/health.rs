//! Health check endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::monitoring::{MonitorSnapshot, StatusBoard};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall system status
    pub status: HealthStatus,
    /// Uptime in seconds
    pub uptime_seconds: i64,
    /// One entry per address monitor
    pub monitors: Vec<MonitorSnapshot>,
}

/// Health status enum
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every monitor polling, last cycle succeeded
    Healthy,
    /// At least one monitor starting, stopped or failing to poll
    Degraded,
}

/// Shared state for health checks
pub struct AppState {
    /// Application start time
    pub started_at: chrono::DateTime<Utc>,
    /// Monitor status cells
    pub board: StatusBoard,
}

/// Health check handler
///
/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let uptime = (Utc::now() - state.started_at).num_seconds();

    let status = if state.board.all_healthy() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    // Degraded still answers 200: a failing poll is retried, not fatal
    (
        StatusCode::OK,
        Json(HealthResponse {
            status,
            uptime_seconds: uptime,
            monitors: state.board.snapshots(),
        }),
    )
}

/// Create health router
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}
