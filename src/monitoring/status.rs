//! Per-monitor status reporting
//!
//! Each monitor owns and writes exactly one `MonitorStatus`; the health
//! endpoint only reads snapshots.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::models::WatchedAddress;

/// Lifecycle state of an address monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    /// Waiting for the initial baseline poll to succeed
    Starting,
    /// Baseline established, polling on its interval
    Polling,
    /// Cancelled
    Stopped,
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorState::Starting => write!(f, "starting"),
            MonitorState::Polling => write!(f, "polling"),
            MonitorState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Point-in-time view of one monitor
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub name: String,
    pub address: String,
    pub state: MonitorState,
    pub known_signatures: usize,
    pub last_poll_at: Option<DateTime<Utc>>,
    /// Error from the latest poll cycle, cleared by the next successful one
    pub last_error: Option<String>,
    pub notifications_sent: u64,
    pub events_dropped: u64,
}

pub struct MonitorStatus {
    inner: RwLock<MonitorSnapshot>,
}

impl MonitorStatus {
    pub fn new(address: &WatchedAddress) -> Self {
        Self {
            inner: RwLock::new(MonitorSnapshot {
                name: address.name.clone(),
                address: address.id.clone(),
                state: MonitorState::Starting,
                known_signatures: 0,
                last_poll_at: None,
                last_error: None,
                notifications_sent: 0,
                events_dropped: 0,
            }),
        }
    }

    pub fn set_state(&self, state: MonitorState) {
        self.inner.write().state = state;
    }

    pub fn state(&self) -> MonitorState {
        self.inner.read().state
    }

    /// Successful poll with the resulting snapshot size
    pub fn record_poll(&self, known_signatures: usize) {
        let mut inner = self.inner.write();
        inner.known_signatures = known_signatures;
        inner.last_poll_at = Some(Utc::now());
        inner.last_error = None;
    }

    pub fn record_error(&self, error: impl ToString) {
        self.inner.write().last_error = Some(error.to_string());
    }

    pub fn record_notification(&self) {
        self.inner.write().notifications_sent += 1;
    }

    pub fn record_drop(&self) {
        self.inner.write().events_dropped += 1;
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        self.inner.read().clone()
    }
}

/// Read-only collection of every monitor's status
#[derive(Default, Clone)]
pub struct StatusBoard {
    monitors: Vec<Arc<MonitorStatus>>,
}

impl StatusBoard {
    pub fn new(monitors: Vec<Arc<MonitorStatus>>) -> Self {
        Self { monitors }
    }

    pub fn snapshots(&self) -> Vec<MonitorSnapshot> {
        self.monitors.iter().map(|m| m.snapshot()).collect()
    }

    /// True when every monitor is polling and its last cycle succeeded
    pub fn all_healthy(&self) -> bool {
        self.snapshots()
            .iter()
            .all(|s| s.state == MonitorState::Polling && s.last_error.is_none())
    }
}
