//! Watched address and per-monitor configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A chain address under observation, with its display label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchedAddress {
    /// Base58 account address
    pub id: String,
    /// Label used in notifications and logs
    pub name: String,
}

impl WatchedAddress {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Immutable settings for one address monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub address: WatchedAddress,
    /// Sleep between poll cycles
    pub poll_interval: Duration,
    /// Webhook that receives this address's notifications
    pub webhook_url: String,
}

impl MonitorConfig {
    pub fn new(address: WatchedAddress, poll_interval: Duration, webhook_url: impl Into<String>) -> Self {
        Self {
            address,
            poll_interval,
            webhook_url: webhook_url.into(),
        }
    }
}
