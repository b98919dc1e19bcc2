//! Supervisor for address monitors
//!
//! Starts one independent task per watched address, each with its own RPC,
//! metadata and webhook clients. Nothing mutable is shared between tasks.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::address_monitor::AddressMonitor;
use super::status::StatusBoard;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::metrics::MetricsState;
use crate::models::MonitorConfig;
use crate::notifications::WebhookDispatcher;
use crate::rpc::{ChainRpc, ExplorerRpcClient};
use crate::token::NftMetadataFetcher;

pub struct Supervisor {
    handles: Vec<JoinHandle<()>>,
    board: StatusBoard,
    cancel: CancellationToken,
}

impl Supervisor {
    /// Build and spawn a monitor for every configured address
    pub fn start(
        config: &AppConfig,
        metrics: Arc<MetricsState>,
        cancel: CancellationToken,
    ) -> AppResult<Self> {
        let monitors = config
            .monitor_configs()
            .into_iter()
            .map(|mc| build_monitor(config, mc, metrics.clone()))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self::spawn(monitors, cancel))
    }

    /// Spawn already-built monitors
    pub fn spawn(monitors: Vec<AddressMonitor>, cancel: CancellationToken) -> Self {
        let mut statuses = Vec::with_capacity(monitors.len());
        let mut handles = Vec::with_capacity(monitors.len());

        for monitor in monitors {
            statuses.push(monitor.status());
            handles.push(tokio::spawn(monitor.run(cancel.child_token())));
        }

        tracing::info!(monitors = handles.len(), "Address monitors started");

        Self {
            handles,
            board: StatusBoard::new(statuses),
            cancel,
        }
    }

    pub fn board(&self) -> StatusBoard {
        self.board.clone()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every monitor to finish (they only finish once cancelled)
    pub async fn wait(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Address monitor task panicked");
            }
        }
    }

    /// Cancel all monitors and wait for them to stop
    pub async fn shutdown(self) {
        tracing::info!("Stopping address monitors");
        self.cancel.cancel();
        self.wait().await;
    }
}

/// Assemble one monitor with its own clients
pub fn build_monitor(
    config: &AppConfig,
    monitor_config: MonitorConfig,
    metrics: Arc<MetricsState>,
) -> AppResult<AddressMonitor> {
    let timeout = Duration::from_millis(config.rpc.timeout_ms);

    let rpc: Arc<dyn ChainRpc> = Arc::new(
        ExplorerRpcClient::new(config.rpc.url.clone(), timeout)?
            .with_signature_limit(config.rpc.signature_limit),
    );
    let metadata = Arc::new(NftMetadataFetcher::new(rpc.clone(), timeout)?);
    let notifier = Arc::new(
        WebhookDispatcher::new(config.embed.to_style(), config.retry.to_policy(), timeout)?
            .with_metrics(metrics.clone()),
    );

    Ok(AddressMonitor::new(
        monitor_config,
        config.monitor_options(),
        rpc,
        metadata,
        notifier,
    )
    .with_metrics(metrics))
}
