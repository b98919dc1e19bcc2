//! Per-address monitor
//!
//! State machine:
//! ```text
//! STARTING --(baseline poll ok)--> POLLING --(poll, diff, notify, sleep)--> POLLING
//!     |                               |
//!     +--------(cancelled)------------+--> STOPPED
//! ```
//!
//! The baseline poll only records what already exists; notifications start
//! with the first signature that was not in the previous snapshot.

use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::classifier::{self, Classification};
use super::known_set::KnownSignatureSet;
use super::status::{MonitorState, MonitorStatus};
use crate::constants::endpoints;
use crate::error::AppResult;
use crate::metrics::MetricsState;
use crate::models::{
    MonitorConfig, ParsedTransaction, SignatureRecord, TransactionEvent, TransactionKind,
};
use crate::notifications::Notifier;
use crate::rpc::ChainRpc;
use crate::token::MetadataResolver;

/// What to do with a mint whose NFT metadata cannot be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataFailurePolicy {
    /// Send the notification without enrichment
    #[default]
    Degrade,
    /// Drop the notification for that transaction
    Skip,
}

/// Behaviour switches shared by all monitors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorOptions {
    pub enrich_metadata: bool,
    pub on_metadata_failure: MetadataFailurePolicy,
    pub explorer_base_url: String,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            enrich_metadata: true,
            on_metadata_failure: MetadataFailurePolicy::Degrade,
            explorer_base_url: endpoints::EXPLORER_WEB.to_string(),
        }
    }
}

impl MonitorOptions {
    pub fn tx_url(&self, signature: &str) -> String {
        format!("{}/tx/{}", self.explorer_base_url.trim_end_matches('/'), signature)
    }

    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_base_url.trim_end_matches('/'), address)
    }
}

/// Polls one address and notifies for each new transaction
pub struct AddressMonitor {
    config: MonitorConfig,
    options: MonitorOptions,
    rpc: Arc<dyn ChainRpc>,
    metadata: Arc<dyn MetadataResolver>,
    notifier: Arc<dyn Notifier>,
    status: Arc<MonitorStatus>,
    metrics: Option<Arc<MetricsState>>,
}

impl AddressMonitor {
    pub fn new(
        config: MonitorConfig,
        options: MonitorOptions,
        rpc: Arc<dyn ChainRpc>,
        metadata: Arc<dyn MetadataResolver>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let status = Arc::new(MonitorStatus::new(&config.address));
        Self {
            config,
            options,
            rpc,
            metadata,
            notifier,
            status,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Status cell written by this monitor
    pub fn status(&self) -> Arc<MonitorStatus> {
        self.status.clone()
    }

    fn label(&self) -> &str {
        &self.config.address.name
    }

    /// Run until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            address = %self.config.address.id,
            name = %self.label(),
            interval_secs = self.config.poll_interval.as_secs_f64(),
            "Address monitor starting"
        );

        let Some(mut known) = self.establish_baseline(&cancel).await else {
            self.stop();
            return;
        };
        self.status.set_state(MonitorState::Polling);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.poll_cycle(&mut known) => {
                    if let Err(e) = result {
                        tracing::warn!(
                            address = %self.label(),
                            error = %e,
                            "Poll cycle failed, keeping previous snapshot"
                        );
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        self.stop();
    }

    fn stop(&self) {
        self.status.set_state(MonitorState::Stopped);
        tracing::info!(address = %self.label(), "Address monitor stopped");
    }

    /// Initial poll; retried every interval until it succeeds or `cancel` fires
    ///
    /// Signatures returned here are treated as already known and never notified.
    pub async fn establish_baseline(&self, cancel: &CancellationToken) -> Option<KnownSignatureSet> {
        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => return None,
                r = self.rpc.list_signatures(&self.config.address.id) => r,
            };

            match result {
                Ok(records) => {
                    let known = KnownSignatureSet::from_records(&records);
                    self.status.record_poll(known.len());
                    tracing::info!(
                        address = %self.label(),
                        known = known.len(),
                        "Baseline established"
                    );
                    return Some(known);
                }
                Err(e) => {
                    self.count_poll_failure();
                    self.status.record_error(&e);
                    tracing::warn!(
                        address = %self.label(),
                        error = %e,
                        "Baseline poll failed, retrying after interval"
                    );
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
    }

    /// One poll: list, diff, process each new signature, replace the snapshot
    ///
    /// On a failed listing the snapshot is left untouched. Returns the number
    /// of new signatures seen.
    pub async fn poll_cycle(&self, known: &mut KnownSignatureSet) -> AppResult<usize> {
        let fresh = match self.rpc.list_signatures(&self.config.address.id).await {
            Ok(fresh) => fresh,
            Err(e) => {
                self.count_poll_failure();
                self.status.record_error(&e);
                return Err(e);
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.polls.with_label_values(&[self.label()]).inc();
        }

        let new_records = known.new_records(&fresh);
        tracing::debug!(
            address = %self.label(),
            listed = fresh.len(),
            new = new_records.len(),
            "Polled signatures"
        );

        for record in &new_records {
            if let Some(metrics) = &self.metrics {
                metrics.new_signatures.with_label_values(&[self.label()]).inc();
            }
            self.handle_new_signature(record).await;
        }

        let new_count = new_records.len();
        known.replace(&fresh);
        self.status.record_poll(known.len());

        Ok(new_count)
    }

    /// Fetch, classify, enrich and notify for one new signature
    async fn handle_new_signature(&self, record: &SignatureRecord) {
        tracing::info!(
            address = %self.label(),
            signature = %record.signature,
            failed = record.is_failed(),
            "New transaction detected"
        );

        let tx = match self.rpc.get_transaction(&record.signature).await {
            Ok(tx) => tx,
            Err(e) => {
                tracing::warn!(
                    address = %self.label(),
                    signature = %record.signature,
                    error = %e,
                    "Could not fetch transaction, dropping event"
                );
                self.count_drop(e.kind());
                return;
            }
        };

        let Some(event) = self.build_event(record, &tx).await else {
            self.count_drop("metadata_unavailable");
            return;
        };

        match self
            .notifier
            .send(&event, &self.config.address, &self.config.webhook_url)
            .await
        {
            Ok(()) => {
                self.status.record_notification();
                if let Some(metrics) = &self.metrics {
                    metrics.notifications_sent.with_label_values(&[self.label()]).inc();
                }
            }
            Err(e) => {
                tracing::error!(
                    address = %self.label(),
                    signature = %event.signature,
                    error = %e,
                    "Notification abandoned"
                );
                self.count_drop(e.kind());
            }
        }
    }

    /// Derive the event for a fetched transaction
    ///
    /// Balance delta is always computed. Failed transactions skip mint/transfer
    /// detection. Returns `None` only when enrichment failed under
    /// `MetadataFailurePolicy::Skip`.
    pub async fn build_event(
        &self,
        record: &SignatureRecord,
        tx: &ParsedTransaction,
    ) -> Option<TransactionEvent> {
        let signature = record.signature.as_str();
        let balance_delta_sol = classifier::balance_delta_sol(tx, &self.config.address.id);

        if record.is_failed() {
            return Some(TransactionEvent::failed(
                signature,
                balance_delta_sol,
                self.options.tx_url(signature),
            ));
        }

        let event = match classifier::classify(tx) {
            Classification::Mint { mint_token } => {
                let explorer_url = match &mint_token {
                    Some(mint) => self.options.address_url(mint),
                    None => self.options.tx_url(signature),
                };
                let nft = match &mint_token {
                    Some(mint) if self.options.enrich_metadata => {
                        match self.metadata.resolve_nft_metadata(mint).await {
                            Ok(nft) => Some(nft),
                            Err(e) => match self.options.on_metadata_failure {
                                MetadataFailurePolicy::Degrade => {
                                    tracing::warn!(
                                        address = %self.label(),
                                        mint = %mint,
                                        error = %e,
                                        "NFT metadata unavailable, sending plain notification"
                                    );
                                    None
                                }
                                MetadataFailurePolicy::Skip => {
                                    tracing::warn!(
                                        address = %self.label(),
                                        mint = %mint,
                                        error = %e,
                                        "NFT metadata unavailable, skipping notification"
                                    );
                                    return None;
                                }
                            },
                        }
                    }
                    _ => None,
                };

                TransactionEvent {
                    signature: signature.to_string(),
                    kind: TransactionKind::Mint,
                    success: true,
                    mint_token,
                    transfer_destination: None,
                    balance_delta_sol,
                    explorer_url,
                    nft,
                }
            }
            Classification::Transfer { destination } => TransactionEvent {
                signature: signature.to_string(),
                kind: TransactionKind::Transfer,
                success: true,
                mint_token: None,
                transfer_destination: Some(destination),
                balance_delta_sol,
                explorer_url: self.options.tx_url(signature),
                nft: None,
            },
            Classification::Unknown => TransactionEvent {
                signature: signature.to_string(),
                kind: TransactionKind::Unknown,
                success: true,
                mint_token: None,
                transfer_destination: None,
                balance_delta_sol,
                explorer_url: self.options.tx_url(signature),
                nft: None,
            },
        };

        Some(event)
    }

    fn count_poll_failure(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.poll_failures.with_label_values(&[self.label()]).inc();
        }
    }

    fn count_drop(&self, reason: &str) {
        self.status.record_drop();
        if let Some(metrics) = &self.metrics {
            metrics
                .events_dropped
                .with_label_values(&[self.label(), reason])
                .inc();
        }
    }
}
