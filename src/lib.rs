//! mintwatch library
//!
//! Polls an explorer RPC endpoint for new transactions on watched addresses,
//! classifies them, enriches mints with NFT metadata, and posts a webhook
//! notification for each one.

pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod monitoring;
pub mod notifications;
pub mod rpc;
pub mod token;

// Re-export commonly used types for tests
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use metrics::MetricsState;
pub use models::{
    MonitorConfig, NftMetadata, ParsedTransaction, SignatureRecord, TransactionEvent,
    TransactionKind, WatchedAddress,
};
pub use monitoring::{
    AddressMonitor, KnownSignatureSet, MetadataFailurePolicy, MonitorOptions, StatusBoard,
    Supervisor,
};
pub use notifications::{EmbedStyle, Notifier, RetryPolicy, WebhookDispatcher};
pub use rpc::{ChainRpc, ExplorerRpcClient};
pub use token::{MetadataResolver, NftMetadataFetcher};
