//! Monitoring module
//!
//! Per-address polling with signature-diff detection, transaction
//! classification, and the supervisor that runs one monitor per address.

pub mod address_monitor;
pub mod classifier;
pub mod known_set;
pub mod status;
pub mod supervisor;

pub use address_monitor::{AddressMonitor, MetadataFailurePolicy, MonitorOptions};
pub use classifier::Classification;
pub use known_set::KnownSignatureSet;
pub use status::{MonitorSnapshot, MonitorState, MonitorStatus, StatusBoard};
pub use supervisor::{build_monitor, Supervisor};
