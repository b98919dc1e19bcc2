//! Domain models shared by the monitor pipeline

pub mod address;
pub mod transaction;

pub use address::{MonitorConfig, WatchedAddress};
pub use transaction::{
    NftMetadata, ParsedTransaction, SignatureRecord, TransactionEvent, TransactionKind,
};
