//! Transaction models - signature listings, parsed transactions and derived events

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a `getSignaturesForAddress` response
///
/// Identity is the signature string; the remaining fields are informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub signature: String,
    /// Transaction error, `null` when the transaction succeeded
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub slot: Option<u64>,
    #[serde(default, rename = "blockTime")]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl SignatureRecord {
    /// Record for a successful transaction
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            err: None,
            slot: None,
            block_time: None,
            memo: None,
        }
    }

    /// Record carrying an error marker
    pub fn failed(signature: impl Into<String>, err: Value) -> Self {
        Self {
            err: Some(err),
            ..Self::new(signature)
        }
    }

    /// Whether the provider flagged this transaction as failed
    pub fn is_failed(&self) -> bool {
        matches!(&self.err, Some(v) if !v.is_null())
    }
}

impl PartialEq for SignatureRecord {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}

impl Eq for SignatureRecord {}

/// Raw `jsonParsed` transaction as returned by the provider (the `result` object)
///
/// Kept as untyped JSON: every field lookup is best-effort and returns `Option`.
#[derive(Debug, Clone)]
pub struct ParsedTransaction {
    pub signature: String,
    pub raw: Value,
}

impl ParsedTransaction {
    pub fn new(signature: impl Into<String>, raw: Value) -> Self {
        Self {
            signature: signature.into(),
            raw,
        }
    }

    /// `transaction.message.accountKeys`
    pub fn account_keys(&self) -> Option<&Vec<Value>> {
        self.raw
            .get("transaction")
            .and_then(|t| t.get("message"))
            .and_then(|m| m.get("accountKeys"))
            .and_then(|k| k.as_array())
    }

    /// `transaction.message.instructions`
    pub fn instructions(&self) -> Option<&Vec<Value>> {
        self.raw
            .get("transaction")
            .and_then(|t| t.get("message"))
            .and_then(|m| m.get("instructions"))
            .and_then(|i| i.as_array())
    }

    /// `meta.preBalances`
    pub fn pre_balances(&self) -> Option<&Vec<Value>> {
        self.raw
            .get("meta")
            .and_then(|m| m.get("preBalances"))
            .and_then(|b| b.as_array())
    }

    /// `meta.postBalances`
    pub fn post_balances(&self) -> Option<&Vec<Value>> {
        self.raw
            .get("meta")
            .and_then(|m| m.get("postBalances"))
            .and_then(|b| b.as_array())
    }
}

/// Classification of a newly observed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Mint,
    Transfer,
    Unknown,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Mint => write!(f, "MINT"),
            TransactionKind::Transfer => write!(f, "TRANSFER"),
            TransactionKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Off-chain NFT metadata used to enrich mint notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub image_url: String,
}

/// Everything the dispatcher needs to describe one new transaction
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEvent {
    pub signature: String,
    pub kind: TransactionKind,
    pub success: bool,
    pub mint_token: Option<String>,
    pub transfer_destination: Option<String>,
    /// Native balance change of the watched address, in SOL
    pub balance_delta_sol: Option<f64>,
    pub explorer_url: String,
    /// Present only for successfully enriched mints
    pub nft: Option<NftMetadata>,
}

impl TransactionEvent {
    /// Event for a transaction the provider flagged as failed
    pub fn failed(signature: impl Into<String>, balance_delta_sol: Option<f64>, explorer_url: String) -> Self {
        Self {
            signature: signature.into(),
            kind: TransactionKind::Unknown,
            success: false,
            mint_token: None,
            transfer_destination: None,
            balance_delta_sol,
            explorer_url,
            nft: None,
        }
    }

    /// Whether the notification title/image come from NFT metadata
    pub fn is_enriched(&self) -> bool {
        self.nft.is_some()
    }
}
