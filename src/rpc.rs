//! Explorer RPC adapter
//!
//! Typed wrapper over the three provider calls the monitor needs. No
//! caching and no retries at this layer: every call hits the network and the
//! caller decides what a failure means.

use async_trait::async_trait;
use serde_json::{json, Value};
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_request::{RpcError, RpcRequest};
use solana_client::rpc_response::RpcConfirmedTransactionStatusWithSignature;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::models::{ParsedTransaction, SignatureRecord};

/// Provider calls used by the monitor pipeline
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Recent signatures touching `address`, most-recent-first
    async fn list_signatures(&self, address: &str) -> AppResult<Vec<SignatureRecord>>;

    /// Full `jsonParsed` transaction for `signature`
    async fn get_transaction(&self, signature: &str) -> AppResult<ParsedTransaction>;

    /// Raw account data for `account`
    async fn get_account_data(&self, account: &str) -> AppResult<Vec<u8>>;
}

impl From<RpcConfirmedTransactionStatusWithSignature> for SignatureRecord {
    fn from(status: RpcConfirmedTransactionStatusWithSignature) -> Self {
        let err = status.err.map(|e| {
            serde_json::to_value(&e).unwrap_or_else(|_| Value::String(e.to_string()))
        });

        Self {
            signature: status.signature,
            err,
            slot: Some(status.slot),
            block_time: status.block_time,
            memo: status.memo,
        }
    }
}

/// Missing accounts surface as a `ForUser` RPC error rather than a null value
fn is_account_not_found(e: &ClientError) -> bool {
    matches!(
        e.kind(),
        ClientErrorKind::RpcError(RpcError::ForUser(msg)) if msg.starts_with("AccountNotFound")
    )
}

fn transient(method: &str, e: ClientError) -> AppError {
    AppError::TransientNetwork(format!("{} failed: {}", method, e))
}

fn parse_pubkey(address: &str) -> AppResult<Pubkey> {
    Pubkey::from_str(address)
        .map_err(|e| AppError::Validation(format!("Invalid address {}: {}", address, e)))
}

/// JSON-RPC client for the explorer endpoint
pub struct ExplorerRpcClient {
    url: String,
    client: RpcClient,
    signature_limit: Option<usize>,
}

impl ExplorerRpcClient {
    /// Create a client with a per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(AppError::Validation("RPC URL must be set".to_string()));
        }

        Ok(Self {
            client: RpcClient::new_with_timeout(url.clone(), timeout),
            url,
            signature_limit: None,
        })
    }

    /// Cap the number of signatures requested per poll
    pub fn with_signature_limit(mut self, limit: Option<usize>) -> Self {
        self.signature_limit = limit;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChainRpc for ExplorerRpcClient {
    async fn list_signatures(&self, address: &str) -> AppResult<Vec<SignatureRecord>> {
        let pubkey = parse_pubkey(address)?;
        let config = GetConfirmedSignaturesForAddress2Config {
            limit: self.signature_limit,
            ..GetConfirmedSignaturesForAddress2Config::default()
        };

        let statuses = self
            .client
            .get_signatures_for_address_with_config(&pubkey, config)
            .await
            .map_err(|e| transient("getSignaturesForAddress", e))?;

        Ok(statuses.into_iter().map(SignatureRecord::from).collect())
    }

    async fn get_transaction(&self, signature: &str) -> AppResult<ParsedTransaction> {
        // Kept untyped: the classifier walks the jsonParsed tree directly
        let result: Value = self
            .client
            .send(
                RpcRequest::GetTransaction,
                json!([
                    signature,
                    { "encoding": "jsonParsed", "maxSupportedTransactionVersion": 0 }
                ]),
            )
            .await
            .map_err(|e| transient("getTransaction", e))?;

        if result.is_null() {
            return Err(AppError::NotFound(format!("transaction {}", signature)));
        }

        Ok(ParsedTransaction::new(signature, result))
    }

    async fn get_account_data(&self, account: &str) -> AppResult<Vec<u8>> {
        let pubkey = parse_pubkey(account)?;

        self.client.get_account_data(&pubkey).await.map_err(|e| {
            if is_account_not_found(&e) {
                AppError::NotFound(format!("account {}", account))
            } else {
                transient("getAccountInfo", e)
            }
        })
    }
}
