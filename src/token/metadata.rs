//! NFT metadata resolution
//!
//! Two round trips per mint:
//! - on-chain Metaplex metadata account (derived PDA) for the off-chain URI
//! - HTTP GET of that URI for `name`, `description` and `image`

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::programs;
use crate::error::{AppError, AppResult};
use crate::models::NftMetadata;
use crate::rpc::ChainRpc;

/// Resolves enrichment data for a minted token
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve_nft_metadata(&self, mint: &str) -> AppResult<NftMetadata>;
}

/// Fields read from the on-chain metadata account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainMetadata {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

/// Metadata account address for `mint`
pub fn metadata_pda(mint: &str) -> AppResult<Pubkey> {
    let mint = Pubkey::from_str(mint)
        .map_err(|e| AppError::MetadataUnavailable(format!("Invalid mint address {}: {}", mint, e)))?;
    let program = Pubkey::from_str(programs::TOKEN_METADATA)
        .map_err(|e| AppError::Internal(format!("Invalid metadata program id: {}", e)))?;

    let (pda, _bump) = Pubkey::find_program_address(
        &[b"metadata", program.as_ref(), mint.as_ref()],
        &program,
    );
    Ok(pda)
}

/// Decode the leading fields of a Metaplex metadata account
///
/// Layout:
/// - key: u8 (1 byte)
/// - update_authority: Pubkey (32 bytes)
/// - mint: Pubkey (32 bytes)
/// - name, symbol, uri: Borsh strings (u32 LE length + UTF-8), NUL padded
pub fn decode_metadata_account(data: &[u8]) -> Option<OnChainMetadata> {
    let mut offset = 1 + 32 + 32;
    let name = read_borsh_string(data, &mut offset)?;
    let symbol = read_borsh_string(data, &mut offset)?;
    let uri = read_borsh_string(data, &mut offset)?;

    Some(OnChainMetadata { name, symbol, uri })
}

fn read_borsh_string(data: &[u8], offset: &mut usize) -> Option<String> {
    let len_bytes: [u8; 4] = data.get(*offset..*offset + 4)?.try_into().ok()?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    let start = *offset + 4;
    let bytes = data.get(start..start.checked_add(len)?)?;
    *offset = start + len;

    let s = std::str::from_utf8(bytes).ok()?;
    Some(s.trim_end_matches('\0').to_string())
}

/// Parse the off-chain JSON document; `name` and `image` are required
pub fn parse_offchain_document(doc: &Value) -> Option<NftMetadata> {
    let name = doc.get("name")?.as_str()?.to_string();
    let image_url = doc.get("image")?.as_str()?.to_string();
    let description = doc
        .get("description")
        .and_then(|d| d.as_str())
        .unwrap_or_default()
        .to_string();

    Some(NftMetadata {
        name,
        description,
        image_url,
    })
}

/// Fetches NFT metadata through the chain RPC and plain HTTP
pub struct NftMetadataFetcher {
    rpc: Arc<dyn ChainRpc>,
    http: Client,
}

impl NftMetadataFetcher {
    /// Create a new metadata fetcher
    pub fn new(rpc: Arc<dyn ChainRpc>, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { rpc, http })
    }

    /// Read the on-chain metadata account for `mint`
    pub async fn fetch_on_chain(&self, mint: &str) -> AppResult<OnChainMetadata> {
        let pda = metadata_pda(mint)?;

        let data = self.rpc.get_account_data(&pda.to_string()).await.map_err(|e| {
            AppError::MetadataUnavailable(format!("Metadata account for {}: {}", mint, e))
        })?;

        decode_metadata_account(&data).ok_or_else(|| {
            AppError::MetadataUnavailable(format!("Undecodable metadata account for {}", mint))
        })
    }

    async fn fetch_offchain(&self, uri: &str) -> AppResult<NftMetadata> {
        let unavailable = |e: reqwest::Error| {
            AppError::MetadataUnavailable(format!("Off-chain metadata {}: {}", uri, e))
        };

        let doc: Value = self
            .http
            .get(uri)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        parse_offchain_document(&doc).ok_or_else(|| {
            AppError::MetadataUnavailable(format!("Off-chain metadata {} lacks name or image", uri))
        })
    }
}

#[async_trait]
impl MetadataResolver for NftMetadataFetcher {
    async fn resolve_nft_metadata(&self, mint: &str) -> AppResult<NftMetadata> {
        let on_chain = self.fetch_on_chain(mint).await?;

        if on_chain.uri.is_empty() {
            return Err(AppError::MetadataUnavailable(format!(
                "Metadata account for {} has no URI",
                mint
            )));
        }

        tracing::debug!(mint, uri = %on_chain.uri, "Resolved metadata URI");

        self.fetch_offchain(&on_chain.uri).await
    }
}
