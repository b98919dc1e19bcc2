//! Token enrichment
//!
//! Resolves NFT metadata for minted tokens.

pub mod metadata;

pub use metadata::{MetadataResolver, NftMetadataFetcher, OnChainMetadata};
