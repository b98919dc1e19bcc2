//! Transaction classifier
//!
//! Pure functions over a `jsonParsed` transaction. Every lookup is
//! best-effort: a missing or malformed field yields `None`, never an error,
//! so a notification can still be built from whatever was extractable.

use serde_json::Value;

use crate::constants::{instructions, LAMPORTS_PER_SOL};
use crate::models::ParsedTransaction;

/// Outcome of mint/transfer detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A `mintTo` instruction was found; the token id may still be missing
    Mint { mint_token: Option<String> },
    /// The first instruction is a `transfer` with a destination
    Transfer { destination: String },
    Unknown,
}

/// Position of `address` in the transaction's account key list
pub fn account_index(tx: &ParsedTransaction, address: &str) -> Option<usize> {
    tx.account_keys()?
        .iter()
        .position(|key| account_key_str(key) == Some(address))
}

/// Native balance change at `address`, in SOL (post - pre)
pub fn balance_delta_sol(tx: &ParsedTransaction, address: &str) -> Option<f64> {
    let idx = account_index(tx, address)?;
    let pre = tx.pre_balances()?.get(idx)?.as_i64()?;
    let post = tx.post_balances()?.get(idx)?.as_i64()?;

    Some((post - pre) as f64 / LAMPORTS_PER_SOL)
}

/// Mint/transfer detection
///
/// `mintTo` anywhere in the instruction list wins, first match only. Transfer
/// detection looks at the first instruction and nothing else.
pub fn classify(tx: &ParsedTransaction) -> Classification {
    if let Some(mint_token) = find_mint_instruction(tx) {
        return Classification::Mint { mint_token };
    }

    match transfer_destination(tx) {
        Some(destination) => Classification::Transfer { destination },
        None => Classification::Unknown,
    }
}

/// `Some(mint)` for the first `mintTo` instruction (inner `None` if it has no mint field)
fn find_mint_instruction(tx: &ParsedTransaction) -> Option<Option<String>> {
    tx.instructions()?
        .iter()
        .find(|ix| instruction_type(ix) == Some(instructions::MINT_TO))
        .map(|ix| info_str(ix, "mint"))
}

/// Destination of a `transfer` in instruction 0
pub fn transfer_destination(tx: &ParsedTransaction) -> Option<String> {
    let first = tx.instructions()?.first()?;
    if instruction_type(first) != Some(instructions::TRANSFER) {
        return None;
    }
    info_str(first, "destination").filter(|d| !d.is_empty())
}

/// Account keys come as `{ "pubkey": .. }` objects in jsonParsed, plain strings otherwise
fn account_key_str(key: &Value) -> Option<&str> {
    key.as_str()
        .or_else(|| key.get("pubkey").and_then(|p| p.as_str()))
}

fn instruction_type(ix: &Value) -> Option<&str> {
    ix.get("parsed")
        .and_then(|p| p.get("type"))
        .and_then(|t| t.as_str())
}

fn info_str(ix: &Value, field: &str) -> Option<String> {
    ix.get("parsed")
        .and_then(|p| p.get("info"))
        .and_then(|i| i.get(field))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
