//! Classification rules over realistic jsonParsed transactions

use mintwatch::monitoring::classifier::{balance_delta_sol, classify};
use mintwatch::monitoring::Classification;
use mintwatch::ParsedTransaction;
use serde_json::{json, Value};

fn tx(instructions: Value) -> ParsedTransaction {
    ParsedTransaction::new(
        "Sig",
        json!({
            "meta": {
                "err": null,
                "preBalances": [3_000_000_000u64, 1_000_000_000u64],
                "postBalances": [1_000_000_000u64, 1_250_000_000u64]
            },
            "transaction": {
                "message": {
                    "accountKeys": [
                        {"pubkey": "Payer", "signer": true},
                        {"pubkey": "Addr1", "signer": false}
                    ],
                    "instructions": instructions
                }
            }
        }),
    )
}

fn parsed(kind: &str, info: Value) -> Value {
    json!({"program": "spl-token", "parsed": {"type": kind, "info": info}})
}

#[test]
fn test_mint_anywhere_beats_leading_transfer() {
    let tx = tx(json!([
        parsed("transfer", json!({"source": "Payer", "destination": "Creator", "lamports": 10})),
        parsed("createAccount", json!({})),
        parsed("mintTo", json!({"mint": "Mint1", "amount": "1"})),
    ]));

    assert_eq!(
        classify(&tx),
        Classification::Mint {
            mint_token: Some("Mint1".to_string())
        }
    );
}

#[test]
fn test_first_mint_to_wins() {
    let tx = tx(json!([
        parsed("mintTo", json!({"mint": "First"})),
        parsed("mintTo", json!({"mint": "Second"})),
    ]));

    assert_eq!(
        classify(&tx),
        Classification::Mint {
            mint_token: Some("First".to_string())
        }
    );
}

#[test]
fn test_transfer_only_checked_in_first_instruction() {
    let tx = tx(json!([
        {"programId": "ComputeBudget111111111111111111111111111111", "data": "3gJqkocMWaMm"},
        parsed("transfer", json!({"source": "Payer", "destination": "Dest"})),
    ]));

    assert_eq!(classify(&tx), Classification::Unknown);
}

#[test]
fn test_first_instruction_transfer() {
    let tx = tx(json!([
        parsed("transfer", json!({"source": "Payer", "destination": "Dest"})),
    ]));

    assert_eq!(
        classify(&tx),
        Classification::Transfer {
            destination: "Dest".to_string()
        }
    );
}

#[test]
fn test_transfer_without_destination_is_unknown() {
    let tx = tx(json!([parsed("transfer", json!({"source": "Payer", "destination": ""}))]));

    assert_eq!(classify(&tx), Classification::Unknown);
}

#[test]
fn test_mint_without_token_id() {
    let tx = tx(json!([parsed("mintTo", json!({"amount": "1"}))]));

    assert_eq!(classify(&tx), Classification::Mint { mint_token: None });
}

#[test]
fn test_balance_delta_for_watched_address() {
    let tx = tx(json!([]));

    let delta = balance_delta_sol(&tx, "Addr1").unwrap();
    assert!((delta - 0.25).abs() < 1e-9);

    let payer = balance_delta_sol(&tx, "Payer").unwrap();
    assert!((payer + 2.0).abs() < 1e-9);
}

#[test]
fn test_balance_delta_absent_when_address_not_in_keys() {
    assert_eq!(balance_delta_sol(&tx(json!([])), "Stranger"), None);
}

#[test]
fn test_malformed_transaction_is_unknown() {
    let tx = ParsedTransaction::new("Sig", json!({"unexpected": true}));

    assert_eq!(classify(&tx), Classification::Unknown);
    assert_eq!(balance_delta_sol(&tx, "Addr1"), None);
}
