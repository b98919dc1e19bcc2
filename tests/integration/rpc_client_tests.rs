//! Explorer RPC client and metadata fetcher against a mock HTTP server

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use mintwatch::{AppError, ChainRpc, ExplorerRpcClient, MetadataResolver, NftMetadataFetcher};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const MINT: &str = "So11111111111111111111111111111111111111112";
const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

fn client(server: &ServerGuard) -> ExplorerRpcClient {
    ExplorerRpcClient::new(server.url(), Duration::from_secs(5)).unwrap()
}

fn borsh_string(out: &mut Vec<u8>, value: &str, padded_len: usize) {
    let mut bytes = value.as_bytes().to_vec();
    bytes.resize(padded_len.max(bytes.len()), 0);
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&bytes);
}

fn metadata_account(name: &str, symbol: &str, uri: &str) -> String {
    let mut data = vec![4u8];
    data.extend_from_slice(&[7u8; 32]);
    data.extend_from_slice(&[9u8; 32]);
    borsh_string(&mut data, name, 32);
    borsh_string(&mut data, symbol, 10);
    borsh_string(&mut data, uri, 200);
    BASE64.encode(data)
}

fn account_response(data: String) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "context": {"slot": 1},
            "value": {
                "data": [data, "base64"],
                "executable": false,
                "lamports": 5_616_720u64,
                "owner": "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bcq3LtT",
                "rentEpoch": 0,
                "space": 679
            }
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_list_signatures_parses_records() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"method": "getSignaturesForAddress"})),
            Matcher::Regex(WALLET.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": [
                    {"signature": "B", "slot": 12, "err": null, "memo": null, "blockTime": 1700000000, "confirmationStatus": "finalized"},
                    {"signature": "A", "slot": 11, "err": {"InstructionError": [0, {"Custom": 6001}]}, "memo": null, "blockTime": null, "confirmationStatus": "finalized"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let records = client(&server).list_signatures(WALLET).await.unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].signature, "B");
    assert_eq!(records[0].block_time, Some(1_700_000_000));
    assert_eq!(records[0].slot, Some(12));
    assert!(!records[0].is_failed());
    assert!(records[1].is_failed());
}

#[tokio::test]
async fn test_signature_limit_is_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"method": "getSignaturesForAddress"})),
            Matcher::Regex(r#""limit":25"#.to_string()),
        ]))
        .with_status(200)
        .with_body(json!({"jsonrpc": "2.0", "id": 1, "result": []}).to_string())
        .create_async()
        .await;

    let records = client(&server)
        .with_signature_limit(Some(25))
        .list_signatures(WALLET)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_get_transaction_requests_json_parsed() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "getTransaction",
            "params": ["Sig1", {"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}]
        })))
        .with_status(200)
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "meta": {"err": null, "preBalances": [5], "postBalances": [4]},
                    "transaction": {"message": {"accountKeys": ["Addr1"], "instructions": []}}
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let tx = client(&server).get_transaction("Sig1").await.unwrap();

    mock.assert_async().await;
    assert_eq!(tx.signature, "Sig1");
    assert_eq!(tx.account_keys().map(|k| k.len()), Some(1));
}

#[tokio::test]
async fn test_missing_transaction_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_body(json!({"jsonrpc": "2.0", "id": 1, "result": null}).to_string())
        .create_async()
        .await;

    let result = client(&server).get_transaction("Missing").await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_http_error_is_transient() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(500)
        .with_body("upstream down")
        .create_async()
        .await;

    let result = client(&server).list_signatures(WALLET).await;

    assert!(matches!(result, Err(AppError::TransientNetwork(_))));
}

#[tokio::test]
async fn test_rpc_error_object_is_transient() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32005, "message": "Node is behind"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let result = client(&server).list_signatures(WALLET).await;

    match result {
        Err(AppError::TransientNetwork(msg)) => assert!(msg.contains("Node is behind")),
        other => panic!("expected TransientNetwork, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_account_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_body(
            json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": null}})
                .to_string(),
        )
        .create_async()
        .await;

    let result = client(&server).get_account_data(MINT).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_account_data_is_decoded() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "getAccountInfo"})))
        .with_status(200)
        .with_body(account_response(BASE64.encode([1u8, 2, 3, 4])))
        .create_async()
        .await;

    let data = client(&server).get_account_data(MINT).await.unwrap();

    assert_eq!(data, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_invalid_address_is_rejected_before_request() {
    let server = Server::new_async().await;

    let result = client(&server).list_signatures("not-a-pubkey").await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_metadata_fetcher_resolves_offchain_document() {
    let mut rpc_server = Server::new_async().await;
    let mut web_server = Server::new_async().await;
    let uri = format!("{}/meta/1.json", web_server.url());

    let account_mock = rpc_server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "getAccountInfo"})))
        .expect(2)
        .with_status(200)
        .with_body(account_response(metadata_account("Cool Cat #1", "CAT", &uri)))
        .create_async()
        .await;

    let doc_mock = web_server
        .mock("GET", "/meta/1.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "name": "Cool Cat #1",
                "description": "A cat",
                "image": "https://img/1.png"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let rpc = Arc::new(client(&rpc_server));
    let fetcher = NftMetadataFetcher::new(rpc, Duration::from_secs(5)).unwrap();

    let on_chain = fetcher.fetch_on_chain(MINT).await.unwrap();
    assert_eq!(on_chain.name, "Cool Cat #1");
    assert_eq!(on_chain.symbol, "CAT");
    assert_eq!(on_chain.uri, uri);

    let nft = fetcher.resolve_nft_metadata(MINT).await.unwrap();
    assert_eq!(nft.name, "Cool Cat #1");
    assert_eq!(nft.description, "A cat");
    assert_eq!(nft.image_url, "https://img/1.png");

    account_mock.assert_async().await;
    doc_mock.assert_async().await;
}

#[tokio::test]
async fn test_metadata_fetcher_rejects_incomplete_document() {
    let mut rpc_server = Server::new_async().await;
    let mut web_server = Server::new_async().await;
    let uri = format!("{}/meta/2.json", web_server.url());

    rpc_server
        .mock("POST", "/")
        .with_status(200)
        .with_body(account_response(metadata_account("No Image", "X", &uri)))
        .create_async()
        .await;
    web_server
        .mock("GET", "/meta/2.json")
        .with_status(200)
        .with_body(json!({"name": "No Image"}).to_string())
        .create_async()
        .await;

    let fetcher =
        NftMetadataFetcher::new(Arc::new(client(&rpc_server)), Duration::from_secs(5)).unwrap();

    let result = fetcher.resolve_nft_metadata(MINT).await;

    assert!(matches!(result, Err(AppError::MetadataUnavailable(_))));
}

#[tokio::test]
async fn test_metadata_fetcher_rejects_invalid_mint() {
    let server = Server::new_async().await;
    let fetcher =
        NftMetadataFetcher::new(Arc::new(client(&server)), Duration::from_secs(5)).unwrap();

    let result = fetcher.resolve_nft_metadata("not-a-pubkey").await;

    assert!(matches!(result, Err(AppError::MetadataUnavailable(_))));
}
