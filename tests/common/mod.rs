#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;
use token_holders_service::TokenAccountsClient;

pub const API_KEY: &str = "test-key";

pub fn client_for(server: &ServerGuard) -> TokenAccountsClient {
    TokenAccountsClient::new(server.url(), API_KEY, 1000, Duration::from_secs(5)).unwrap()
}

/// Mock a single `getTokenAccounts` page for `mint`
pub async fn mock_page(
    server: &mut ServerGuard,
    mint: &str,
    page: u32,
    accounts: &[(&str, u64)],
) -> Mock {
    let token_accounts: Vec<_> = accounts
        .iter()
        .map(|(owner, amount)| json!({ "owner": owner, "amount": amount, "mint": mint }))
        .collect();

    server
        .mock("POST", "/")
        .match_query(Matcher::UrlEncoded("api-key".into(), API_KEY.into()))
        .match_body(Matcher::PartialJson(json!({
            "method": "getTokenAccounts",
            "params": { "page": page, "limit": 1000, "mint": mint }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": "holders-export",
                "result": {
                    "total": accounts.len(),
                    "limit": 1000,
                    "page": page,
                    "token_accounts": token_accounts
                }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await
}

/// Mock a failing page with the given HTTP status
pub async fn mock_failing_page(server: &mut ServerGuard, mint: &str, page: u32, status: usize) -> Mock {
    server
        .mock("POST", "/")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "params": { "page": page, "mint": mint }
        })))
        .with_status(status)
        .with_body("upstream failure")
        .expect(1)
        .create_async()
        .await
}

/// A TCP endpoint that accepts connections and never answers
pub async fn hanging_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

pub fn row_set(body: &[u8]) -> HashSet<String> {
    String::from_utf8(body.to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
