use serde::{Deserialize, Serialize};

// Wire types for the provider's `getTokenAccounts` JSON-RPC method

pub const GET_TOKEN_ACCOUNTS: &str = "getTokenAccounts";

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub id: &'a str,
    pub method: &'static str,
    pub params: P,
}

impl<'a, P: Serialize> RpcRequest<'a, P> {
    pub fn new(id: &'a str, method: &'static str, params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// No extra display options are requested
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayOptions {}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAccountsParams<'a> {
    pub page: u32,
    pub limit: u32,
    pub display_options: DisplayOptions,
    pub mint: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<R> {
    pub result: Option<R>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenAccountsResult {
    #[serde(default)]
    pub token_accounts: Option<Vec<TokenAccount>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub owner: String,
    /// Raw on-chain amount, not yet scaled by the mint decimals
    pub amount: u64,
}
