use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};
use crate::types::{
    DisplayOptions, RpcRequest, RpcResponse, TokenAccount, TokenAccountsParams,
    TokenAccountsResult, GET_TOKEN_ACCOUNTS,
};

/// TokenAccountsClient fetches single pages of token accounts from the RPC provider
#[derive(Debug, Clone)]
pub struct TokenAccountsClient {
    http_client: Client,
    rpc_url: String,
    api_key: String,
    page_size: u32,
    request_id: String,
}

impl TokenAccountsClient {
    pub fn new(
        rpc_url: impl Into<String>,
        api_key: impl Into<String>,
        page_size: u32,
        request_timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(AppError::Transport)?;

        Ok(Self {
            http_client,
            rpc_url: rpc_url.into(),
            api_key: api_key.into(),
            page_size,
            request_id: "holders-export".to_string(),
        })
    }

    pub fn from_config(upstream: &UpstreamConfig, api_key: impl Into<String>) -> AppResult<Self> {
        let client = Self::new(
            upstream.rpc_url.clone(),
            api_key,
            upstream.page_size,
            Duration::from_secs(upstream.request_timeout_seconds),
        )?;
        Ok(client.with_request_id(upstream.request_id.clone()))
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch one page of token accounts for `mint`. Pages start at 1.
    /// An empty vector means pagination is exhausted.
    pub async fn fetch_page(&self, mint: &str, page: u32) -> AppResult<Vec<TokenAccount>> {
        let request = RpcRequest::new(
            &self.request_id,
            GET_TOKEN_ACCOUNTS,
            TokenAccountsParams {
                page,
                limit: self.page_size,
                display_options: DisplayOptions::default(),
                mint,
            },
        );
        let payload = serde_json::to_vec(&request)?;

        debug!("Requesting {} - mint: {}, page: {}", GET_TOKEN_ACCOUNTS, mint, page);

        let response = self
            .http_client
            .post(&self.rpc_url)
            .query(&[("api-key", self.api_key.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                error!("Upstream request failed for mint {} page {}: {}", mint, page, e);
                AppError::from_request(e, page)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Upstream returned status {} for mint {} page {}", status, mint, page);
            return Err(AppError::UpstreamStatus { status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::from_request(e, page))?;

        let rpc_response: RpcResponse<TokenAccountsResult> = serde_json::from_slice(&body)
            .map_err(|e| {
                error!("Undecodable upstream response for mint {} page {}: {}", mint, page, e);
                AppError::Decode(e.to_string())
            })?;

        if let Some(rpc_error) = rpc_response.error {
            error!(
                "Upstream RPC error for mint {} page {}: {} {}",
                mint, page, rpc_error.code, rpc_error.message
            );
            return Err(AppError::Rpc {
                code: rpc_error.code,
                message: rpc_error.message,
            });
        }

        let result = rpc_response
            .result
            .ok_or_else(|| AppError::Decode("response is missing the 'result' field".to_string()))?;

        Ok(result.token_accounts.unwrap_or_default())
    }
}
