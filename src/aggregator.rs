use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::csv_export::write_rows;
use crate::distribution::proportional_shares;
use crate::error::{AppError, AppResult};
use crate::models::{CsvRow, ExportMode, HolderRecord};
use crate::rpc_client::TokenAccountsClient;

/// Per-request aggregation state, discarded once the response is written
#[derive(Debug, Clone, Default)]
pub struct AggregateState {
    holders: BTreeMap<String, f64>,
    total: f64,
    pages_requested: u32,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an owner's balance, the latest value wins
    pub fn insert(&mut self, record: HolderRecord) {
        if let Some(previous) = self.holders.insert(record.owner, record.amount) {
            self.total -= previous;
        }
        self.total += record.amount;
    }

    pub fn holders(&self) -> &BTreeMap<String, f64> {
        &self.holders
    }

    /// Sum of the retained balances
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Page requests issued, including the final empty one
    pub fn pages_requested(&self) -> u32 {
        self.pages_requested
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    /// Output rows sorted by owner
    pub fn rows(&self, mode: &ExportMode) -> Vec<CsvRow> {
        match mode {
            ExportMode::Holders => self
                .holders
                .iter()
                .map(|(owner, amount)| CsvRow {
                    owner: owner.clone(),
                    value: *amount,
                })
                .collect(),
            ExportMode::Airdrop(distribution) => {
                proportional_shares(&self.holders, self.total, distribution.airdrop_pool)
            }
        }
    }
}

/// HolderAggregator walks every page of a mint's token accounts and folds them per owner
#[derive(Debug, Clone)]
pub struct HolderAggregator {
    client: TokenAccountsClient,
    scale: f64,
    max_pages: Option<u32>,
}

impl HolderAggregator {
    pub fn new(client: TokenAccountsClient, decimals: u32, max_pages: Option<u32>) -> Self {
        Self {
            client,
            scale: 10f64.powi(decimals as i32),
            max_pages,
        }
    }

    pub fn from_config(config: &Config, client: TokenAccountsClient) -> Self {
        Self::new(client, config.distribution.decimals, config.upstream.max_pages)
    }

    /// Convert a raw on-chain amount into token units
    pub fn to_token_amount(&self, raw: u64) -> f64 {
        raw as f64 / self.scale
    }

    /// Fetch pages sequentially until one comes back empty.
    ///
    /// Any failure aborts the whole run, nothing partial is returned.
    pub async fn aggregate(
        &self,
        mint: &str,
        mode: &ExportMode,
        cancel: &CancellationToken,
    ) -> AppResult<AggregateState> {
        let mut state = AggregateState::new();
        let mut page: u32 = 1;

        loop {
            if let Some(max_pages) = self.max_pages {
                if page > max_pages {
                    warn!("Reached maximum page limit ({}) for mint {}", max_pages, mint);
                    return Err(AppError::PageLimitExceeded { max_pages });
                }
            }

            let accounts = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Holder export for mint {} cancelled at page {}", mint, page);
                    return Err(AppError::Cancelled);
                }
                result = self.client.fetch_page(mint, page) => result?,
            };
            state.pages_requested += 1;

            if accounts.is_empty() {
                info!("No more token accounts for mint {} after page {}", mint, page - 1);
                break;
            }

            let fetched = accounts.len();
            for account in accounts {
                let amount = self.to_token_amount(account.amount);
                match mode {
                    ExportMode::Holders => state.insert(HolderRecord::new(account.owner, amount)),
                    ExportMode::Airdrop(distribution) => {
                        if distribution.accepts(&account.owner, amount) {
                            state.insert(HolderRecord::new(account.owner, amount));
                        }
                    }
                }
            }

            info!(
                "Fetched {} token accounts from page {} for mint {} ({} holders retained)",
                fetched,
                page,
                mint,
                state.len()
            );

            page += 1;
        }

        Ok(state)
    }

    /// Aggregate and render the CSV body for `mode`
    pub async fn export_csv(
        &self,
        mint: &str,
        mode: &ExportMode,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<u8>> {
        let state = self.aggregate(mint, mode, cancel).await?;
        let rows = state.rows(mode);
        info!(
            "Exporting {} rows for mint {} ({} pages requested)",
            rows.len(),
            mint,
            state.pages_requested()
        );
        write_rows(&rows)
    }
}
