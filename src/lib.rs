//! HTTP service exporting the holders of a token mint as CSV, with an
//! optional proportional airdrop split.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod csv_export;
pub mod distribution;
pub mod error;
pub mod models;
pub mod rpc_client;
pub mod types;

pub use aggregator::{AggregateState, HolderAggregator};
pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{CsvRow, DistributionConfig, ExportMode, HolderRecord};
pub use rpc_client::TokenAccountsClient;
