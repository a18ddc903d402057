use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One owner's aggregated balance, in human-scale token units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderRecord {
    pub owner: String,
    pub amount: f64,
}

impl HolderRecord {
    pub fn new(owner: String, amount: f64) -> Self {
        Self { owner, amount }
    }
}

/// Filter and pool used by the airdrop export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionConfig {
    pub excluded_owners: HashSet<String>,
    pub min_amount: f64,
    pub airdrop_pool: f64,
}

impl DistributionConfig {
    pub fn new(excluded_owners: HashSet<String>, min_amount: f64, airdrop_pool: f64) -> Self {
        Self {
            excluded_owners,
            min_amount,
            airdrop_pool,
        }
    }

    /// Whether a holder with this balance takes part in the airdrop
    pub fn accepts(&self, owner: &str, amount: f64) -> bool {
        !self.excluded_owners.contains(owner) && amount >= self.min_amount
    }
}

/// Which CSV the aggregation produces
#[derive(Debug, Clone, PartialEq)]
pub enum ExportMode {
    /// Every holder with its balance
    Holders,
    /// Qualifying holders with their share of the pool
    Airdrop(DistributionConfig),
}

impl ExportMode {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportMode::Holders => "holders.csv",
            ExportMode::Airdrop(_) => "airdrop.csv",
        }
    }
}

/// A single `owner,value` line of the exported CSV
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub owner: String,
    pub value: f64,
}
