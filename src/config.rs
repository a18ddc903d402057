use anyhow::Result;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

use crate::models::DistributionConfig;

pub const API_KEY_ENV: &str = "HELIUS_API_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub upstream: UpstreamConfig,
    pub distribution: DistributionSettings,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub rpc_url: String,
    /// Number of token accounts requested per page
    pub page_size: u32,
    /// Deadline applied to every single page request
    pub request_timeout_seconds: u64,
    /// Hard stop for runaway pagination. The request fails when this is exceeded.
    pub max_pages: Option<u32>,
    pub request_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DistributionSettings {
    /// On-chain decimal scale, raw amounts are divided by 10^decimals
    pub decimals: u32,
    pub airdrop_pool: f64,
    pub min_amount: f64,
    pub excluded_owners: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub max_age_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenv::dotenv().ok();
        let config_builder = Self::defaults()?
            .add_source(config::File::with_name("config.toml").required(false))
            .add_source(config::File::with_name("config").required(false))
            // Environment variables with prefix "HOLDERS_", e.g. HOLDERS_SERVICE__PORT
            .add_source(
                config::Environment::with_prefix("HOLDERS")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("distribution.excluded_owners")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config_builder.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in values every other source overrides
    pub fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let builder = config::Config::builder()
            .set_default("service.host", "0.0.0.0")?
            .set_default("service.port", 8080)?
            .set_default("service.log_level", "info")?
            .set_default("upstream.rpc_url", "https://mainnet.helius-rpc.com/")?
            .set_default("upstream.page_size", 1000)?
            .set_default("upstream.request_timeout_seconds", 30)?
            .set_default("upstream.request_id", "holders-export")?
            .set_default("distribution.decimals", 9)?
            .set_default("distribution.airdrop_pool", 20_000_000.0)?
            .set_default("distribution.min_amount", 1500.0)?
            .set_default("distribution.excluded_owners", Vec::<String>::new())?
            .set_default("cors.allowed_origins", vec!["*"])?
            .set_default("cors.max_age_seconds", 300)?;
        Ok(builder)
    }

    /// Load the upstream provider API key from environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(API_KEY_ENV)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", API_KEY_ENV))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.host, self.service.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.request_timeout_seconds)
    }

    pub fn distribution_config(&self) -> DistributionConfig {
        DistributionConfig {
            excluded_owners: self
                .distribution
                .excluded_owners
                .iter()
                .cloned()
                .collect::<HashSet<_>>(),
            min_amount: self.distribution.min_amount,
            airdrop_pool: self.distribution.airdrop_pool,
        }
    }

    /// Reject values that would make the aggregation loop or share split meaningless
    pub fn validate(&self) -> Result<()> {
        if self.upstream.page_size == 0 {
            return Err(anyhow::anyhow!("upstream.page_size must be greater than 0"));
        }
        if self.upstream.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!(
                "upstream.request_timeout_seconds must be greater than 0"
            ));
        }
        if self.upstream.max_pages == Some(0) {
            return Err(anyhow::anyhow!("upstream.max_pages must be greater than 0 when set"));
        }
        if !(self.distribution.airdrop_pool > 0.0) {
            return Err(anyhow::anyhow!(
                "Invalid distribution configuration: airdrop_pool ({}) must be positive",
                self.distribution.airdrop_pool
            ));
        }
        if !(self.distribution.min_amount >= 0.0) {
            return Err(anyhow::anyhow!(
                "Invalid distribution configuration: min_amount ({}) must not be negative",
                self.distribution.min_amount
            ));
        }
        if self.distribution.decimals > 18 {
            return Err(anyhow::anyhow!(
                "Invalid distribution configuration: decimals ({}) must be at most 18",
                self.distribution.decimals
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> Config {
        Config::defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_match_provider_contract() {
        let config = default_config();
        assert_eq!(config.upstream.page_size, 1000);
        assert_eq!(config.distribution.decimals, 9);
        assert_eq!(config.distribution.airdrop_pool, 20_000_000.0);
        assert_eq!(config.distribution.min_amount, 1500.0);
        assert!(config.distribution.excluded_owners.is_empty());
        assert!(config.upstream.max_pages.is_none());
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config: Config = Config::defaults()
            .unwrap()
            .set_override("upstream.page_size", 50)
            .unwrap()
            .set_override("distribution.excluded_owners", vec!["A", "B"])
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.upstream.page_size, 50);
        let distribution = config.distribution_config();
        assert!(distribution.excluded_owners.contains("A"));
        assert!(distribution.excluded_owners.contains("B"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = default_config();
        config.upstream.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = default_config();
        config.distribution.airdrop_pool = 0.0;
        assert!(config.validate().is_err());

        let mut config = default_config();
        config.distribution.min_amount = -1.0;
        assert!(config.validate().is_err());

        let mut config = default_config();
        config.upstream.max_pages = Some(0);
        assert!(config.validate().is_err());
    }
}
