//! ============================================================================
//! Gate Configuration - Environment-driven settings
//! ============================================================================
//! Every setting has a default so a bare checkout runs against Sepolia.
//! A missing API key is not a config error: the balance client reports it
//! per request and the session fails closed.
//! ============================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::access::{MIN_ETH_FOR_PREMIUM, RATE_LIMIT_SECS};
use crate::balance::DEFAULT_ETHERSCAN_API_URL;

/// Payment wallet monitored by default
pub const DEFAULT_ETH_ADDRESS: &str = "0x5036dbcEEfae0a7429e64467222e1E259819c7C7";

/// Sepolia chain id
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Placeholder shipped in sample env files; treated as no key
const PLACEHOLDER_API_KEY: &str = "YOUR_ETHERSCAN_API_KEY";

pub const ENV_ETH_ADDRESS: &str = "ORACULUM_ETH_ADDRESS";
pub const ENV_API_KEY: &str = "ETHERSCAN_API_KEY";
pub const ENV_API_URL: &str = "ETHERSCAN_API_URL";
pub const ENV_MIN_ETH: &str = "MIN_ETH_FOR_PREMIUM";
pub const ENV_RATE_LIMIT_SECS: &str = "ORACULUM_RATE_LIMIT_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "ORACULUM_HTTP_TIMEOUT_SECS";
pub const ENV_CHAIN_ID: &str = "ORACULUM_CHAIN_ID";

/// Errors that can occur while loading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Access gate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Wallet whose balance unlocks premium access
    pub address: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_url: String,
    pub min_eth_for_premium: f64,
    pub rate_limit_secs: i64,
    pub http_timeout_secs: u64,
    pub chain_id: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ETH_ADDRESS.to_string(),
            api_key: None,
            api_url: DEFAULT_ETHERSCAN_API_URL.to_string(),
            min_eth_for_premium: MIN_ETH_FOR_PREMIUM,
            rate_limit_secs: RATE_LIMIT_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

impl GateConfig {
    /// Load `.env` (if present) and then read the process environment
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(address) = get(ENV_ETH_ADDRESS) {
            config.address = address;
        }

        config.api_key = get(ENV_API_KEY).filter(|key| {
            let placeholder = key == PLACEHOLDER_API_KEY;
            if placeholder {
                warn!("{} is still the placeholder value - balance checks will fail", ENV_API_KEY);
            }
            !placeholder
        });

        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(raw) = get(ENV_MIN_ETH) {
            config.min_eth_for_premium = parse_value(ENV_MIN_ETH, &raw)?;
        }
        if let Some(raw) = get(ENV_RATE_LIMIT_SECS) {
            config.rate_limit_secs = parse_value(ENV_RATE_LIMIT_SECS, &raw)?;
        }
        if let Some(raw) = get(ENV_HTTP_TIMEOUT_SECS) {
            config.http_timeout_secs = parse_value(ENV_HTTP_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = get(ENV_CHAIN_ID) {
            config.chain_id = parse_value(ENV_CHAIN_ID, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_eth_for_premium.is_finite() || self.min_eth_for_premium < 0.0 {
            return Err(invalid(ENV_MIN_ETH, "must be a non-negative number"));
        }
        if self.rate_limit_secs < 0 {
            return Err(invalid(ENV_RATE_LIMIT_SECS, "must not be negative"));
        }
        if chrono::Duration::try_seconds(self.rate_limit_secs).is_none() {
            return Err(invalid(ENV_RATE_LIMIT_SECS, "is too large"));
        }
        if self.http_timeout_secs == 0 {
            return Err(invalid(ENV_HTTP_TIMEOUT_SECS, "must be at least 1 second"));
        }
        if self.address.is_empty() {
            return Err(invalid(ENV_ETH_ADDRESS, "must not be empty"));
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| invalid(key, &format!("'{}': {}", raw, e)))
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
