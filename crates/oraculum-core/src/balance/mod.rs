//! ============================================================================
//! Balance Module - External ETH balance sources
//! ============================================================================
//! The access controller only sees the `BalanceSource` capability. The
//! production implementation queries an Etherscan-compatible API.
//!
//! ## Usage
//! ```rust,ignore
//! use oraculum_core::balance::{BalanceSource, EtherscanClient};
//!
//! let client = EtherscanClient::from_config(&config)?;
//! let reading = client.fetch_balance("0x5036...").await?;
//! ```
//! ============================================================================

mod etherscan;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::access::BalanceReading;

pub use etherscan::{parse_balance_response, EtherscanClient, DEFAULT_ETHERSCAN_API_URL};

/// Failures while fetching a balance. All of them are non-fatal to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FetchError {
    #[error("Network error fetching ETH balance from Etherscan: {0}")]
    Network(String),

    #[error("Etherscan API error: {}", provider_detail(.message, .result))]
    Provider { message: String, result: String },

    #[error("JSON decoding or data conversion error from Etherscan: {0}")]
    Decode(String),

    #[error("Etherscan API key is not configured")]
    MissingApiKey,
}

impl FetchError {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Provider { .. } => "provider",
            FetchError::Decode(_) => "decode",
            FetchError::MissingApiKey => "config",
        }
    }
}

/// `result` is often empty on throttling errors; leave it out rather than print "()"
fn provider_detail(message: &str, result: &str) -> String {
    if result.is_empty() {
        message.to_string()
    } else {
        format!("{} ({})", message, result)
    }
}

/// Anything that can report the current ETH balance of an address
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn fetch_balance(&self, address: &str) -> Result<BalanceReading, FetchError>;
}
