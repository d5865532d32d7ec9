//! ============================================================================
//! Access Types - Balance-gated premium access state
//! ============================================================================
//! Defines the premium threshold, the per-session access state and the
//! balance readings produced by a block explorer query.
//! ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum ETH balance that unlocks premium access
pub const MIN_ETH_FOR_PREMIUM: f64 = 0.001;

/// Minimum interval between balance queries while premium is active
pub const RATE_LIMIT_SECS: i64 = 30;

/// Wei per ETH (10^18)
pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// Sink component the access controller reports under
pub const WALLET_COMPONENT: &str = "Wallet";

/// The two states of the premium gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Premium content hidden
    #[default]
    Locked,
    /// Balance threshold met, all signals visible
    Unlocked,
}

impl AccessLevel {
    /// Determine the access level from an ETH amount
    pub fn from_balance(amount_eth: f64, threshold_eth: f64) -> Self {
        if amount_eth >= threshold_eth {
            AccessLevel::Unlocked
        } else {
            AccessLevel::Locked
        }
    }

    pub fn from_premium(premium_active: bool) -> Self {
        if premium_active {
            AccessLevel::Unlocked
        } else {
            AccessLevel::Locked
        }
    }

    pub fn is_premium(&self) -> bool {
        matches!(self, AccessLevel::Unlocked)
    }

    /// Get human-readable level name
    pub fn display_name(&self) -> &'static str {
        match self {
            AccessLevel::Locked => "Premium Access Required",
            AccessLevel::Unlocked => "Premium Access Active",
        }
    }
}

/// Access state owned by one session and threaded through the controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccessState {
    pub premium_active: bool,
    /// Time of the last performed check (success or failure)
    pub last_check: DateTime<Utc>,
    /// Last successfully fetched balance in ETH
    pub last_balance: f64,
}

impl AccessState {
    /// Initial session state: locked, never checked
    pub fn new() -> Self {
        Self {
            premium_active: false,
            last_check: DateTime::<Utc>::MIN_UTC,
            last_balance: 0.0,
        }
    }

    pub fn level(&self) -> AccessLevel {
        AccessLevel::from_premium(self.premium_active)
    }

    /// True once at least one check has been performed
    pub fn has_checked(&self) -> bool {
        self.last_check != DateTime::<Utc>::MIN_UTC
    }
}

impl Default for AccessState {
    fn default() -> Self {
        Self::new()
    }
}

/// A single balance observation from the block explorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReading {
    pub address: String,
    pub wei: u128,
    /// Balance in ETH
    pub amount: f64,
    pub observed_at: DateTime<Utc>,
}

impl BalanceReading {
    pub fn from_wei(address: impl Into<String>, wei: u128, observed_at: DateTime<Utc>) -> Self {
        Self {
            address: address.into(),
            wei,
            amount: wei_to_eth(wei),
            observed_at,
        }
    }
}

/// Convert wei to ETH
pub fn wei_to_eth(wei: u128) -> f64 {
    wei as f64 / WEI_PER_ETH as f64
}

/// Convert ETH to wei, rounding to the nearest wei. Negative and NaN map to 0.
pub fn eth_to_wei(eth: f64) -> u128 {
    (eth * WEI_PER_ETH as f64).round() as u128
}

/// Format an ETH amount with six decimals
pub fn format_eth(amount: f64) -> String {
    format!("{:.6}", amount)
}
