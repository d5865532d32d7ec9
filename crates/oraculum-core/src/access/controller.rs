//! ============================================================================
//! Access Controller - Rate-limited, fail-closed premium gating
//! ============================================================================
//! One call = at most one balance query. While premium is active, queries are
//! skipped until the rate-limit window has elapsed. While locked, every call
//! re-checks. Fetch failures never grant access.
//! ============================================================================

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::types::{format_eth, AccessLevel, AccessState, MIN_ETH_FOR_PREMIUM, RATE_LIMIT_SECS, WALLET_COMPONENT};
use crate::balance::BalanceSource;
use crate::config::GateConfig;
use crate::status::StatusSink;

/// Wallet status after a successful balance check
pub const STATUS_ONLINE: &str = "Online";

/// Wallet status after a failed balance check
pub const STATUS_ERROR: &str = "Error";

/// Threshold and rate limit applied by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessPolicy {
    pub min_eth_for_premium: f64,
    pub rate_limit: Duration,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            min_eth_for_premium: MIN_ETH_FOR_PREMIUM,
            rate_limit: Duration::seconds(RATE_LIMIT_SECS),
        }
    }
}

impl AccessPolicy {
    /// Windows too large for a `Duration` saturate to `Duration::MAX`
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            min_eth_for_premium: config.min_eth_for_premium,
            rate_limit: Duration::try_seconds(config.rate_limit_secs).unwrap_or(Duration::MAX),
        }
    }

    /// True when the call must return the previous state without querying.
    /// Only an active premium state is rate limited.
    pub fn within_rate_limit(&self, now: DateTime<Utc>, state: &AccessState) -> bool {
        state.premium_active && now.signed_duration_since(state.last_check) < self.rate_limit
    }
}

/// Check the balance (unless rate limited) and return the next access state.
///
/// On success the sink gets one latest-operation entry, on failure one alert,
/// both under the `Wallet` component. A rate-limited call touches nothing.
pub async fn check_and_update_access<B, S>(
    now: DateTime<Utc>,
    previous: AccessState,
    address: &str,
    policy: &AccessPolicy,
    source: &B,
    sink: &mut S,
) -> AccessState
where
    B: BalanceSource + ?Sized,
    S: StatusSink + ?Sized,
{
    if policy.within_rate_limit(now, &previous) {
        debug!(
            "Skipping balance check for {} (last check {}s ago)",
            address,
            now.signed_duration_since(previous.last_check).num_seconds()
        );
        return previous;
    }

    match source.fetch_balance(address).await {
        Ok(reading) => {
            let premium_active =
                AccessLevel::from_balance(reading.amount, policy.min_eth_for_premium).is_premium();

            debug!(
                "Balance for {}: {} ETH (threshold {} ETH, premium: {})",
                address,
                format_eth(reading.amount),
                policy.min_eth_for_premium,
                premium_active
            );

            sink.set_status(WALLET_COMPONENT, STATUS_ONLINE);
            sink.set_latest_operation(
                WALLET_COMPONENT,
                &format!("Etherscan ETH balance check: {} ETH", format_eth(reading.amount)),
            );

            AccessState {
                premium_active,
                last_check: now,
                last_balance: reading.amount,
            }
        }
        Err(e) => {
            warn!("Balance check for {} failed ({}): {}", address, e.kind(), e);

            sink.set_status(WALLET_COMPONENT, STATUS_ERROR);
            sink.append_alert(WALLET_COMPONENT, &e.to_string());

            // Fail closed: keep the previous gate, but still respect the rate limit
            AccessState {
                last_check: now,
                ..previous
            }
        }
    }
}
