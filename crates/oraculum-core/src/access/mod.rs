//! ============================================================================
//! Access Module - Balance-gated premium access for OraculumX
//! ============================================================================
//! Premium signals unlock once the payment wallet holds at least
//! `MIN_ETH_FOR_PREMIUM` ETH.
//!
//! ## States
//! - **Locked**: threshold not met (or never checked); re-checked on every refresh
//! - **Unlocked**: threshold met; re-checked once the rate-limit window elapses
//!
//! Fetch failures keep the previous state (fail closed) and raise an alert.
//!
//! ## Usage
//! ```rust,ignore
//! use oraculum_core::access::AccessSession;
//!
//! let mut session = AccessSession::new(config, client, SessionStatus::new());
//! let state = session.refresh_now().await;
//! session.gate_premium()?;
//! ```
//! ============================================================================

mod controller;
mod session;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export public types
pub use controller::{check_and_update_access, AccessPolicy, STATUS_ERROR, STATUS_ONLINE};
pub use session::{AccessSession, SessionSnapshot, STATUS_INITIALIZED};
pub use types::{
    eth_to_wei, format_eth, wei_to_eth, AccessLevel, AccessState, BalanceReading,
    MIN_ETH_FOR_PREMIUM, RATE_LIMIT_SECS, WALLET_COMPONENT, WEI_PER_ETH,
};
