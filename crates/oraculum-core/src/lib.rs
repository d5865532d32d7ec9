//! ============================================================================
//! ORACULUM-CORE: Premium Access Gate
//! ============================================================================
//! This crate handles the backend logic of the OraculumX dashboard:
//! - Rate-limited, fail-closed premium gating on an ETH balance
//! - Etherscan balance queries via reqwest
//! - Per-session status/alert sink for the display layer
//! - Payment request URIs for unlocking premium access
//! ============================================================================

pub mod access;
pub mod balance;
pub mod config;
pub mod payment;
pub mod status;

// Re-export main types for convenience
pub use access::{
    check_and_update_access, AccessLevel, AccessPolicy, AccessSession, AccessState,
    BalanceReading, SessionSnapshot, MIN_ETH_FOR_PREMIUM, WALLET_COMPONENT,
};
pub use balance::{BalanceSource, EtherscanClient, FetchError};
pub use config::{ConfigError, GateConfig};
pub use payment::PaymentRequest;
pub use status::{ComponentStatus, SessionStatus, StatusSink};
