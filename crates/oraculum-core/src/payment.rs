//! ============================================================================
//! Payment Request - What the payment panel asks the user to send
//! ============================================================================
//! Produces the QR payload and wallet deep link for unlocking premium access.
//! Rendering the QR image is left to the display layer.
//! ============================================================================

use serde::{Deserialize, Serialize};

use crate::access::{eth_to_wei, format_eth};
use crate::config::GateConfig;

const METAMASK_SEND_URL: &str = "https://metamask.app.link/send";

/// A request to send `amount_eth` to `address` on `chain_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub address: String,
    pub amount_eth: f64,
    pub chain_id: u64,
}

impl PaymentRequest {
    pub fn new(address: impl Into<String>, amount_eth: f64, chain_id: u64) -> Self {
        Self {
            address: address.into(),
            amount_eth,
            chain_id,
        }
    }

    /// Request for the premium threshold on the configured wallet
    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(config.address.clone(), config.min_eth_for_premium, config.chain_id)
    }

    pub fn amount_wei(&self) -> u128 {
        eth_to_wei(self.amount_eth)
    }

    /// QR code payload
    pub fn payment_uri(&self) -> String {
        format!("ethereum:{}?amount={}", self.address, self.amount_eth)
    }

    /// MetaMask mobile deep link with the amount in wei
    pub fn metamask_link(&self) -> String {
        format!(
            "{}/{}@{}/transfer?value={}",
            METAMASK_SEND_URL,
            self.address,
            self.chain_id,
            self.amount_wei()
        )
    }

    /// One-line instruction for banners and CLI output
    pub fn instructions(&self) -> String {
        format!(
            "Send at least {} ETH to {} (chain {})",
            self.amount_eth, self.address, self.chain_id
        )
    }

    pub fn amount_formatted(&self) -> String {
        format_eth(self.amount_eth)
    }
}
