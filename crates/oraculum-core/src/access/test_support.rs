//! Scripted balance source for controller and session tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::types::{eth_to_wei, BalanceReading};
use crate::balance::{BalanceSource, FetchError};

/// Reading of exactly `amount` ETH
pub fn eth(amount: f64) -> BalanceReading {
    BalanceReading {
        address: String::new(),
        wei: eth_to_wei(amount),
        amount,
        observed_at: Utc::now(),
    }
}

/// Replays queued responses in order and counts queries
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<BalanceReading, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<BalanceReading, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceSource for ScriptedSource {
    async fn fetch_balance(&self, address: &str) -> Result<BalanceReading, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(mut reading)) => {
                reading.address = address.to_string();
                Ok(reading)
            }
            Some(Err(e)) => Err(e),
            None => Err(FetchError::Network("no scripted response left".into())),
        }
    }
}
