//! ============================================================================
//! Access Session - One viewer's gate state across refresh cycles
//! ============================================================================
//! The session owns its AccessState and status sink exclusively. The host
//! calls `refresh` on its own schedule; nothing polls in the background.
//! ============================================================================

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::controller::{check_and_update_access, AccessPolicy};
use super::types::{format_eth, AccessLevel, AccessState, WALLET_COMPONENT};
use crate::balance::BalanceSource;
use crate::config::GateConfig;
use crate::payment::PaymentRequest;
use crate::status::{ComponentStatus, SessionStatus, StatusSink};

/// Wallet status right after session start
pub const STATUS_INITIALIZED: &str = "Initialized";

/// Access gate bound to a single session
pub struct AccessSession<B, S = SessionStatus>
where
    B: BalanceSource,
    S: StatusSink,
{
    config: GateConfig,
    policy: AccessPolicy,
    source: B,
    sink: S,
    state: AccessState,
}

impl<B, S> AccessSession<B, S>
where
    B: BalanceSource,
    S: StatusSink,
{
    /// Start a locked session and announce the monitored wallet
    pub fn new(config: GateConfig, source: B, mut sink: S) -> Self {
        sink.set_status(WALLET_COMPONENT, STATUS_INITIALIZED);
        sink.set_latest_operation(
            WALLET_COMPONENT,
            &format!("Wallet initialized with address: {}", config.address),
        );

        info!(
            "Access session started for {} (premium at {} ETH, {}s rate limit)",
            config.address, config.min_eth_for_premium, config.rate_limit_secs
        );

        Self {
            policy: AccessPolicy::from_config(&config),
            config,
            source,
            sink,
            state: AccessState::new(),
        }
    }

    /// Run one controller cycle at `now` and keep the result
    pub async fn refresh(&mut self, now: DateTime<Utc>) -> AccessState {
        let previous = self.state;
        let next = check_and_update_access(
            now,
            previous,
            &self.config.address,
            &self.policy,
            &self.source,
            &mut self.sink,
        )
        .await;

        if previous.premium_active != next.premium_active {
            info!(
                "Access for {}: {:?} -> {:?} ({} ETH)",
                self.config.address,
                previous.level(),
                next.level(),
                format_eth(next.last_balance)
            );
        }

        self.state = next;
        next
    }

    pub async fn refresh_now(&mut self) -> AccessState {
        self.refresh(Utc::now()).await
    }

    pub fn state(&self) -> &AccessState {
        &self.state
    }

    pub fn level(&self) -> AccessLevel {
        self.state.level()
    }

    pub fn is_premium(&self) -> bool {
        self.state.premium_active
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn source(&self) -> &B {
        &self.source
    }

    pub fn payment_request(&self) -> PaymentRequest {
        PaymentRequest::from_config(&self.config)
    }

    /// Gate premium content - Ok if unlocked, Err with payment instructions if not
    pub fn gate_premium(&self) -> Result<()> {
        if self.state.premium_active {
            return Ok(());
        }

        Err(anyhow!(
            "Premium access required. Send at least {} ETH to {}. Current balance: {} ETH.",
            self.config.min_eth_for_premium,
            self.config.address,
            format_eth(self.state.last_balance)
        ))
    }
}

impl<B> AccessSession<B, SessionStatus>
where
    B: BalanceSource,
{
    /// Everything the display layer needs for one render
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            address: self.config.address.clone(),
            level: self.level(),
            level_name: self.level().display_name(),
            state: self.state,
            balance_formatted: format_eth(self.state.last_balance),
            wallet: self.sink.component(WALLET_COMPONENT).cloned(),
        }
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub address: String,
    pub level: AccessLevel,
    pub level_name: &'static str,
    pub state: AccessState,
    pub balance_formatted: String,
    pub wallet: Option<ComponentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::controller::{STATUS_ERROR, STATUS_ONLINE};
    use crate::access::test_support::{eth, ScriptedSource};
    use crate::balance::FetchError;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    fn session(responses: Vec<Result<crate::access::BalanceReading, FetchError>>) -> AccessSession<ScriptedSource> {
        AccessSession::new(
            GateConfig::default(),
            ScriptedSource::new(responses),
            SessionStatus::new(),
        )
    }

    #[test]
    fn test_new_session_is_locked_and_initialized() {
        let session = session(vec![]);
        assert_eq!(session.level(), AccessLevel::Locked);
        assert!(!session.state().has_checked());

        let wallet = session.sink().component(WALLET_COMPONENT).unwrap();
        assert_eq!(wallet.status, STATUS_INITIALIZED);
        assert_eq!(
            wallet.latest_operation,
            format!("Wallet initialized with address: {}", session.config().address)
        );
        assert_eq!(session.source().calls(), 0);
    }

    #[test]
    fn test_policy_follows_config() {
        let config = GateConfig {
            min_eth_for_premium: 0.5,
            rate_limit_secs: 60,
            ..GateConfig::default()
        };
        let session = AccessSession::new(config, ScriptedSource::new(vec![]), SessionStatus::new());
        assert_eq!(session.policy().min_eth_for_premium, 0.5);
        assert_eq!(session.policy().rate_limit, Duration::seconds(60));
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let mut session = session(vec![
            Ok(eth(0.0)),
            Ok(eth(0.002)),
            Err(FetchError::Network("timeout".into())),
            Ok(eth(0.0001)),
        ]);

        // Locked: every refresh re-checks
        session.refresh(t0()).await;
        assert!(!session.is_premium());
        session.refresh(t0() + Duration::seconds(5)).await;
        assert!(session.is_premium());
        assert_eq!(session.source().calls(), 2);

        // Unlocked: inside the window nothing is fetched
        session.refresh(t0() + Duration::seconds(20)).await;
        assert_eq!(session.source().calls(), 2);

        // Window elapsed, fetch fails: stays unlocked, one alert
        session.refresh(t0() + Duration::seconds(40)).await;
        assert!(session.is_premium());
        assert_eq!(session.sink().alerts(WALLET_COMPONENT).len(), 1);
        assert_eq!(session.sink().component(WALLET_COMPONENT).unwrap().status, STATUS_ERROR);

        // Failure restarted the window
        session.refresh(t0() + Duration::seconds(60)).await;
        assert_eq!(session.source().calls(), 3);

        // Funds withdrawn
        let state = session.refresh(t0() + Duration::seconds(71)).await;
        assert!(!state.premium_active);
        assert_eq!(state.last_balance, 0.0001);
        assert_eq!(session.level(), AccessLevel::Locked);
        assert_eq!(session.sink().component(WALLET_COMPONENT).unwrap().status, STATUS_ONLINE);
    }

    #[tokio::test]
    async fn test_gate_premium() {
        let mut session = session(vec![Ok(eth(0.0005)), Ok(eth(0.001))]);

        session.refresh(t0()).await;
        let err = session.gate_premium().unwrap_err().to_string();
        assert!(err.contains("Premium access required"));
        assert!(err.contains("0.001 ETH"));
        assert!(err.contains("0.000500 ETH"));

        session.refresh(t0()).await;
        assert!(session.gate_premium().is_ok());
    }

    #[tokio::test]
    async fn test_snapshot() {
        let mut session = session(vec![Ok(eth(0.002))]);
        session.refresh(t0()).await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.level, AccessLevel::Unlocked);
        assert_eq!(snapshot.level_name, "Premium Access Active");
        assert_eq!(snapshot.balance_formatted, "0.002000");
        assert_eq!(
            snapshot.wallet.unwrap().latest_operation,
            "Etherscan ETH balance check: 0.002000 ETH"
        );

        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["level"], "unlocked");
        assert_eq!(json["state"]["premium_active"], true);
    }

    #[test]
    fn test_payment_request_uses_config() {
        let session = session(vec![]);
        let request = session.payment_request();
        assert_eq!(request.address, session.config().address);
        assert_eq!(request.amount_eth, session.config().min_eth_for_premium);
    }
}
