// ============================================================================
// oraculum - premium access gate host for the OraculumX dashboard
// ============================================================================
// Usage:
//   oraculum check [--json] [--require-premium]   One balance check
//   oraculum watch [--interval 30] [--json]       Refresh loop until Ctrl-C
//   oraculum payment [--json]                     Show payment instructions
// ============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use oraculum_core::{
    AccessSession, EtherscanClient, GateConfig, PaymentRequest, SessionStatus, WALLET_COMPONENT,
};
use std::time::Duration;
use tracing::{info, warn};

type Session = AccessSession<EtherscanClient, SessionStatus>;

/// OraculumX premium access gate
#[derive(Parser)]
#[command(name = "oraculum", version, about = "Check and watch OraculumX premium access")]
struct Cli {
    /// Wallet address to monitor (default: ORACULUM_ETH_ADDRESS or the built-in payment wallet)
    #[arg(long, global = true)]
    address: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one balance check and print the access state
    Check {
        /// Print the session snapshot as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error when premium access is not active
        #[arg(long)]
        require_premium: bool,
    },

    /// Refresh the access state on an interval until Ctrl-C
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value = "30")]
        interval: u64,

        /// Print one JSON snapshot per refresh
        #[arg(long)]
        json: bool,
    },

    /// Show how to unlock premium access
    Payment {
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("oraculum=info".parse()?)
                .add_directive("oraculum_core=debug".parse()?),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Loads .env before the subscriber reads RUST_LOG
    let mut config = GateConfig::load().context("Failed to load configuration")?;
    init_tracing()?;

    if let Some(address) = cli.address {
        config.address = address;
    }
    config.validate().context("Invalid configuration")?;

    if config.api_key.is_none() {
        warn!("ETHERSCAN_API_KEY not set - balance checks will fail and access stays locked");
    }

    match cli.command {
        Commands::Check {
            json,
            require_premium,
        } => cmd_check(config, json, require_premium).await,
        Commands::Watch { interval, json } => cmd_watch(config, interval, json).await,
        Commands::Payment { json } => cmd_payment(&config, json),
    }
}

fn open_session(config: GateConfig) -> Result<Session> {
    let client = EtherscanClient::from_config(&config)?;
    info!("Balance source: {} (chain {})", client.api_url(), config.chain_id);
    Ok(AccessSession::new(config, client, SessionStatus::new()))
}

async fn cmd_check(config: GateConfig, json: bool, require_premium: bool) -> Result<()> {
    let mut session = open_session(config)?;
    session.refresh_now().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    } else {
        print_report(&session);
    }

    if require_premium {
        session.gate_premium()?;
    }

    Ok(())
}

async fn cmd_watch(config: GateConfig, interval_secs: u64, json: bool) -> Result<()> {
    let mut session = open_session(config)?;
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        "Watching {} every {}s (Ctrl-C to stop)",
        session.config().address,
        interval_secs.max(1)
    );

    let mut alerts_seen = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let state = session.refresh_now().await;

                if json {
                    println!("{}", serde_json::to_string(&session.snapshot())?);
                } else {
                    println!(
                        "[{}] {} | {} ETH | last check {}",
                        Utc::now().format("%H:%M:%S"),
                        state.level().display_name(),
                        oraculum_core::access::format_eth(state.last_balance),
                        format_check_time(state.last_check),
                    );
                }

                let alerts = session.sink().alerts(WALLET_COMPONENT);
                for alert in &alerts[alerts_seen..] {
                    eprintln!("  ! {}", alert);
                }
                alerts_seen = alerts.len();
            }
            _ = &mut shutdown => {
                info!("Stopping watch");
                break;
            }
        }
    }

    Ok(())
}

fn cmd_payment(config: &GateConfig, json: bool) -> Result<()> {
    let request = PaymentRequest::from_config(config);

    if json {
        let out = serde_json::json!({
            "request": request,
            "amount_wei": request.amount_wei().to_string(),
            "payment_uri": request.payment_uri(),
            "metamask_link": request.metamask_link(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("=== Unlock Premium Signals (ETH) ===");
    println!("{}", request.instructions());
    println!();
    println!("Amount:   {} ETH ({} wei)", request.amount_formatted(), request.amount_wei());
    println!("QR URI:   {}", request.payment_uri());
    println!("MetaMask: {}", request.metamask_link());
    Ok(())
}

fn print_report(session: &Session) {
    let snapshot = session.snapshot();

    println!("=== OraculumX Access Check ===");
    println!("Wallet:   {}", snapshot.address);
    println!("Balance:  {} ETH", snapshot.balance_formatted);
    println!("Access:   {}", snapshot.level_name);
    println!("Checked:  {}", format_check_time(snapshot.state.last_check));

    if let Some(wallet) = &snapshot.wallet {
        println!("Status:   {}", wallet.status);
        println!("Latest:   {}", wallet.latest_operation);
        if wallet.alerts.is_empty() {
            println!("Alerts:   none");
        } else {
            println!("Alerts:");
            for alert in &wallet.alerts {
                println!("  - {}", alert);
            }
        }
    }

    if let Err(e) = session.gate_premium() {
        println!();
        println!("{}", e);
        println!("Pay via:  {}", session.payment_request().payment_uri());
    }
}

fn format_check_time(ts: DateTime<Utc>) -> String {
    if ts == DateTime::<Utc>::MIN_UTC {
        return "never".to_string();
    }
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
