//! Faucet client binary

use chrono::Utc;
use clap::{Parser, Subcommand};
use faucet_client::explorer::address_url;
use faucet_client::format::{format_balance, format_time, format_token_amount};
use faucet_client::{
    is_valid_address, normalize_address, project, short_address, ClaimAttempt, ClaimHistory, ClaimSession,
    ClientConfig, FaucetApi, HttpFaucetApi, SessionSnapshot, SharedApi, DEFAULT_HISTORY_LIMIT,
    DEFAULT_RECENT_LIMIT,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const STATUS_WAIT: Duration = Duration::from_secs(15);

/// Faucet client CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Absolute API origin (the `/api/faucet` suffix is appended)
    #[arg(long)]
    api_url: Option<String>,

    /// Per-address status refresh period (seconds)
    #[arg(long)]
    status_refresh: Option<u64>,

    /// Faucet info refresh period (seconds)
    #[arg(long)]
    info_refresh: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show faucet status
    Info,
    /// Check whether an address may claim
    Status { address: String },
    /// Claim tokens for an address
    Claim { address: String },
    /// Follow an address live until Ctrl+C
    Watch {
        address: String,
        /// Claim once the address becomes eligible
        #[arg(long)]
        claim: bool,
    },
    /// Claim history of an address
    History {
        address: String,
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
    /// Most recent claims across all addresses
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.debug, args.log_json);

    // Load configuration
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env(),
    };

    // Override with CLI arguments
    if let Some(url) = args.api_url {
        config.api_url = Some(url);
    }

    if let Some(secs) = args.status_refresh {
        config.status_refresh_secs = secs;
    }

    if let Some(secs) = args.info_refresh {
        config.info_refresh_secs = secs;
    }

    info!("API base: {}", config.request_base());

    let api: SharedApi = Arc::new(HttpFaucetApi::new(&config)?);

    match args.command {
        Command::Info => print_info(api.as_ref(), &config).await?,
        Command::Status { address } => print_status(api.as_ref(), &address).await?,
        Command::Claim { address } => claim_once(api, config, &address).await?,
        Command::Watch { address, claim } => watch(api, config, &address, claim).await?,
        Command::History { address, limit } => {
            let address = require_address(&address)?;
            let entries = api.get_claim_history(address, limit).await?;
            print_history(&entries);
        }
        Command::Recent { limit } => {
            let entries = api.get_recent_claims(limit).await?;
            print_history(&entries);
        }
    }

    Ok(())
}

fn init_tracing(debug: bool, json: bool) {
    let env_filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn require_address(raw: &str) -> anyhow::Result<&str> {
    let address = normalize_address(raw);
    if !is_valid_address(address) {
        anyhow::bail!("Enter a valid EVM address (starts with 0x, 42 characters)");
    }
    Ok(address)
}

async fn print_info(api: &dyn FaucetApi, config: &ClientConfig) -> anyhow::Result<()> {
    let info = api.get_faucet_info().await?;
    let health = if info.is_funded() { "Online" } else { "Needs refill" };

    println!("Faucet status:   {}", health);
    println!("Faucet address:  {}", short_address(&info.faucet_address));
    println!("Explorer:        {}", address_url(&info.faucet_address, info.chain_id));
    println!("Balance:         {}", format_balance(&info));
    println!(
        "Per claim:       {} {}",
        format_token_amount(Some(&info.amount_per_claim)),
        info.token_symbol
    );
    println!("Claim interval:  {}", info.claim_interval);
    println!("Network:         {} (chain id {})", config.network_name, info.chain_id);
    Ok(())
}

async fn print_status(api: &dyn FaucetApi, raw: &str) -> anyhow::Result<()> {
    let address = require_address(raw)?;
    let status = api.check_can_claim(address).await?;

    if status.can_claim {
        println!("{} can claim now", address);
    } else {
        println!(
            "{} cannot claim yet: {}",
            address,
            project(status.next_claim_time.as_deref(), Utc::now())
        );
    }
    Ok(())
}

async fn claim_once(api: SharedApi, config: ClientConfig, raw: &str) -> anyhow::Result<()> {
    let session = ClaimSession::new(api, config);
    session.refresh_info().await;
    if session.set_address(raw).await {
        wait_for_status(&session, STATUS_WAIT).await;
    }

    let attempt = session.claim().await;
    session.close();

    let snapshot = session.snapshot().await;
    match attempt {
        ClaimAttempt::Skipped(reason) => {
            println!("Claim not sent ({:?})", reason);
            if let Some(notice) = cooldown_notice_now(&snapshot) {
                println!("{}", notice);
            }
        }
        ClaimAttempt::Settled(_) => render(&snapshot),
    }
    Ok(())
}

/// Wait for the first eligibility snapshot of a freshly set address
async fn wait_for_status(session: &ClaimSession, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let snapshot = session.snapshot().await;
        if !snapshot.address_valid || snapshot.status.is_some() {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            warn!("No claim status for {} after {:?}", snapshot.address, timeout);
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

async fn watch(api: SharedApi, config: ClientConfig, raw: &str, auto_claim: bool) -> anyhow::Result<()> {
    let tick = config.countdown_tick();
    let session = ClaimSession::new(api, config);
    session.start();
    session.set_address(raw).await;

    let mut claimed = false;
    let mut last = None;
    let mut interval = tokio::time::interval(tick);

    let render_loop = async {
        loop {
            interval.tick().await;
            let snapshot = session.snapshot().await;

            if auto_claim && !claimed && snapshot.can_submit() {
                claimed = true;
                if let ClaimAttempt::Skipped(reason) = session.claim().await {
                    warn!("Claim skipped: {:?}", reason);
                }
                continue;
            }

            if last.as_ref() != Some(&snapshot) {
                render(&snapshot);
                last = Some(snapshot);
            }
        }
    };

    tokio::select! {
        _ = render_loop => {},
        _ = shutdown_signal() => {},
    }

    session.close();
    info!("Shutting down gracefully");
    Ok(())
}

fn cooldown_notice_now(snapshot: &SessionSnapshot) -> Option<String> {
    let status = snapshot.status.as_ref()?;
    if status.can_claim {
        return None;
    }
    Some(format!(
        "This address has claimed from this faucet. Please try again in {}.",
        project(status.next_claim_time.as_deref(), Utc::now())
    ))
}

fn render(snapshot: &SessionSnapshot) {
    if let Some(hint) = snapshot.address_hint() {
        println!("{}", hint);
    }

    if let Some(info) = &snapshot.info {
        println!(
            "[{}] balance {} | one claim every {}",
            snapshot.faucet_health().unwrap_or("-"),
            format_balance(info),
            info.claim_interval.to_lowercase()
        );
    }

    if snapshot.in_flight() {
        println!("Sending...");
    } else if let Some(outcome) = snapshot.outcome() {
        println!("{}", outcome.message());
        if let Some(url) = &snapshot.explorer_url {
            println!("View transaction: {}", url);
        }
    }

    if let Some(notice) = snapshot.cooldown_notice() {
        println!("{}", notice);
    } else if snapshot.can_submit() {
        println!("{} can claim now", snapshot.address);
    }
}

fn print_history(entries: &[ClaimHistory]) {
    if entries.is_empty() {
        println!("No claims yet");
        return;
    }

    for entry in entries {
        println!(
            "{}  {}  {}  {}",
            format_time(entry.created_at.as_deref().unwrap_or_default()),
            short_address(&entry.address),
            format_token_amount(Some(&entry.amount)),
            entry.tx_hash.as_deref().unwrap_or("-")
        );
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
