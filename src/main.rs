//! Two-Venue Arbitrage Bot
//!
//! Main entry point. Subscribes to Swap logs on both venue pairs and runs
//! the event coordinator: every swap re-prices both pools, and a large
//! enough divergence is settled through the arbitrage contract.
//!
//! Startup:
//! - Load `.env` + TOML settings (`--env-file`, `--config`)
//! - Connect over WebSocket (signer wallet attached when PRIVATE_KEY is set)
//! - Read token metadata, resolve both pairs, read the current block
//! - Spawn one Swap subscription per venue, run the coordinator
//!
//! Shutdown: SIGINT/SIGTERM abort the subscriptions; the coordinator
//! finishes any in-flight run and exits. If both subscriptions give up
//! without a signal, the process exits with an error.
//!
//! Created: 2026-10-18

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::StreamExt;
use pairarb_bot::arbitrage::{
    ContractExecutor, EventCoordinator, ExecutionState, Pipeline, ProfitabilityEstimator,
};
use pairarb_bot::config::{load_config_from_file, BotConfig, DEFAULT_ENV_FILE, DEFAULT_SETTINGS_FILE};
use pairarb_bot::contracts::IERC20;
use pairarb_bot::journal::TradeJournal;
use pairarb_bot::rate;
use pairarb_bot::types::{Token, TokenPair, VenueId};
use pairarb_bot::venue::{SwapSubscription, V2Venue, VenuePair};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Swap signals buffered between the subscriptions and the coordinator
const SIGNAL_CHANNEL_CAPACITY: usize = 256;

/// Two-venue V2 AMM arbitrage bot
#[derive(Parser)]
#[command(name = "pairarb-bot")]
struct Args {
    /// Environment file (RPC_URL, PRIVATE_KEY, ARB_FOR, ARB_AGAINST)
    #[arg(long, env = "ENV_FILE", default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// TOML settings file
    #[arg(short, long, env = "ARB_CONFIG", default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,

    /// Never submit trades, regardless of settlement.execution_enabled
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.log_json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }

    info!("Two-venue arbitrage bot starting...");

    let config = load_config_from_file(&args.env_file, &args.config)
        .with_context(|| format!("Failed to load configuration ({})", args.config.display()))?
        .with_dry_run(args.dry_run);

    info!("Configuration loaded from {} + {}", args.env_file.display(), args.config.display());
    info!("RPC URL: {}", config.rpc_url_preview());
    info!("Venues: {} (A) / {} (B)", config.venue_a.name, config.venue_b.name);
    info!(
        "Strategy: cooldown={}s min_profit={} safety_divisor={}",
        config.cooldown.as_secs(),
        config.min_profit,
        config.safety_divisor
    );
    if config.execution_enabled {
        warn!("⚠️ Execution ENABLED - trades will be submitted to {:?}", config.settlement);
    } else {
        info!("Execution disabled - opportunities are logged only");
    }

    let ws = WsConnect::new(&config.rpc_url);
    match config.private_key.as_deref() {
        Some(key) => {
            let signer: PrivateKeySigner = key.trim().parse().context("Invalid PRIVATE_KEY")?;
            info!("Signer: {:?}", signer.address());
            let provider = ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_ws(ws)
                .await
                .context("WebSocket connect failed")?;
            run(Arc::new(provider), config).await
        }
        None => {
            let provider = ProviderBuilder::new()
                .connect_ws(ws)
                .await
                .context("WebSocket connect failed")?;
            run(Arc::new(provider), config).await
        }
    }
}

async fn read_token<P: Provider + 'static>(provider: &Arc<P>, address: Address) -> Result<Token> {
    let erc20 = IERC20::new(address, provider.clone());
    let decimals = erc20
        .decimals()
        .call()
        .await
        .with_context(|| format!("decimals() failed for {:?}", address))?;
    let symbol = erc20
        .symbol()
        .call()
        .await
        .with_context(|| format!("symbol() failed for {:?}", address))?;
    Ok(Token::new(address, symbol, decimals))
}

async fn run<P: Provider + 'static>(provider: Arc<P>, config: BotConfig) -> Result<()> {
    let start_block = provider
        .get_block_number()
        .await
        .context("Failed to get block number")?;
    info!("Connected! Current block: {}", start_block);

    let pair = TokenPair::new(
        read_token(&provider, config.funding_token).await?,
        read_token(&provider, config.intermediate_token).await?,
    );
    info!(
        "Pair: {} | {} ({} dec) / {} ({} dec)",
        pair.symbol(),
        pair.funding.symbol,
        pair.funding.decimals,
        pair.intermediate.symbol,
        pair.intermediate.decimals
    );

    let venue_a = V2Venue::connect(
        VenueId::A,
        config.venue_a.name.clone(),
        provider.clone(),
        config.venue_a.endpoints,
        pair.clone(),
    )
    .await?;
    let venue_b = V2Venue::connect(
        VenueId::B,
        config.venue_b.name.clone(),
        provider.clone(),
        config.venue_b.endpoints,
        pair.clone(),
    )
    .await?;
    let pair_a = venue_a.pair_address();
    let pair_b = venue_b.pair_address();

    let reference_rate = rate::from_settings(&config.reference_rate)?;
    let estimator = ProfitabilityEstimator::new(config.safety_divisor, config.min_profit, reference_rate);
    let executor = ContractExecutor::new(provider.clone(), config.settlement, pair.clone(), config.gas_limit);

    let pipeline = Pipeline::new(
        VenuePair::new(Arc::new(venue_a), Arc::new(venue_b)),
        pair,
        estimator,
        Arc::new(executor),
        config.execution_enabled,
    );
    let mut coordinator = EventCoordinator::new(pipeline, ExecutionState::new(config.cooldown, start_block));
    if let Some(dir) = &config.journal_dir {
        coordinator = coordinator.with_journal(TradeJournal::new(dir)?);
        info!("Journal: {}", dir.display());
    }

    // Subscriptions own the only senders: aborting them closes the channel
    let (tx, rx) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);
    let subscriptions = [(VenueId::A, pair_a), (VenueId::B, pair_b)].map(|(venue, address)| {
        let subscription = SwapSubscription::new(venue, address, provider.clone(), tx.clone());
        tokio::spawn(async move {
            if let Err(e) = subscription.run().await {
                error!("{} subscription stopped: {:#}", venue, e);
            }
        })
    });
    drop(tx);

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handlers")?;
    let signals_handle = signals.handle();
    let aborts: Vec<_> = subscriptions.iter().map(|h| h.abort_handle()).collect();
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    let signal_task = tokio::spawn(async move {
        if let Some(sig) = signals.next().await {
            info!("Received signal {} - shutting down after the in-flight run", sig);
            shutdown_flag.store(true, Ordering::SeqCst);
            for abort in &aborts {
                abort.abort();
            }
        }
    });

    info!("Waiting for swaps...");
    coordinator.run(rx).await;

    signals_handle.close();
    signal_task.abort();

    if !shutdown.load(Ordering::SeqCst) {
        bail!("Swap subscriptions ended without a shutdown signal");
    }
    info!("Shutdown complete");
    Ok(())
}
