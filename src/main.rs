//! Spreadbot - order-book versus pool arbitrage monitor
//!
//! Polls resting 0x bids on a fixed cadence, prices each one against the
//! Uniswap V2 pool rate and settles profitable fills through the deployed
//! bot contract.

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spreadbot::arbitrage::ArbitrageMonitor;
use spreadbot::chain::AlloyGateway;
use spreadbot::config::AccountConfig;
use spreadbot::scheduler::IntervalScheduler;
use spreadbot::scrapers::ZeroExOrderbook;

#[derive(Parser, Debug)]
#[command(name = "spreadbot")]
#[command(about = "Order-book versus pool arbitrage monitor")]
struct Args {
    /// Account config file (JSON, or TOML by extension)
    #[arg(long, env = "SPREADBOT_CONFIG", default_value = "./AccountConfig.json")]
    config: PathBuf,

    /// Price gas but never submit settlements
    #[arg(long, env = "SPREADBOT_DRY_RUN")]
    dry_run: bool,

    /// Override the configured tick interval
    #[arg(long, env = "SPREADBOT_INTERVAL_MS")]
    interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let args = Args::parse();

    let mut config = AccountConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    if args.dry_run {
        config.bot.dry_run = true;
    }
    if let Some(ms) = args.interval_ms {
        anyhow::ensure!(ms > 0, "--interval-ms must be > 0");
        config.bot.interval = Duration::from_millis(ms);
    }

    info!("🚀 Spreadbot starting");
    info!(
        interval_ms = config.bot.interval.as_millis() as u64,
        dry_run = config.bot.dry_run,
        base = %config.bot.base_token,
        quote = %config.bot.quote_token,
        "Configuration loaded"
    );

    let chain = Arc::new(AlloyGateway::connect(&config).await?);
    let orderbook = Arc::new(ZeroExOrderbook::from_config(&config)?);
    let monitor = Arc::new(ArbitrageMonitor::new(
        orderbook,
        chain,
        config.monitor_config(),
    ));

    let tick_monitor = monitor.clone();
    let scheduler = IntervalScheduler::new(config.bot.interval, move || {
        let monitor = tick_monitor.clone();
        async move {
            if let Err(e) = monitor.run().await {
                error!("Tick failed: {}", e);
            }
        }
    });

    info!("✅ Monitoring started (Ctrl-C to stop)");

    tokio::signal::ctrl_c().await.ok();
    info!("Shutdown signal received");
    scheduler.stop();

    if let Err(e) = scheduler.join().await {
        error!("Scheduler task failed: {}", e);
    }
    info!(ticks = monitor.run_count(), "👋 Spreadbot stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spreadbot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    let _ = dotenv();

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let repo_env = manifest_dir.join(".env");
    if repo_env.exists() {
        let _ = dotenv::from_path(&repo_env);
    }
}
