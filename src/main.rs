use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use arbx_rs::bot::ArbitrageBot;
use arbx_rs::config::Settings;
use arbx_rs::engine::matcher::OpportunityMatcher;
use arbx_rs::market_data::adapters::{build_adapters, http_client};
use arbx_rs::market_data::router::SnapshotSynchronizer;
use arbx_rs::notify::build_notifier;
use arbx_rs::telemetry;

#[derive(Debug, Parser)]
#[command(name = "arbx", version, about = "Cross-venue order book arbitrage scanner")]
struct Cli {
    /// Settings file (TOML). Missing files are skipped, ARBX__* variables still apply.
    #[arg(short, long, default_value = "config/arbx.toml")]
    config: PathBuf,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_filter: String,

    /// Run a single refresh/match cycle and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env

    let cli = Cli::parse();
    telemetry::init_tracing(&cli.log_filter);

    info!(path = %cli.config.display(), "Loading settings");
    let settings = Settings::load(&cli.config)?;
    telemetry::init_metrics(settings.metrics_port)?;

    let adapters = build_adapters(&settings).context("building venue adapters")?;
    let client = http_client(settings.fetch_timeout())?;
    let notifier = build_notifier(&settings.telegram, client)
        .await
        .context("connecting notification sink")?;

    let synchronizer = SnapshotSynchronizer::new(adapters, settings.fetch_timeout());
    let matcher = OpportunityMatcher::new(settings.matcher_config());
    let mut bot = ArbitrageBot::new(synchronizer, matcher, notifier, settings.refresh_interval());

    let shutdown = CancellationToken::new();
    if cli.once {
        let summary = bot.run_cycle(&shutdown).await;
        info!(
            refreshed = summary.refresh.refreshed.len(),
            opportunities = summary.opportunities.len(),
            "Single cycle finished"
        );
        return Ok(());
    }

    tokio::spawn(watch_signals(shutdown.clone()));
    bot.run(shutdown).await;
    info!("Shutting down...");
    Ok(())
}

async fn watch_signals(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!(signal = "SIGINT", "Captured signal"),
                    _ = term.recv() => info!(signal = "SIGTERM", "Captured signal"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGTERM, only Ctrl-C stops the loop");
                let _ = tokio::signal::ctrl_c().await;
                info!(signal = "SIGINT", "Captured signal");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!(signal = "ctrl-c", "Captured signal");
    }
    shutdown.cancel();
}
