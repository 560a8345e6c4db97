use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use common::logger::init_logger;
use market::kucoin::KucoinClient;
use market::pulse::SpikeDetector;
use market::{MarketApi, PauseGate, RateLimitedClient};
use notifier::{LogNotifier, Notifier, WebhookNotifier};
use scheduler::BatchScheduler;
use watcher::cli::Cli;
use watcher::config::AppConfig;
use watcher::trigger::DailyTrigger;

/// Wires the scheduler to a concrete notifier and drives it until shutdown.
async fn serve<A: MarketApi, N: Notifier>(
    cli: &Cli,
    cfg: &AppConfig,
    client: Arc<RateLimitedClient<A>>,
    notifier: Arc<N>,
) -> anyhow::Result<()> {
    let scheduler = Arc::new(BatchScheduler::new(
        cfg.scheduler,
        client,
        cfg.lookback,
        SpikeDetector::new(cfg.spike),
        notifier,
    ));

    if cli.once {
        scheduler.run().await;
        return Ok(());
    }

    if cli.runs_at_startup() {
        let s = Arc::clone(&scheduler);
        tokio::spawn(async move {
            s.run().await;
        });
    }

    let trigger = DailyTrigger::new(cfg.daily_run_at);
    let s = Arc::clone(&scheduler);
    tokio::spawn(trigger.run(move |scheduled| {
        let s = Arc::clone(&s);
        async move {
            s.run_at(scheduled.max(Utc::now())).await;
        }
    }));

    tokio::signal::ctrl_c()
        .await
        .context("listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env().context("load configuration")?;

    init_logger("volume-watcher", cfg.json_logs);

    tracing::info!(
        api = %cfg.market_api_url,
        batch_size = cfg.scheduler.batch_size,
        concurrency = cfg.scheduler.concurrency,
        daily_run_at = %cfg.daily_run_at,
        once = cli.once,
        "Starting volume watcher..."
    );

    let api = KucoinClient::new(cfg.market_api_url.clone(), cfg.http_timeout)
        .context("build market client")?;
    let client = Arc::new(RateLimitedClient::new(
        Arc::new(api),
        PauseGate::new(),
        cfg.rate_limit_cooldown,
    ));

    match &cfg.notify_webhook_url {
        Some(url) => {
            let sink = WebhookNotifier::new(url.clone(), cfg.http_timeout)
                .context("build webhook notifier")?;
            tracing::info!(url = %sink.url(), "alerts go to webhook");
            serve(&cli, &cfg, client, Arc::new(sink)).await
        }
        None => {
            tracing::info!("no webhook configured; alerts go to the log");
            serve(&cli, &cfg, client, Arc::new(LogNotifier)).await
        }
    }
}
