use std::sync::Arc;

use anyhow::Context;
use btc_tracker::{
    api::{ApiServer, ApiState},
    config::AppConfig,
    db::Db,
    jobs::{AlertRoute, PriceCleaner, PriceFetcher},
    logger::init_tracing,
    market::CoinGeckoClient,
    metrics::counters::Counters,
    notify::{LogNotifier, Notifier, WebhookNotifier},
    price::{PriceRepository, SqlxPriceRepository, SqlxSummaryRepository, SummaryRepository},
    summary::{DipPolicy, SummaryEngine},
    time::{Clock, SystemClock},
};
use tokio::sync::watch;

/// Connects to the database and makes sure both tables exist.
async fn init_stores(
    cfg: &AppConfig,
) -> anyhow::Result<(Arc<dyn PriceRepository>, Arc<dyn SummaryRepository>)> {
    let db = Db::connect(&cfg.database_url).await?;
    db.migrate().await.context("schema migration failed")?;

    let prices: Arc<dyn PriceRepository> = Arc::new(SqlxPriceRepository::new(db.pool.clone()));
    let summaries: Arc<dyn SummaryRepository> = Arc::new(SqlxSummaryRepository::new(db.pool));

    Ok((prices, summaries))
}

/// Picks the alert transport. No destination means alerting is off.
fn alert_route(cfg: &AppConfig) -> anyhow::Result<Option<AlertRoute>> {
    let Some(destination) = cfg.alert_destination.clone() else {
        tracing::info!("ALERT_DESTINATION not set; dip alerts disabled");
        return Ok(None);
    };

    let notifier: Arc<dyn Notifier> = match &cfg.alert_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone()).context("build webhook client")?),
        None => Arc::new(LogNotifier),
    };

    Ok(Some(AlertRoute {
        notifier,
        destination,
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing(is_production);

    tracing::info!("Starting bitcoin price tracker...");

    let cfg = AppConfig::from_env();
    let counters = Counters::default();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (prices, summaries) = init_stores(&cfg).await?;

    let mut engine = SummaryEngine::new(
        prices.clone(),
        summaries.clone(),
        clock.clone(),
        DipPolicy::new(cfg.dip_fraction),
        clock.today(),
    )
    .with_counters(counters.clone());
    engine.warm_up().await.context("summary cache warm-up failed")?;

    let source = Arc::new(CoinGeckoClient::new(cfg.bitcoin_api_url.clone())?);
    let mut fetcher = PriceFetcher::new(source, engine, counters.clone());
    if let Some(route) = alert_route(&cfg)? {
        fetcher = fetcher.with_alerts(route);
    }

    let cleaner = PriceCleaner::new(
        prices.clone(),
        clock.clone(),
        cfg.retention_days,
        counters.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut fetcher_task = tokio::spawn(fetcher.run(cfg.fetch_interval, shutdown_rx.clone()));
    let cleaner_task = tokio::spawn(cleaner.run(cfg.retention_interval, shutdown_rx.clone()));

    let server = ApiServer::new(ApiState { prices, summaries }, cfg.allowed_origins.clone());
    let mut server_shutdown = shutdown_rx.clone();
    let addr = cfg.bind_addr();
    let server_task = tokio::spawn(async move {
        server
            .serve(&addr, async move {
                let _ = server_shutdown.changed().await;
            })
            .await
    });

    // Stop on Ctrl-C, or as soon as the fetcher gives up on an invariant violation.
    let early_exit = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutdown signal received; stopping jobs");
            None
        }
        res = &mut fetcher_task => Some(res),
    };
    let _ = shutdown_tx.send(true);

    server_task.await??;
    cleaner_task.await?;

    let fetcher_result = match early_exit {
        Some(res) => res?,
        None => fetcher_task.await?,
    };
    fetcher_result.context("price fetcher stopped on an invariant violation")?;

    Ok(())
}
