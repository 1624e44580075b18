//! Retention job: prunes raw price samples past the retention horizon.
//! Daily summaries are left alone, so historic-max queries are unaffected.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Duration as ChronoDuration;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, instrument, warn};

use crate::metrics::counters::Counters;
use crate::price::repository::PriceRepository;
use crate::time::Clock;

pub struct PriceCleaner {
    prices: Arc<dyn PriceRepository>,
    clock: Arc<dyn Clock>,
    retention_days: i64,
    counters: Counters,
}

impl PriceCleaner {
    pub fn new(
        prices: Arc<dyn PriceRepository>,
        clock: Arc<dyn Clock>,
        retention_days: i64,
        counters: Counters,
    ) -> Self {
        Self {
            prices,
            clock,
            retention_days,
            counters,
        }
    }

    /// Deletes every sample older than `retention_days` before now.
    #[instrument(skip(self), target = "cleaner", fields(retention_days = self.retention_days))]
    pub async fn prune_once(&self) -> anyhow::Result<u64> {
        let cutoff = self.clock.now() - ChronoDuration::days(self.retention_days);

        let removed = self
            .prices
            .prune_older_than(cutoff)
            .await
            .context("failed to prune price samples")?;

        self.counters
            .samples_pruned
            .fetch_add(removed, std::sync::atomic::Ordering::Relaxed);
        info!(removed, %cutoff, "pruned old bitcoin prices");

        Ok(removed)
    }

    /// Prunes every `every`, first run after one full period.
    pub async fn run(self, every: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // interval fires immediately; skip that so startup does not prune.
        ticker.tick().await;

        info!(every_secs = every.as_secs(), "price cleaner started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => {
                    info!("price cleaner stopped");
                    return;
                }
            }

            if let Err(e) = self.prune_once().await {
                warn!(error = ?e, "retention run failed; will retry next period");
            }
        }
    }
}
