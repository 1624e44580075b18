//! Price ingestion job.
//!
//! Periodically pulls the current quote from the upstream API and feeds it
//! to the summary engine, which this job owns exclusively. Ticks run one at
//! a time, so the engine never sees concurrent writes.
//!
//! Data flow:
//! PriceSource → PriceFetcher → SummaryEngine → stores (+ detached alert)

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, instrument, warn};

use crate::error::AppError;
use crate::market::PriceSource;
use crate::metrics::counters::{Counters, bump};
use crate::notify::Notifier;
use crate::summary::alert::DipPolicy;
use crate::summary::engine::{IngestOutcome, SummaryEngine};

pub const ALERT_SUBJECT: &str = "Bitcoin price alert";

/// Where dip alerts go.
#[derive(Clone)]
pub struct AlertRoute {
    pub notifier: Arc<dyn Notifier>,
    pub destination: String,
}

pub struct PriceFetcher {
    source: Arc<dyn PriceSource>,
    engine: SummaryEngine,
    alerts: Option<AlertRoute>,

    /// Whether the last evaluated state was already a dip. Alerts fire on the
    /// transition into a dip, not on every tick spent inside one.
    in_dip: bool,

    counters: Counters,
}

impl PriceFetcher {
    pub fn new(source: Arc<dyn PriceSource>, engine: SummaryEngine, counters: Counters) -> Self {
        Self {
            source,
            engine,
            alerts: None,
            in_dip: false,
            counters,
        }
    }

    pub fn with_alerts(mut self, route: AlertRoute) -> Self {
        self.alerts = Some(route);
        self
    }

    pub fn engine(&self) -> &SummaryEngine {
        &self.engine
    }

    /// One ingestion tick. Returns `None` when the quote could not be fetched.
    #[instrument(skip(self), target = "fetcher")]
    pub async fn tick(&mut self) -> Result<Option<IngestOutcome>, AppError> {
        let price = match self.source.fetch_price().await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "failed to fetch bitcoin price; will retry next tick");
                bump(&self.counters.fetch_failures);
                return Ok(None);
            }
        };

        let outcome = self.engine.update_price(price).await?;
        if matches!(outcome, IngestOutcome::Rejected | IngestOutcome::StoreFailed) {
            // Cache was not updated with this quote; leave alert state as it was.
            return Ok(Some(outcome));
        }
        info!(price, ?outcome, "bitcoin price ingested");

        let dipping = self.engine.should_alert();
        if dipping && !self.in_dip {
            self.dispatch_alert();
        }
        self.in_dip = dipping;

        Ok(Some(outcome))
    }

    /// Runs ticks every `every` until `shutdown` flips or an invalid-range fault surfaces.
    pub async fn run(
        mut self,
        every: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), AppError> {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(every_ms = every.as_millis() as u64, "price fetcher started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => {
                    info!("price fetcher stopped");
                    return Ok(());
                }
            }

            if let Err(e) = self.tick().await {
                error!(error = %e, "price fetcher aborted");
                return Err(e);
            }
        }
    }

    fn dispatch_alert(&self) {
        let Some(route) = self.alerts.clone() else {
            return;
        };
        let state = self.engine.get_cached_summary();

        let message = format!(
            "Bitcoin is trading at ${:.2}, {:.1}% below its 90-day high of ${:.2}.",
            state.current_price,
            DipPolicy::drop_pct(&state),
            state.max_historic_price
        );

        warn!(
            current_price = state.current_price,
            max_historic_price = state.max_historic_price,
            "price dip detected; dispatching alert"
        );
        bump(&self.counters.alerts_dispatched);

        // Detached: delivery latency or failure never reaches the ingestion path.
        tokio::spawn(async move {
            route
                .notifier
                .send(&message, ALERT_SUBJECT, &route.destination)
                .await;
        });
    }
}
