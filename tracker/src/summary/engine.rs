//! Summary cache engine.
//!
//! Owns the in-memory view of today's running min/max and the trailing
//! historic high, and reconciles it with the Price and Summary stores on
//! every ingested sample.
//!
//! Responsibilities:
//! - Persist each raw sample before touching the cache.
//! - Detect wall-clock day rollover and rebuild the cache for the new day.
//! - Write the daily summary only when a sample widens today's range.
//! - Answer the dip-alert question from cache state alone.
//!
//! Failure model:
//! - Store failures are logged and turn the call into a no-op; the next tick retries.
//! - An invalid historic-max window is a logic fault and is returned to the caller.
//! - Cache changes are committed only after the matching store write succeeds.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use crate::error::AppError;
use crate::logger::warn_if_slow;
use crate::metrics::counters::{Counters, bump};
use crate::price::model::{DayRange, MAX_WINDOW_DAYS};
use crate::price::repository::{PriceRepository, SummaryRepository};
use crate::summary::alert::DipPolicy;
use crate::summary::cache::{SummaryCacheState, SummaryView};
use crate::time::Clock;

const STORE_WRITE_BUDGET: Duration = Duration::from_millis(50);
const STORE_QUERY_BUDGET: Duration = Duration::from_millis(200);

/// What a single `record_price` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Price was not finite and positive; nothing was written.
    Rejected,
    /// A store call failed; cache left as it was.
    StoreFailed,
    /// First sample of a new day; cache rebuilt.
    RolledOver,
    /// Sample fell outside today's range; cache and summary widened.
    Widened,
    /// Sample fell inside today's range; no summary write.
    Unchanged,
}

pub struct SummaryEngine {
    prices: Arc<dyn PriceRepository>,
    summaries: Arc<dyn SummaryRepository>,
    clock: Arc<dyn Clock>,
    policy: DipPolicy,

    /// Exclusively owned; mutated only through `&mut self`.
    state: SummaryCacheState,
    view: SummaryView,

    counters: Counters,
}

impl SummaryEngine {
    pub fn new(
        prices: Arc<dyn PriceRepository>,
        summaries: Arc<dyn SummaryRepository>,
        clock: Arc<dyn Clock>,
        policy: DipPolicy,
        current_date: NaiveDate,
    ) -> Self {
        let state = SummaryCacheState::new(current_date);

        Self {
            prices,
            summaries,
            clock,
            policy,
            state,
            view: SummaryView::new(state),
            counters: Counters::default(),
        }
    }

    pub fn with_counters(mut self, counters: Counters) -> Self {
        self.counters = counters;
        self
    }

    /// Read handle for other tasks. Always reflects the last committed state.
    pub fn view(&self) -> SummaryView {
        self.view.clone()
    }

    /// Copy of the current cache state.
    pub fn get_cached_summary(&self) -> SummaryCacheState {
        self.state
    }

    pub fn should_alert(&self) -> bool {
        self.policy.should_alert(&self.state)
    }

    pub fn policy(&self) -> DipPolicy {
        self.policy
    }

    /// Seeds the cache from storage for the clock's today.
    ///
    /// Picks up a summary row written earlier today (e.g. before a restart)
    /// and computes the trailing historic high so alerting is armed from the
    /// first tick.
    #[instrument(skip(self), target = "engine")]
    pub async fn warm_up(&mut self) -> Result<(), AppError> {
        let today = self.clock.today();
        let mut next = SummaryCacheState::new(today);

        let existing = self.summaries.get(today).await.map_err(AppError::Store)?;
        if let Some(row) = existing {
            debug!(min = row.min_price, max = row.max_price, "seeding bounds from today's summary");
            next.min_price = row.min_price;
            next.max_price = row.max_price;
        }

        next.max_historic_price = self.load_historic_max(today).await?;

        info!(
            %today,
            max_historic_price = next.max_historic_price,
            tracking = next.is_tracking(),
            "summary cache warmed up"
        );

        self.commit(next);
        Ok(())
    }

    /// Ingests a price stamped with the clock's current time.
    pub async fn update_price(&mut self, price: f64) -> Result<IngestOutcome, AppError> {
        let now = self.clock.now();
        self.record_price(price, now).await
    }

    /// Persists one sample and reconciles the cache with storage.
    ///
    /// Only `AppError::InvalidRange` is returned; every store failure is
    /// logged and reported as `IngestOutcome::StoreFailed`.
    #[instrument(skip(self), target = "engine", fields(cached_date = %self.state.current_date))]
    pub async fn record_price(
        &mut self,
        price: f64,
        sample_time: DateTime<Utc>,
    ) -> Result<IngestOutcome, AppError> {
        if !price.is_finite() || price <= 0.0 {
            warn!("rejecting non-positive or non-finite price");
            bump(&self.counters.samples_rejected);
            return Ok(IngestOutcome::Rejected);
        }

        let inserted = warn_if_slow("db_insert_price", STORE_WRITE_BUDGET, async {
            self.prices.insert(price, sample_time).await
        })
        .await;

        if let Err(e) = inserted {
            return Ok(self.store_failed("insert price", e));
        }
        bump(&self.counters.samples_ingested);

        // Rollover follows the wall clock, not the sample timestamp.
        let today = self.clock.today();

        if self.state.current_date < today {
            return self.roll_over(price, today).await;
        }

        if !self.state.is_outside_bounds(price) {
            let mut next = self.state;
            next.current_price = price;
            self.commit(next);
            return Ok(IngestOutcome::Unchanged);
        }

        let next = self.state.widened(price);
        if let Err(e) = self.write_summary(price, today).await {
            return Ok(self.store_failed("widen summary", e));
        }

        debug!(
            min = next.min_price,
            max = next.max_price,
            max_historic_price = next.max_historic_price,
            "today's range widened"
        );

        self.commit(next);
        Ok(IngestOutcome::Widened)
    }

    /// Highest daily max over `[start, end]`, validated before any I/O.
    pub async fn historic_max(&self, start: NaiveDate, end: NaiveDate) -> Result<f64, AppError> {
        let range = DayRange::new(start, end)?;

        let max = warn_if_slow("db_max_of_max_price", STORE_QUERY_BUDGET, async {
            self.summaries.max_of_max_price(&range).await
        })
        .await
        .map_err(AppError::Store)?;

        Ok(max.unwrap_or(0.0))
    }

    async fn roll_over(&mut self, price: f64, today: NaiveDate) -> Result<IngestOutcome, AppError> {
        info!(from = %self.state.current_date, to = %today, "day rollover");

        if let Err(e) = self.write_summary(price, today).await {
            return Ok(self.store_failed("open new day summary", e));
        }

        let historic = match self.load_historic_max(today).await {
            Ok(v) => v,
            Err(AppError::Store(e)) => {
                // Cache stays on the old day so the next tick repeats the rollover.
                return Ok(self.store_failed("recompute historic max", e));
            }
            Err(fault) => return Err(fault),
        };

        let next = self.state.rolled_over(today, price, historic.max(price));
        bump(&self.counters.rollovers);
        self.commit(next);

        Ok(IngestOutcome::RolledOver)
    }

    async fn load_historic_max(&self, today: NaiveDate) -> Result<f64, AppError> {
        let range = DayRange::trailing(today, MAX_WINDOW_DAYS)?;
        self.historic_max(range.start(), range.end()).await
    }

    async fn write_summary(&self, price: f64, day: NaiveDate) -> anyhow::Result<()> {
        warn_if_slow("db_upsert_summary", STORE_WRITE_BUDGET, async {
            self.summaries.upsert_widen(price, day).await
        })
        .await?;

        bump(&self.counters.summary_writes);
        Ok(())
    }

    fn store_failed(&self, op: &'static str, e: anyhow::Error) -> IngestOutcome {
        warn!(error = %format!("{e:#}"), op, "store call failed; skipping sample");
        bump(&self.counters.store_failures);
        IngestOutcome::StoreFailed
    }

    fn commit(&mut self, next: SummaryCacheState) {
        self.state = next;
        self.view.publish(next);
    }
}
