use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::price::model::{DailySummary, DayRange, PriceSample};

/// Append-only log of raw price samples.
#[async_trait]
pub trait PriceRepository: Send + Sync {
    async fn insert(&self, price: f64, timestamp: DateTime<Utc>) -> Result<PriceSample>;

    /// Most recent sample by timestamp.
    async fn latest(&self) -> Result<Option<PriceSample>>;

    /// Deletes samples strictly older than `cutoff`; returns the number deleted.
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// One row per calendar day holding the widest observed price range.
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    async fn get(&self, day: NaiveDate) -> Result<Option<DailySummary>>;

    /// Creates the row for `day` at `[price, price]`, or widens an existing
    /// row to include `price`. Never narrows; replaying a call is a no-op.
    async fn upsert_widen(&self, price: f64, day: NaiveDate) -> Result<()>;

    /// Highest `max_price` over the inclusive window, `None` when no rows fall in it.
    async fn max_of_max_price(&self, range: &DayRange) -> Result<Option<f64>>;

    /// All rows ordered by day.
    async fn list_all(&self) -> Result<Vec<DailySummary>>;
}
