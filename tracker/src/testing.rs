//! In-memory doubles for the store and clock seams, shared by unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;

use crate::price::model::{DailySummary, DayRange, PriceSample};
use crate::price::repository::{PriceRepository, SummaryRepository};
use crate::time::Clock;

/// Clock pinned to noon UTC of a settable day.
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn at(today: NaiveDate) -> Arc<Self> {
        Arc::new(Self {
            today: Mutex::new(today),
        })
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock() = today;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.today
            .lock()
            .and_hms_opt(12, 0, 0)
            .expect("noon is a valid time")
            .and_utc()
    }
}

#[derive(Default)]
pub struct InMemoryPrices {
    pub rows: Mutex<Vec<PriceSample>>,
    pub fail: AtomicBool,
    pub prune_calls: AtomicUsize,
}

impl InMemoryPrices {
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PriceRepository for InMemoryPrices {
    async fn insert(&self, price: f64, timestamp: DateTime<Utc>) -> anyhow::Result<PriceSample> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("Database Offline"));
        }
        let mut rows = self.rows.lock();
        let sample = PriceSample {
            id: rows.len() as i64 + 1,
            price,
            timestamp,
        };
        rows.push(sample.clone());
        Ok(sample)
    }

    async fn latest(&self) -> anyhow::Result<Option<PriceSample>> {
        Ok(self.rows.lock().iter().max_by_key(|r| r.timestamp).cloned())
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        self.prune_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("Database Offline"));
        }
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|r| r.timestamp >= cutoff);
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemorySummaries {
    pub rows: Mutex<BTreeMap<NaiveDate, (f64, f64)>>,
    pub upserts: Mutex<Vec<(f64, NaiveDate)>>,
    pub fail_upsert: AtomicBool,
    pub fail_query: AtomicBool,
}

impl InMemorySummaries {
    pub fn seed(&self, day: NaiveDate, min: f64, max: f64) {
        self.rows.lock().insert(day, (min, max));
    }

    pub fn upsert_count(&self) -> usize {
        self.upserts.lock().len()
    }

    pub fn row(&self, day: NaiveDate) -> Option<(f64, f64)> {
        self.rows.lock().get(&day).copied()
    }
}

#[async_trait]
impl SummaryRepository for InMemorySummaries {
    async fn get(&self, day: NaiveDate) -> anyhow::Result<Option<DailySummary>> {
        Ok(self.row(day).map(|(min, max)| DailySummary {
            id: 1,
            day,
            min_price: min,
            max_price: max,
        }))
    }

    async fn upsert_widen(&self, price: f64, day: NaiveDate) -> anyhow::Result<()> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(anyhow!("Database Offline"));
        }
        self.upserts.lock().push((price, day));
        let mut rows = self.rows.lock();
        let entry = rows.entry(day).or_insert((price, price));
        entry.0 = entry.0.min(price);
        entry.1 = entry.1.max(price);
        Ok(())
    }

    async fn max_of_max_price(&self, range: &DayRange) -> anyhow::Result<Option<f64>> {
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(anyhow!("Database Offline"));
        }
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|(day, _)| range.contains(**day))
            .map(|(_, (_, max))| *max)
            .reduce(f64::max))
    }

    async fn list_all(&self) -> anyhow::Result<Vec<DailySummary>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .enumerate()
            .map(|(i, (day, (min, max)))| DailySummary {
                id: i as i64 + 1,
                day: *day,
                min_price: *min,
                max_price: *max,
            })
            .collect())
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}
