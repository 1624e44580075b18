use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::InvalidRange;

/// Longest window, in days between start and end, a historic-max query may span.
pub const MAX_WINDOW_DAYS: i64 = 90;

/// One ingested quote. Immutable once written.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceSample {
    pub id: i64,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// Persisted min/max for one calendar day.
#[derive(Clone, Debug, PartialEq)]
pub struct DailySummary {
    pub id: i64,
    pub day: NaiveDate,
    pub min_price: f64,
    pub max_price: f64,
}

/// Inclusive, validated day window for historic-max queries.
///
/// Construction is the only validation point: a `DayRange` always has
/// `start <= end` and spans at most [`MAX_WINDOW_DAYS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidRange> {
        if start > end {
            return Err(InvalidRange::StartAfterEnd { start, end });
        }

        let days = (end - start).num_days();
        if days > MAX_WINDOW_DAYS {
            return Err(InvalidRange::SpanTooLong {
                start,
                end,
                days,
                max: MAX_WINDOW_DAYS,
            });
        }

        Ok(Self { start, end })
    }

    /// The `days`-long window ending at `end`, i.e. `[end - days, end]`.
    pub fn trailing(end: NaiveDate, days: i64) -> Result<Self, InvalidRange> {
        Self::new(end - Duration::days(days), end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn parse_day_key(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
}
