use chrono::NaiveDate;
use thiserror::Error;

/// A historic-max query window that cannot come out of correct rollover arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidRange {
    #[error("invalid range: start {start} is after end {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    #[error("invalid range: {start}..={end} spans {days} days (max {max})")]
    SpanTooLong {
        start: NaiveDate,
        end: NaiveDate,
        days: i64,
        max: i64,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),

    #[error("store failure: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl AppError {
    pub fn is_invalid_range(&self) -> bool {
        matches!(self, AppError::InvalidRange(_))
    }
}
