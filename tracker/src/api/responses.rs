use chrono::NaiveDate;
use serde::Serialize;

use crate::price::model::{DailySummary, PriceSample, day_key};

#[derive(Debug, Serialize, PartialEq)]
pub struct PriceResponse {
    pub id: i64,
    pub price: f64,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub timestamp: String,
}

impl From<PriceSample> for PriceResponse {
    fn from(s: PriceSample) -> Self {
        Self {
            id: s.id,
            price: s.price,
            timestamp: s.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SummaryResponse {
    pub id: i64,
    pub max_price: f64,
    pub min_price: f64,
    /// `YYYY-MM-DD`.
    pub date: String,
}

impl SummaryResponse {
    /// Zero-valued body returned for a day with no summary row.
    pub fn placeholder(day: NaiveDate) -> Self {
        Self {
            id: 0,
            max_price: 0.0,
            min_price: 0.0,
            date: day_key(day),
        }
    }
}

impl From<DailySummary> for SummaryResponse {
    fn from(s: DailySummary) -> Self {
        Self {
            id: s.id,
            max_price: s.max_price,
            min_price: s.min_price,
            date: day_key(s.day),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}
