use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;

/// Lower bound a day starts from before its first sample.
pub const UNSET_MIN_PRICE: f64 = 999_999_999.0;
/// Upper bound a day starts from before its first sample.
pub const UNSET_MAX_PRICE: f64 = 0.0;

/// In-memory view of "today" plus the trailing historic high.
///
/// `max_historic_price == 0.0` means the historic window is not known yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SummaryCacheState {
    pub current_date: NaiveDate,
    pub min_price: f64,
    pub max_price: f64,
    pub current_price: f64,
    pub max_historic_price: f64,
}

impl SummaryCacheState {
    /// Uninitialized-for-today state with sentinel bounds.
    pub fn new(current_date: NaiveDate) -> Self {
        Self {
            current_date,
            min_price: UNSET_MIN_PRICE,
            max_price: UNSET_MAX_PRICE,
            current_price: 0.0,
            max_historic_price: 0.0,
        }
    }

    /// True once at least one sample has been recorded for `current_date`.
    pub fn is_tracking(&self) -> bool {
        self.min_price <= self.max_price
    }

    pub fn is_outside_bounds(&self, price: f64) -> bool {
        price < self.min_price || price > self.max_price
    }

    /// State after the first sample of `day`.
    pub fn rolled_over(&self, day: NaiveDate, price: f64, max_historic_price: f64) -> Self {
        Self {
            current_date: day,
            min_price: price,
            max_price: price,
            current_price: price,
            max_historic_price,
        }
    }

    /// Widens whichever bound `price` violates and lifts the historic high with it.
    /// The first sample of a day replaces both sentinels.
    pub fn widened(&self, price: f64) -> Self {
        let mut next = *self;

        if !next.is_tracking() {
            next.min_price = price;
            next.max_price = price;
        }
        if price < next.min_price {
            next.min_price = price;
        }
        if price > next.max_price {
            next.max_price = price;
        }
        if price > next.max_historic_price {
            next.max_historic_price = price;
        }

        next.current_price = price;
        next
    }
}

/// Shared read handle over the engine's latest committed state.
///
/// Only the engine writes; every reader gets a whole-state copy.
#[derive(Clone)]
pub struct SummaryView {
    inner: Arc<RwLock<SummaryCacheState>>,
}

impl SummaryView {
    pub fn new(initial: SummaryCacheState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn get(&self) -> SummaryCacheState {
        *self.inner.read()
    }

    pub(crate) fn publish(&self, state: SummaryCacheState) {
        *self.inner.write() = state;
    }
}
