use chrono::{DateTime, NaiveDate, Utc};

/// Wall-clock source for the summary engine.
///
/// Day rollover is driven by the clock's `today()`, never by a sample's own timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// UTC system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
