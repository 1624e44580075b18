use crate::summary::cache::SummaryCacheState;

pub const DEFAULT_DIP_FRACTION: f64 = 0.1;

/// Decides whether the latest price sits far enough below the trailing
/// historic high to warrant an alert.
#[derive(Clone, Copy, Debug)]
pub struct DipPolicy {
    /// Fraction of the historic high the price must have dropped by.
    pub dip_fraction: f64,
}

impl Default for DipPolicy {
    fn default() -> Self {
        Self {
            dip_fraction: DEFAULT_DIP_FRACTION,
        }
    }
}

impl DipPolicy {
    pub fn new(dip_fraction: f64) -> Self {
        Self { dip_fraction }
    }

    /// Pure function of the cache state. Disabled until both the historic high
    /// and a current price are known; the threshold itself is inclusive.
    pub fn should_alert(&self, state: &SummaryCacheState) -> bool {
        if state.max_historic_price <= 0.0 || state.current_price <= 0.0 {
            return false;
        }

        let threshold = self.dip_fraction * state.max_historic_price;
        (state.max_historic_price - state.current_price) - threshold >= 0.0
    }

    /// Drop from the historic high, in percent of that high.
    pub fn drop_pct(state: &SummaryCacheState) -> f64 {
        if state.max_historic_price <= 0.0 {
            return 0.0;
        }
        (state.max_historic_price - state.current_price) / state.max_historic_price * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn state(historic: f64, current: f64) -> SummaryCacheState {
        let mut s = SummaryCacheState::new(NaiveDate::from_ymd_opt(2025, 4, 6).unwrap());
        s.max_historic_price = historic;
        s.current_price = current;
        s
    }

    #[test]
    fn threshold_is_inclusive() {
        let policy = DipPolicy::default();

        assert!(policy.should_alert(&state(1000.0, 900.0)));
        assert!(!policy.should_alert(&state(1000.0, 901.0)));
        assert!(policy.should_alert(&state(1000.0, 500.0)));
    }

    #[test]
    fn unknown_historic_high_never_alerts() {
        let policy = DipPolicy::default();

        for current in [0.0, 1.0, 50_000.0, 1e12] {
            assert!(!policy.should_alert(&state(0.0, current)));
        }
    }

    #[test]
    fn no_recorded_price_never_alerts() {
        let policy = DipPolicy::default();

        assert!(!policy.should_alert(&state(1000.0, 0.0)));
        assert!(policy.should_alert(&state(1000.0, 1.0)));
    }

    #[test]
    fn custom_fraction_moves_threshold() {
        let policy = DipPolicy::new(0.25);

        assert!(!policy.should_alert(&state(1000.0, 800.0)));
        assert!(policy.should_alert(&state(1000.0, 750.0)));
    }

    #[test]
    fn price_above_historic_high_does_not_alert() {
        assert!(!DipPolicy::default().should_alert(&state(1000.0, 1200.0)));
    }

    #[test]
    fn drop_pct_reports_distance_from_high() {
        assert_eq!(DipPolicy::drop_pct(&state(1000.0, 900.0)), 10.0);
        assert_eq!(DipPolicy::drop_pct(&state(0.0, 900.0)), 0.0);
    }
}
