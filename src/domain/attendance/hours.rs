//! Elapsed time between entry and exit, in hours with two decimals.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const SECONDS_PER_HOUR: i64 = 3600;

/// `(exit - entry)` in seconds divided by 3600, rounded half away from zero
/// to two decimals. An exit before the entry yields zero.
pub fn elapsed_hours(entry: DateTime<Utc>, exit: DateTime<Utc>) -> f64 {
    let seconds = (exit - entry).num_seconds().max(0);
    let hours = Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR);
    hours
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, h, m, s).unwrap()
    }

    #[test]
    fn full_shift_is_eight_hours() {
        assert_eq!(elapsed_hours(at(9, 0, 0), at(17, 0, 0)), 8.00);
    }

    #[test]
    fn rounds_to_two_decimals() {
        // 20 minutes = 0.3333.. h
        assert_eq!(elapsed_hours(at(9, 0, 0), at(9, 20, 0)), 0.33);
        // 40 minutes = 0.6666.. h
        assert_eq!(elapsed_hours(at(9, 0, 0), at(9, 40, 0)), 0.67);
        // 18 seconds = 0.005 h, midpoint rounds up
        assert_eq!(elapsed_hours(at(9, 0, 0), at(9, 0, 18)), 0.01);
    }

    #[test]
    fn exit_before_entry_is_zero() {
        assert_eq!(elapsed_hours(at(17, 0, 0), at(9, 0, 0)), 0.0);
    }

    #[test]
    fn monotonic_in_exit_time() {
        let entry = at(8, 0, 0);
        let mut previous = 0.0;
        for minutes in (0..=24 * 60).step_by(7) {
            let h = elapsed_hours(entry, entry + Duration::minutes(minutes));
            assert!(h >= previous, "{} < {} at {} min", h, previous, minutes);
            previous = h;
        }
    }

    #[test]
    fn spans_midnight() {
        let entry = Utc.with_ymd_and_hms(2024, 5, 6, 22, 0, 0).unwrap();
        let exit = Utc.with_ymd_and_hms(2024, 5, 7, 6, 30, 0).unwrap();
        assert_eq!(elapsed_hours(entry, exit), 8.5);
    }
}
