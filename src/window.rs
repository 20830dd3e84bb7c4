//! Calendar-day to trading-day window resolution
//!
//! Screening configs express lookbacks in calendar days (a year of history,
//! a month of reversal window). Exchanges trade roughly 21 of every 30
//! days, so a fixed ratio converts the calendar span into an expected bar
//! count, clamped to what the fetched series can actually supply.

/// Expected fraction of calendar days that are trading days
pub const TRADING_DAY_RATIO: f64 = 0.7;

/// Default minimum usable window
pub const DEFAULT_MIN_BARS: usize = 5;

/// Convert a calendar-day lookback into a usable trading-day count.
///
/// The result is always within `[min_bars, available_bars]` when
/// `available_bars >= min_bars`; with fewer bars than `min_bars` available
/// the whole series is returned, which callers must treat as a data-starved
/// (and therefore unreliable) window.
pub fn resolve(calendar_days: usize, available_bars: usize, min_bars: usize) -> usize {
    let estimated = (calendar_days as f64 * TRADING_DAY_RATIO).floor() as usize;
    estimated.max(min_bars).min(available_bars)
}

/// `resolve` with the default floor of [`DEFAULT_MIN_BARS`]
pub fn resolve_default(calendar_days: usize, available_bars: usize) -> usize {
    resolve(calendar_days, available_bars, DEFAULT_MIN_BARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_year_resolves_to_trading_days() {
        // 365 calendar days ~ 255 trading days, clamped by availability
        assert_eq!(resolve(365, 500, 5), 255);
        assert_eq!(resolve(365, 200, 5), 200);
    }

    #[test]
    fn test_floor_applied_when_starved() {
        assert_eq!(resolve(3, 100, 5), 5);
    }

    #[test]
    fn test_clamped_to_available() {
        assert_eq!(resolve(30, 10, 5), 10);
        // fewer bars than the floor: whole series
        assert_eq!(resolve(30, 3, 5), 3);
    }

    #[test]
    fn test_zero_available() {
        assert_eq!(resolve(30, 0, 5), 0);
    }

    proptest! {
        #[test]
        fn prop_resolve_within_bounds(
            calendar_days in 0usize..5000,
            available in 0usize..5000,
            min_bars in 1usize..50,
        ) {
            let resolved = resolve(calendar_days, available, min_bars);
            prop_assert!(resolved <= available);
            if available >= min_bars {
                prop_assert!(resolved >= min_bars);
            } else {
                prop_assert_eq!(resolved, available);
            }
        }

        #[test]
        fn prop_resolve_monotonic_in_calendar_days(
            days in 0usize..5000,
            available in 100usize..5000,
        ) {
            let a = resolve(days, available, 5);
            let b = resolve(days + 30, available, 5);
            prop_assert!(b >= a);
        }
    }
}
