//! Price bar series with construction-time validation
//!
//! A `SymbolSeries` is the per-symbol input to the criterion evaluator:
//! daily bars in strictly ascending date order, with the OHLC envelope
//! invariant checked up front so downstream indicators never see garbage.

use crate::error::{Result, ScreenError};
use crate::types::{Price, Volume};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day's open/high/low/close/volume record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
}

impl PriceBar {
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Volume,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar range (high - low)
    pub fn range(&self) -> Price {
        self.high - self.low
    }

    /// The high/low envelope must contain open and close
    pub fn is_well_formed(&self) -> bool {
        self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && [self.open, self.high, self.low, self.close].iter().all(|v| v.is_finite())
            && self.volume.is_finite()
            && self.volume >= 0.0
    }
}

/// Ordered daily bar series for one symbol
///
/// Gaps (non-trading days) are allowed and never filled. Construction
/// rejects out-of-order dates, duplicate dates, and envelope violations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolSeries {
    bars: Vec<PriceBar>,
}

impl SymbolSeries {
    /// Validate and wrap a bar sequence
    pub fn new(code: &str, bars: Vec<PriceBar>) -> Result<Self> {
        for window in bars.windows(2) {
            if window[1].date <= window[0].date {
                return Err(ScreenError::MalformedSeries {
                    symbol: code.to_string(),
                    message: format!(
                        "dates not strictly ascending: {} then {}",
                        window[0].date, window[1].date
                    ),
                });
            }
        }
        if let Some(bad) = bars.iter().find(|b| !b.is_well_formed()) {
            return Err(ScreenError::MalformedSeries {
                symbol: code.to_string(),
                message: format!("OHLC envelope violated at {}", bad.date),
            });
        }
        Ok(Self { bars })
    }

    /// Wrap bars already known to be valid (fixtures, tests)
    pub fn from_valid(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Closing prices, oldest first
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volumes, oldest first
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Highest high over the trailing `window` bars, optionally excluding
    /// the most recent `skip_last` bars
    pub fn trailing_high(&self, window: usize, skip_last: usize) -> Option<f64> {
        let end = self.bars.len().checked_sub(skip_last)?;
        let start = end.checked_sub(window.min(end))?;
        if start == end {
            return None;
        }
        self.bars[start..end]
            .iter()
            .map(|b| b.high)
            .fold(None, |acc: Option<f64>, h| Some(acc.map_or(h, |a| a.max(h))))
    }

    /// Lowest low over the trailing `window` bars
    pub fn trailing_low(&self, window: usize) -> Option<f64> {
        let end = self.bars.len();
        let start = end.saturating_sub(window);
        if start == end {
            return None;
        }
        self.bars[start..end]
            .iter()
            .map(|b| b.low)
            .fold(None, |acc: Option<f64>, l| Some(acc.map_or(l, |a| a.min(l))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bar(date: &str, close: f64) -> PriceBar {
        PriceBar::new(d(date), close, close + 1.0, close - 1.0, close, 1000.0)
    }

    #[test]
    fn test_valid_series() {
        let series =
            SymbolSeries::new("600000", vec![bar("2024-01-02", 10.0), bar("2024-01-03", 10.5)])
                .unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let result =
            SymbolSeries::new("600000", vec![bar("2024-01-02", 10.0), bar("2024-01-02", 10.5)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_descending_dates() {
        let result =
            SymbolSeries::new("600000", vec![bar("2024-01-03", 10.0), bar("2024-01-02", 10.5)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_envelope_violation() {
        // high below close
        let bad = PriceBar::new(d("2024-01-02"), 10.0, 9.5, 9.0, 10.0, 1000.0);
        let result = SymbolSeries::new("600000", vec![bad]);
        assert!(matches!(
            result,
            Err(crate::error::ScreenError::MalformedSeries { .. })
        ));
    }

    #[test]
    fn test_gaps_allowed() {
        let series =
            SymbolSeries::new("600000", vec![bar("2024-01-02", 10.0), bar("2024-01-09", 10.5)])
                .unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_trailing_high_excludes_latest() {
        let series = SymbolSeries::from_valid(vec![
            bar("2024-01-02", 10.0),
            bar("2024-01-03", 12.0),
            bar("2024-01-04", 20.0),
        ]);
        // skip the latest bar: max(high) of first two = 13.0
        assert_eq!(series.trailing_high(10, 1), Some(13.0));
        assert_eq!(series.trailing_high(10, 0), Some(21.0));
        assert_eq!(series.trailing_high(10, 3), None);
    }

    #[test]
    fn test_trailing_low() {
        let series = SymbolSeries::from_valid(vec![
            bar("2024-01-02", 10.0),
            bar("2024-01-03", 8.0),
        ]);
        assert_eq!(series.trailing_low(2), Some(7.0));
        assert_eq!(SymbolSeries::default().trailing_low(2), None);
    }
}
