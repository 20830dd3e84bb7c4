//! Streaming technical indicators
//!
//! Pure computation over ordered numeric sequences: no I/O, no shared
//! state. Streaming structs follow the `new` / `update` / `compute`
//! pattern; windows that are not yet full yield `None` rather than a guess,
//! pushing all insufficiency handling to the caller.

use crate::series::PriceBar;
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Simple Moving Average (SMA)
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    window: usize,
    values: VecDeque<f64>,
}

impl SimpleMovingAverage {
    /// Create new SMA with given window size
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "window size must be greater than 0");
        Self {
            window,
            values: VecDeque::with_capacity(window),
        }
    }

    /// Add a value and compute current SMA
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);

        if self.values.len() > self.window {
            self.values.pop_front();
        }

        if self.values.len() == self.window {
            Some(self.values.iter().sum::<f64>() / self.window as f64)
        } else {
            None
        }
    }

    /// Compute SMA for a slice of values
    pub fn compute(window: usize, values: &[f64]) -> Vec<Option<f64>> {
        let mut sma = Self::new(window);
        values.iter().map(|&v| sma.update(v)).collect()
    }
}

/// Rolling sample standard deviation
#[derive(Debug, Clone)]
pub struct RollingStd {
    window: usize,
    values: VecDeque<f64>,
}

impl RollingStd {
    pub fn new(window: usize) -> Self {
        assert!(window > 1, "std window must be greater than 1");
        Self {
            window,
            values: VecDeque::with_capacity(window),
        }
    }

    /// Add a value and compute the current windowed std (ddof = 1)
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);

        if self.values.len() > self.window {
            self.values.pop_front();
        }

        if self.values.len() == self.window {
            Some(self.values.iter().std_dev())
        } else {
            None
        }
    }

    /// Compute rolling std for a slice of values
    pub fn compute(window: usize, values: &[f64]) -> Vec<Option<f64>> {
        let mut std = Self::new(window);
        values.iter().map(|&v| std.update(v)).collect()
    }
}

/// Exponential Moving Average (EMA)
///
/// Seeded with the first observation, so it is defined for the full series.
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    alpha: f64,
    current_ema: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Create new EMA with given smoothing span (weight = 2 / (span + 1))
    pub fn new(span: usize) -> Self {
        assert!(span > 0, "span must be greater than 0");
        Self {
            alpha: 2.0 / (span as f64 + 1.0),
            current_ema: None,
        }
    }

    /// Update with new value
    pub fn update(&mut self, value: f64) -> f64 {
        let ema = match self.current_ema {
            None => value,
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
        };
        self.current_ema = Some(ema);
        ema
    }

    /// Compute EMA for a slice of values
    pub fn compute(span: usize, values: &[f64]) -> Vec<f64> {
        let mut ema = Self::new(span);
        values.iter().map(|&v| ema.update(v)).collect()
    }

    /// Get current EMA value
    pub fn current(&self) -> Option<f64> {
        self.current_ema
    }
}

/// Average True Range (ATR)
///
/// True range per bar is `max(high - low, |high - prev_close|,
/// |low - prev_close|)`; the first bar, lacking a previous close, uses its
/// own range. ATR is the rolling mean of true range over the window.
#[derive(Debug, Clone)]
pub struct AverageTrueRange {
    prev_close: Option<f64>,
    ranges: SimpleMovingAverage,
}

impl AverageTrueRange {
    pub fn new(window: usize) -> Self {
        Self {
            prev_close: None,
            ranges: SimpleMovingAverage::new(window),
        }
    }

    /// Update with new OHLC bar values
    pub fn update(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        let tr = match self.prev_close {
            Some(pc) => (high - low).max((high - pc).abs()).max((low - pc).abs()),
            None => high - low,
        };
        self.prev_close = Some(close);
        self.ranges.update(tr)
    }

    /// Compute ATR over a bar series
    pub fn compute(window: usize, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let mut atr = Self::new(window);
        bars.iter()
            .map(|b| atr.update(b.high, b.low, b.close))
            .collect()
    }
}

/// Bollinger width: rolling_std / rolling_mean, a scale-free volatility
/// measure (zero for a perfectly flat series)
#[derive(Debug, Clone)]
pub struct BollingerWidth {
    mean: SimpleMovingAverage,
    std: RollingStd,
}

impl BollingerWidth {
    pub fn new(window: usize) -> Self {
        Self {
            mean: SimpleMovingAverage::new(window),
            std: RollingStd::new(window),
        }
    }

    /// Update with new value; `None` while the window is unfilled or the
    /// rolling mean is not positive
    pub fn update(&mut self, value: f64) -> Option<f64> {
        let mean = self.mean.update(value);
        let std = self.std.update(value);
        match (mean, std) {
            (Some(m), Some(s)) if m > 0.0 => Some(s / m),
            _ => None,
        }
    }

    /// Compute Bollinger width for a slice of values
    pub fn compute(window: usize, values: &[f64]) -> Vec<Option<f64>> {
        let mut bw = Self::new(window);
        values.iter().map(|&v| bw.update(v)).collect()
    }
}

/// Linear-interpolated quantile of a lookback window, `q` in `[0, 1]`
///
/// Matches the interpolation used by the source screening scripts
/// (position `q * (n - 1)`, linear between neighbors).
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] * (1.0 - frac) + sorted[hi] * frac)
}

/// Ordinary least-squares fit of value against index over the full slice
///
/// Returns `(slope, intercept)`; `None` for fewer than two points.
pub fn trend_slope(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let x_mean = xs.iter().mean();
    let y_mean = values.iter().mean();

    let mut num = 0.0;
    let mut den = 0.0;
    for (x, y) in xs.iter().zip(values.iter()) {
        num += (x - x_mean) * (y - y_mean);
        den += (x - x_mean) * (x - x_mean);
    }
    if den == 0.0 {
        return None;
    }
    let slope = num / den;
    Some((slope, y_mean - slope * x_mean))
}

/// Mean of the trailing `n` elements (whole slice when shorter)
pub fn trailing_mean(values: &[f64], n: usize) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let start = values.len().saturating_sub(n);
    let tail = &values[start..];
    Some(tail.iter().sum::<f64>() / tail.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    #[test]
    fn test_sma_basic() {
        let result = SimpleMovingAverage::compute(3, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_eq!(result[2], Some(2.0));
        assert_eq!(result[4], Some(4.0));
    }

    #[test]
    fn test_rolling_std_flat_is_zero() {
        let result = RollingStd::compute(5, &[7.0; 10]);
        assert_eq!(result[4], Some(0.0));
        assert_eq!(result[9], Some(0.0));
    }

    #[test]
    fn test_rolling_std_sample() {
        // sample std of [2, 4, 4, 4, 5, 5, 7, 9] = ~2.138
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = RollingStd::compute(8, &values);
        assert_relative_eq!(result[7].unwrap(), 2.138, epsilon = 1e-3);
    }

    #[test]
    fn test_ema_seeded_with_first() {
        let result = ExponentialMovingAverage::compute(5, &[10.0, 10.0, 10.0]);
        assert_eq!(result, vec![10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_ema_converges_upward() {
        let values: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let result = ExponentialMovingAverage::compute(5, &values);
        // EMA lags a rising series but follows it
        assert!(result[49] < values[49]);
        assert!(result[49] > result[10]);
    }

    fn ohlc_bar(day: u32, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close,
            high,
            low,
            close,
            1000.0,
        )
    }

    #[test]
    fn test_atr_gap_dominates() {
        // Second bar gaps up: TR = |high - prev_close| = 20 - 10 = 10
        let bars = vec![ohlc_bar(2, 11.0, 9.0, 10.0), ohlc_bar(3, 20.0, 19.0, 20.0)];
        let result = AverageTrueRange::compute(2, &bars);
        assert_eq!(result[0], None);
        assert_relative_eq!(result[1].unwrap(), (2.0 + 10.0) / 2.0);
    }

    #[test]
    fn test_bollinger_width_flat_is_zero() {
        let result = BollingerWidth::compute(20, &[50.0; 30]);
        assert_eq!(result[18], None);
        assert_eq!(result[19], Some(0.0));
        assert_eq!(result[29], Some(0.0));
    }

    #[test]
    fn test_bollinger_width_nonpositive_mean_undefined() {
        let result = BollingerWidth::compute(2, &[-1.0, -1.0, 0.0]);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_quantile_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile(&values, 0.5).unwrap(), 2.5);
        assert_relative_eq!(quantile(&values, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile(&values, 1.0).unwrap(), 4.0);
        assert_relative_eq!(quantile(&values, 0.25).unwrap(), 1.75);
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&values, 1.5), None);
    }

    #[test]
    fn test_trend_slope_decreasing() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 - 2.0 * i as f64).collect();
        let (slope, intercept) = trend_slope(&values).unwrap();
        assert_relative_eq!(slope, -2.0, epsilon = 1e-9);
        assert_relative_eq!(intercept, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_trend_slope_flat() {
        let (slope, _) = trend_slope(&[5.0; 10]).unwrap();
        assert_relative_eq!(slope, 0.0);
        assert_eq!(trend_slope(&[1.0]), None);
    }

    #[test]
    fn test_trailing_mean() {
        assert_eq!(trailing_mean(&[1.0, 2.0, 3.0, 4.0], 2), Some(3.5));
        // shorter slice than n: whole slice
        assert_eq!(trailing_mean(&[1.0, 3.0], 5), Some(2.0));
        assert_eq!(trailing_mean(&[], 3), None);
    }
}
