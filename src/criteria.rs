//! Screening configuration and the ordered criterion evaluator
//!
//! Historically this logic existed as a family of near-identical screening
//! scripts, each hard-coding its own thresholds. Here every variant is a
//! named `ScreeningConfig` preset feeding one evaluator: an ordered chain of
//! boolean predicates that short-circuits on the first failure, with cheap
//! guards (history length, amplitude) placed ahead of the indicator-heavy
//! checks.

use crate::indicators::{
    quantile, trailing_mean, trend_slope, AverageTrueRange, BollingerWidth,
    ExponentialMovingAverage, SimpleMovingAverage,
};
use crate::series::SymbolSeries;
use crate::types::{BoundaryMode, SymbolCode};
use crate::universe::Symbol;
use crate::window;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies one predicate in the evaluation chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PredicateId {
    MinHistory,
    Amplitude,
    Consolidation,
    VolumeConfirmation,
    Breakout,
    PriceBelowQuantile,
    PriceAboveMa,
    TrendSlope,
    /// Applied by the dispatcher, which owns the capital-flow fetch
    NetInflow,
}

impl PredicateId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredicateId::MinHistory => "min_history",
            PredicateId::Amplitude => "amplitude",
            PredicateId::Consolidation => "consolidation",
            PredicateId::VolumeConfirmation => "volume_confirmation",
            PredicateId::Breakout => "breakout",
            PredicateId::PriceBelowQuantile => "price_below_quantile",
            PredicateId::PriceAboveMa => "price_above_ma",
            PredicateId::TrendSlope => "trend_slope",
            PredicateId::NetInflow => "net_inflow",
        }
    }
}

/// Why a symbol was excluded rather than substantively failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkipCause {
    /// Fewer bars than the screen requires
    InsufficientData,
    /// Provider error while fetching history
    FetchFailure,
    /// OHLC invariant violation in the fetched bars
    MalformedSeries,
    /// Guarded arithmetic edge case (zero/negative denominator)
    Computation,
    /// Run deadline or cancellation hit before this symbol was submitted
    Cancelled,
}

/// Per-symbol evaluation verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    /// First predicate that failed on substance
    Fail(PredicateId),
    Skip(SkipCause),
}

/// Outcome for one symbol; produced exactly once per run, never mutated
#[derive(Debug, Clone, Serialize)]
pub struct CriterionOutcome {
    pub code: SymbolCode,
    pub name: String,
    pub verdict: Verdict,
    /// Indicator name -> last computed value, for every indicator computed
    /// before any short-circuit; ordered map keeps output deterministic
    pub diagnostics: BTreeMap<&'static str, f64>,
}

impl CriterionOutcome {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    pub fn skipped(symbol: &Symbol, cause: SkipCause) -> Self {
        Self {
            code: symbol.code.clone(),
            name: symbol.name.clone(),
            verdict: Verdict::Skip(cause),
            diagnostics: BTreeMap::new(),
        }
    }
}

/// How a windowed series of values is reduced to one number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reduce {
    Max,
    Mean,
}

/// Low-volatility (sideways action) requirement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationRule {
    /// Bollinger window in bars
    pub window: usize,
    /// Trailing sub-window of width values to reduce over
    pub trailing: usize,
    pub reduce: Reduce,
    /// Reduced width must stay strictly below this ceiling
    pub ceiling: f64,
}

impl Default for ConsolidationRule {
    fn default() -> Self {
        Self {
            window: 20,
            trailing: 60,
            reduce: Reduce::Max,
            ceiling: 0.1,
        }
    }
}

/// Volume-divergence confirmation: short-span EMA of volume over long-span
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeRule {
    pub short_span: usize,
    pub long_span: usize,
    /// Trailing bars averaged on each EMA before comparison
    pub trailing: usize,
    /// Short mean must exceed long mean times this ratio
    pub growth_ratio: f64,
    pub boundary: BoundaryMode,
    /// Additionally require a non-negative trend of the short EMA tail
    pub require_nonneg_trend: bool,
}

impl Default for VolumeRule {
    fn default() -> Self {
        Self {
            short_span: 5,
            long_span: 20,
            trailing: 5,
            growth_ratio: 1.0,
            boundary: BoundaryMode::Inclusive,
            require_nonneg_trend: false,
        }
    }
}

/// Breakout above the trailing high by an ATR-scaled margin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakoutRule {
    pub atr_window: usize,
    pub atr_multiplier: f64,
    /// Most recent bars excluded from the trailing-high base
    pub exclude_latest: usize,
}

impl Default for BreakoutRule {
    fn default() -> Self {
        Self {
            atr_window: 14,
            atr_multiplier: 0.25,
            exclude_latest: 1,
        }
    }
}

/// "Buying low": latest close below a trailing quantile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantileRule {
    /// Lookback in calendar days
    pub lookback_days: usize,
    pub q: f64,
}

impl Default for QuantileRule {
    fn default() -> Self {
        Self {
            lookback_days: 365,
            q: 0.2,
        }
    }
}

/// "Momentum": latest close above a simple moving average
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaRule {
    pub window: usize,
}

impl Default for MaRule {
    fn default() -> Self {
        Self { window: 20 }
    }
}

/// Downtrend precondition for reversal screens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRule {
    /// Downtrend lookback in calendar days, ending before the reversal window
    pub downtrend_days: usize,
    /// Recent window (calendar days) excluded from the downtrend fit
    pub reversal_days: usize,
    /// Fitted slope must be strictly below this (negative) ceiling
    pub slope_ceiling: f64,
}

impl Default for TrendRule {
    fn default() -> Self {
        Self {
            downtrend_days: 365 * 3,
            reversal_days: 30,
            slope_ceiling: -0.0003,
        }
    }
}

/// Named, immutable parameter set for one screening run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    pub name: String,
    /// Bars below this count mark the symbol `InsufficientData`
    pub min_required_bars: usize,
    /// Calendar-day span requested from the provider
    pub history_days: usize,
    /// Calendar-day span of the box (trailing high/low) window
    pub box_window_days: usize,
    /// `(box_high - box_low) / box_low` must stay strictly below this
    pub amplitude_ceiling: Option<f64>,
    pub consolidation: Option<ConsolidationRule>,
    pub volume: Option<VolumeRule>,
    pub breakout: Option<BreakoutRule>,
    pub below_quantile: Option<QuantileRule>,
    pub above_ma: Option<MaRule>,
    pub trend: Option<TrendRule>,
    /// Predicate evaluation order; `MinHistory` is always evaluated first
    /// regardless of position
    pub order: Vec<PredicateId>,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self::consolidation_breakout()
    }
}

impl ScreeningConfig {
    /// Sideways-consolidation box breakout with volume confirmation
    pub fn consolidation_breakout() -> Self {
        Self {
            name: "consolidation_breakout".to_string(),
            min_required_bars: 250,
            history_days: 365,
            box_window_days: 365,
            amplitude_ceiling: Some(0.3),
            consolidation: Some(ConsolidationRule::default()),
            volume: Some(VolumeRule::default()),
            breakout: Some(BreakoutRule::default()),
            below_quantile: None,
            above_ma: None,
            trend: None,
            order: vec![
                PredicateId::MinHistory,
                PredicateId::Amplitude,
                PredicateId::Consolidation,
                PredicateId::VolumeConfirmation,
                PredicateId::Breakout,
            ],
        }
    }

    /// Historical-low entry: price in the bottom quantile of its range but
    /// back above its moving average on growing volume
    pub fn low_position() -> Self {
        Self {
            name: "low_position".to_string(),
            min_required_bars: 120,
            history_days: 365,
            box_window_days: 365,
            amplitude_ceiling: None,
            consolidation: Some(ConsolidationRule {
                window: 20,
                trailing: 60,
                reduce: Reduce::Mean,
                ceiling: 0.05,
            }),
            volume: Some(VolumeRule {
                require_nonneg_trend: true,
                ..VolumeRule::default()
            }),
            breakout: None,
            below_quantile: Some(QuantileRule::default()),
            above_ma: Some(MaRule::default()),
            trend: None,
            order: vec![
                PredicateId::MinHistory,
                PredicateId::PriceBelowQuantile,
                PredicateId::Consolidation,
                PredicateId::VolumeConfirmation,
                PredicateId::PriceAboveMa,
            ],
        }
    }

    /// Long-downtrend reversal: negative multi-year slope, then volume and
    /// price turning up
    pub fn trend_reversal() -> Self {
        Self {
            name: "trend_reversal".to_string(),
            min_required_bars: 120,
            history_days: 365 * 3,
            box_window_days: 365,
            amplitude_ceiling: None,
            consolidation: None,
            volume: Some(VolumeRule {
                short_span: 5,
                long_span: 10,
                trailing: 5,
                growth_ratio: 1.1,
                boundary: BoundaryMode::Exclusive,
                require_nonneg_trend: false,
            }),
            breakout: None,
            below_quantile: None,
            above_ma: Some(MaRule::default()),
            trend: Some(TrendRule::default()),
            order: vec![
                PredicateId::MinHistory,
                PredicateId::TrendSlope,
                PredicateId::VolumeConfirmation,
                PredicateId::PriceAboveMa,
            ],
        }
    }
}

/// Result of one predicate: pass, substantive fail, or a data/arithmetic
/// condition that excludes the symbol
enum PredicateCheck {
    Pass,
    Fail,
    Skip(SkipCause),
}

/// Evaluates the configured predicate chain against one symbol's series
pub struct CriterionEvaluator<'a> {
    config: &'a ScreeningConfig,
}

impl<'a> CriterionEvaluator<'a> {
    pub fn new(config: &'a ScreeningConfig) -> Self {
        Self { config }
    }

    /// Apply the ordered predicate chain, short-circuiting on the first
    /// failure. Diagnostics computed before the short-circuit are kept.
    pub fn evaluate(&self, symbol: &Symbol, series: &SymbolSeries) -> CriterionOutcome {
        let mut diagnostics = BTreeMap::new();

        // Minimum history is a data precondition, not a substantive verdict;
        // it always runs first.
        diagnostics.insert("bars", series.len() as f64);
        if series.len() < self.config.min_required_bars {
            log::debug!(
                "{}: {} bars < {} required",
                symbol.code,
                series.len(),
                self.config.min_required_bars
            );
            return CriterionOutcome {
                code: symbol.code.clone(),
                name: symbol.name.clone(),
                verdict: Verdict::Skip(SkipCause::InsufficientData),
                diagnostics,
            };
        }

        for &id in &self.config.order {
            let check = match id {
                PredicateId::MinHistory => PredicateCheck::Pass, // handled above
                PredicateId::Amplitude => self.check_amplitude(series, &mut diagnostics),
                PredicateId::Consolidation => self.check_consolidation(series, &mut diagnostics),
                PredicateId::VolumeConfirmation => self.check_volume(series, &mut diagnostics),
                PredicateId::Breakout => self.check_breakout(series, &mut diagnostics),
                PredicateId::PriceBelowQuantile => {
                    self.check_below_quantile(series, &mut diagnostics)
                }
                PredicateId::PriceAboveMa => self.check_above_ma(series, &mut diagnostics),
                PredicateId::TrendSlope => self.check_trend(series, &mut diagnostics),
                // Needs provider flow data; the dispatcher applies it
                PredicateId::NetInflow => PredicateCheck::Pass,
            };
            match check {
                PredicateCheck::Pass => {}
                PredicateCheck::Fail => {
                    log::debug!("{}: failed {}", symbol.code, id.as_str());
                    return CriterionOutcome {
                        code: symbol.code.clone(),
                        name: symbol.name.clone(),
                        verdict: Verdict::Fail(id),
                        diagnostics,
                    };
                }
                PredicateCheck::Skip(cause) => {
                    log::debug!("{}: skipped at {} ({:?})", symbol.code, id.as_str(), cause);
                    return CriterionOutcome {
                        code: symbol.code.clone(),
                        name: symbol.name.clone(),
                        verdict: Verdict::Skip(cause),
                        diagnostics,
                    };
                }
            }
        }

        CriterionOutcome {
            code: symbol.code.clone(),
            name: symbol.name.clone(),
            verdict: Verdict::Pass,
            diagnostics,
        }
    }

    fn box_bars(&self, series: &SymbolSeries) -> usize {
        window::resolve_default(self.config.box_window_days, series.len())
    }

    fn check_amplitude(
        &self,
        series: &SymbolSeries,
        diagnostics: &mut BTreeMap<&'static str, f64>,
    ) -> PredicateCheck {
        let ceiling = match self.config.amplitude_ceiling {
            Some(c) => c,
            None => return PredicateCheck::Pass,
        };
        let bars = self.box_bars(series);
        let (high, low) = match (series.trailing_high(bars, 0), series.trailing_low(bars)) {
            (Some(h), Some(l)) => (h, l),
            _ => return PredicateCheck::Skip(SkipCause::InsufficientData),
        };
        diagnostics.insert("box_high", high);
        diagnostics.insert("box_low", low);
        // Division-by-zero guard: a non-positive low is an arithmetic edge
        // case, not a substantive verdict.
        if low <= 0.0 {
            return PredicateCheck::Skip(SkipCause::Computation);
        }
        let amplitude = (high - low) / low;
        diagnostics.insert("amplitude", amplitude);
        if amplitude < ceiling {
            PredicateCheck::Pass
        } else {
            PredicateCheck::Fail
        }
    }

    fn check_consolidation(
        &self,
        series: &SymbolSeries,
        diagnostics: &mut BTreeMap<&'static str, f64>,
    ) -> PredicateCheck {
        let rule = match &self.config.consolidation {
            Some(r) => r,
            None => return PredicateCheck::Pass,
        };
        let widths: Vec<f64> = BollingerWidth::compute(rule.window, &series.closes())
            .into_iter()
            .flatten()
            .collect();
        if widths.is_empty() {
            return PredicateCheck::Skip(SkipCause::InsufficientData);
        }
        let start = widths.len().saturating_sub(rule.trailing);
        let tail = &widths[start..];
        let reduced = match rule.reduce {
            Reduce::Max => tail.iter().cloned().fold(f64::MIN, f64::max),
            Reduce::Mean => tail.iter().sum::<f64>() / tail.len() as f64,
        };
        diagnostics.insert("boll_width", reduced);
        if reduced < rule.ceiling {
            PredicateCheck::Pass
        } else {
            PredicateCheck::Fail
        }
    }

    fn check_volume(
        &self,
        series: &SymbolSeries,
        diagnostics: &mut BTreeMap<&'static str, f64>,
    ) -> PredicateCheck {
        let rule = match &self.config.volume {
            Some(r) => r,
            None => return PredicateCheck::Pass,
        };
        let volumes = series.volumes();
        let short = ExponentialMovingAverage::compute(rule.short_span, &volumes);
        let long = ExponentialMovingAverage::compute(rule.long_span, &volumes);
        let (short_mean, long_mean) = match (
            trailing_mean(&short, rule.trailing),
            trailing_mean(&long, rule.trailing),
        ) {
            (Some(s), Some(l)) => (s, l),
            _ => return PredicateCheck::Skip(SkipCause::InsufficientData),
        };
        diagnostics.insert("vol_ema_short", short_mean);
        diagnostics.insert("vol_ema_long", long_mean);
        if !rule.boundary.above(short_mean, long_mean * rule.growth_ratio) {
            return PredicateCheck::Fail;
        }
        if rule.require_nonneg_trend {
            let start = short.len().saturating_sub(rule.trailing.max(2));
            match trend_slope(&short[start..]) {
                Some((slope, _)) => {
                    diagnostics.insert("vol_trend_slope", slope);
                    if slope < 0.0 {
                        return PredicateCheck::Fail;
                    }
                }
                None => return PredicateCheck::Skip(SkipCause::InsufficientData),
            }
        }
        PredicateCheck::Pass
    }

    fn check_breakout(
        &self,
        series: &SymbolSeries,
        diagnostics: &mut BTreeMap<&'static str, f64>,
    ) -> PredicateCheck {
        let rule = match &self.config.breakout {
            Some(r) => r,
            None => return PredicateCheck::Pass,
        };
        let latest_close = match series.last() {
            Some(bar) => bar.close,
            None => return PredicateCheck::Skip(SkipCause::InsufficientData),
        };
        let bars = self.box_bars(series);
        let base_high = match series.trailing_high(bars, rule.exclude_latest) {
            Some(h) => h,
            None => return PredicateCheck::Skip(SkipCause::InsufficientData),
        };
        let atr = AverageTrueRange::compute(rule.atr_window, series.bars())
            .into_iter()
            .flatten()
            .last();
        let atr = match atr {
            Some(a) => a,
            None => return PredicateCheck::Skip(SkipCause::InsufficientData),
        };
        let margin = latest_close - (base_high + rule.atr_multiplier * atr);
        diagnostics.insert("latest_close", latest_close);
        diagnostics.insert("base_high", base_high);
        diagnostics.insert("atr", atr);
        diagnostics.insert("breakout_margin", margin);
        if margin > 0.0 {
            PredicateCheck::Pass
        } else {
            PredicateCheck::Fail
        }
    }

    fn check_below_quantile(
        &self,
        series: &SymbolSeries,
        diagnostics: &mut BTreeMap<&'static str, f64>,
    ) -> PredicateCheck {
        let rule = match &self.config.below_quantile {
            Some(r) => r,
            None => return PredicateCheck::Pass,
        };
        let closes = series.closes();
        let latest = match closes.last() {
            Some(&c) => c,
            None => return PredicateCheck::Skip(SkipCause::InsufficientData),
        };
        let bars = window::resolve_default(rule.lookback_days, closes.len());
        let start = closes.len() - bars;
        let threshold = match quantile(&closes[start..], rule.q) {
            Some(t) => t,
            None => return PredicateCheck::Skip(SkipCause::InsufficientData),
        };
        diagnostics.insert("close_quantile", threshold);
        if latest < threshold {
            PredicateCheck::Pass
        } else {
            PredicateCheck::Fail
        }
    }

    fn check_above_ma(
        &self,
        series: &SymbolSeries,
        diagnostics: &mut BTreeMap<&'static str, f64>,
    ) -> PredicateCheck {
        let rule = match &self.config.above_ma {
            Some(r) => r,
            None => return PredicateCheck::Pass,
        };
        let closes = series.closes();
        let ma = SimpleMovingAverage::compute(rule.window, &closes)
            .into_iter()
            .flatten()
            .last();
        let (ma, latest) = match (ma, closes.last()) {
            (Some(m), Some(&c)) => (m, c),
            _ => return PredicateCheck::Skip(SkipCause::InsufficientData),
        };
        diagnostics.insert("ma", ma);
        if latest > ma {
            PredicateCheck::Pass
        } else {
            PredicateCheck::Fail
        }
    }

    fn check_trend(
        &self,
        series: &SymbolSeries,
        diagnostics: &mut BTreeMap<&'static str, f64>,
    ) -> PredicateCheck {
        let rule = match &self.config.trend {
            Some(r) => r,
            None => return PredicateCheck::Pass,
        };
        let closes = series.closes();
        let reversal_bars = window::resolve_default(rule.reversal_days, closes.len());
        if reversal_bars >= closes.len() {
            return PredicateCheck::Skip(SkipCause::InsufficientData);
        }
        let end = closes.len() - reversal_bars;
        let downtrend_bars = window::resolve_default(rule.downtrend_days, end);
        let start = end - downtrend_bars;
        let fit = &closes[start..end];
        if fit.len() < 10 {
            return PredicateCheck::Skip(SkipCause::InsufficientData);
        }
        match trend_slope(fit) {
            Some((slope, _)) => {
                diagnostics.insert("trend_slope", slope);
                if slope < rule.slope_ceiling {
                    PredicateCheck::Pass
                } else {
                    PredicateCheck::Fail
                }
            }
            None => PredicateCheck::Skip(SkipCause::Computation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PriceBar;
    use chrono::NaiveDate;

    fn mk_series(closes: &[f64], volumes: &[f64]) -> SymbolSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let bars = closes
            .iter()
            .zip(volumes.iter())
            .enumerate()
            .map(|(i, (&c, &v))| {
                PriceBar::new(
                    start + chrono::Duration::days(i as i64),
                    c,
                    c,
                    c,
                    c,
                    v,
                )
            })
            .collect();
        SymbolSeries::from_valid(bars)
    }

    fn flat_series(n: usize, price: f64) -> SymbolSeries {
        mk_series(&vec![price; n], &vec![1000.0; n])
    }

    fn sym() -> Symbol {
        Symbol::new("600000", "Test")
    }

    #[test]
    fn test_insufficient_data_one_bar_short() {
        let config = ScreeningConfig::consolidation_breakout();
        let evaluator = CriterionEvaluator::new(&config);

        let outcome = evaluator.evaluate(&sym(), &flat_series(249, 10.0));
        assert_eq!(outcome.verdict, Verdict::Skip(SkipCause::InsufficientData));
        assert_eq!(outcome.diagnostics.get("bars"), Some(&249.0));
    }

    #[test]
    fn test_exactly_min_bars_is_evaluated() {
        let config = ScreeningConfig::consolidation_breakout();
        let evaluator = CriterionEvaluator::new(&config);

        let outcome = evaluator.evaluate(&sym(), &flat_series(250, 10.0));
        // Evaluated on substance: a flat series has no breakout
        assert_eq!(outcome.verdict, Verdict::Fail(PredicateId::Breakout));
    }

    #[test]
    fn test_flat_series_satisfies_consolidation() {
        // Bollinger width of a constant series is exactly 0, under any
        // positive ceiling
        let mut config = ScreeningConfig::consolidation_breakout();
        config.consolidation = Some(ConsolidationRule {
            ceiling: 1e-9,
            ..ConsolidationRule::default()
        });
        let evaluator = CriterionEvaluator::new(&config);

        let outcome = evaluator.evaluate(&sym(), &flat_series(250, 10.0));
        assert_eq!(outcome.verdict, Verdict::Fail(PredicateId::Breakout));
        assert_eq!(outcome.diagnostics.get("boll_width"), Some(&0.0));
    }

    #[test]
    fn test_breakout_passes() {
        let mut closes = vec![10.0; 249];
        closes.push(12.0);
        let mut volumes = vec![1000.0; 240];
        volumes.extend(vec![2500.0; 10]); // volume picks up into the breakout
        let series = mk_series(&closes, &volumes);

        let config = ScreeningConfig::consolidation_breakout();
        let evaluator = CriterionEvaluator::new(&config);
        let outcome = evaluator.evaluate(&sym(), &series);

        assert_eq!(outcome.verdict, Verdict::Pass);
        let margin = outcome.diagnostics["breakout_margin"];
        assert!(margin > 0.0, "expected positive breakout margin, got {margin}");
    }

    #[test]
    fn test_zero_low_is_computation_skip() {
        let mut closes = vec![10.0; 249];
        closes.push(12.0);
        let mut series = mk_series(&closes, &vec![1000.0; 250]);
        // Force a zero low without violating the OHLC envelope
        let bars: Vec<PriceBar> = series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let mut b = b.clone();
                if i == 100 {
                    b.low = 0.0;
                }
                b
            })
            .collect();
        series = SymbolSeries::from_valid(bars);

        let config = ScreeningConfig::consolidation_breakout();
        let evaluator = CriterionEvaluator::new(&config);
        let outcome = evaluator.evaluate(&sym(), &series);
        assert_eq!(outcome.verdict, Verdict::Skip(SkipCause::Computation));
    }

    #[test]
    fn test_amplitude_ceiling_fails_wide_box() {
        let mut closes: Vec<f64> = (0..250).map(|i| 10.0 + (i % 50) as f64).collect();
        closes.push(70.0);
        let series = mk_series(&closes, &vec![1000.0; closes.len()]);

        let config = ScreeningConfig::consolidation_breakout();
        let evaluator = CriterionEvaluator::new(&config);
        let outcome = evaluator.evaluate(&sym(), &series);
        assert_eq!(outcome.verdict, Verdict::Fail(PredicateId::Amplitude));
        // short-circuit: no breakout diagnostics computed
        assert!(!outcome.diagnostics.contains_key("breakout_margin"));
        assert!(outcome.diagnostics.contains_key("amplitude"));
    }

    #[test]
    fn test_volume_fade_fails_confirmation() {
        let closes = vec![10.0; 250];
        let volumes: Vec<f64> = (0..250).map(|i| 10_000.0 - 30.0 * i as f64).collect();
        let series = mk_series(&closes, &volumes);

        let config = ScreeningConfig::consolidation_breakout();
        let evaluator = CriterionEvaluator::new(&config);
        let outcome = evaluator.evaluate(&sym(), &series);
        assert_eq!(
            outcome.verdict,
            Verdict::Fail(PredicateId::VolumeConfirmation)
        );
    }

    #[test]
    fn test_trend_reversal_requires_downtrend() {
        let config = ScreeningConfig::trend_reversal();
        let evaluator = CriterionEvaluator::new(&config);

        // Rising series: slope positive, downtrend precondition fails
        let closes: Vec<f64> = (0..400).map(|i| 10.0 + 0.05 * i as f64).collect();
        let series = mk_series(&closes, &vec![1000.0; 400]);
        let outcome = evaluator.evaluate(&sym(), &series);
        assert_eq!(outcome.verdict, Verdict::Fail(PredicateId::TrendSlope));

        // Long decline then a sharp five-day turn-up on heavy volume
        let mut closes: Vec<f64> = (0..395).map(|i| 100.0 - 0.2 * i as f64).collect();
        let floor = *closes.last().unwrap();
        closes.extend((0..5).map(|i| floor + 3.0 * (i + 1) as f64));
        let mut volumes = vec![1000.0; 395];
        volumes.extend(vec![10_000.0; 5]);
        let series = mk_series(&closes, &volumes);
        let outcome = evaluator.evaluate(&sym(), &series);
        assert_eq!(outcome.verdict, Verdict::Pass);
        assert!(outcome.diagnostics["trend_slope"] < 0.0);
    }

    #[test]
    fn test_low_position_quantile() {
        let config = ScreeningConfig::low_position();
        let evaluator = CriterionEvaluator::new(&config);

        // Price near the top of its range: below-quantile predicate fails
        let closes: Vec<f64> = (0..200).map(|i| 10.0 + 0.1 * i as f64).collect();
        let series = mk_series(&closes, &vec![1000.0; 200]);
        let outcome = evaluator.evaluate(&sym(), &series);
        assert_eq!(
            outcome.verdict,
            Verdict::Fail(PredicateId::PriceBelowQuantile)
        );
    }

    #[test]
    fn test_outcome_serializes() {
        let config = ScreeningConfig::default();
        let evaluator = CriterionEvaluator::new(&config);
        let outcome = evaluator.evaluate(&sym(), &flat_series(250, 10.0));
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"code\":\"600000\""));
    }
}
