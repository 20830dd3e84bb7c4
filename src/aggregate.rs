//! Deterministic aggregation of per-symbol outcomes
//!
//! The dispatcher yields outcomes in completion order, which depends on
//! network timing and pool size. Aggregation restores determinism: passing
//! rows are sorted (symbol code ascending by default) and everything else
//! is reduced to counted statistics, so identical inputs produce identical
//! results regardless of concurrency.

use crate::criteria::{CriterionOutcome, PredicateId, SkipCause, Verdict};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Run-level accounting across all evaluated symbols
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Substantive failures keyed by the first failing predicate
    pub fail_counts: BTreeMap<PredicateId, usize>,
    /// Exclusions keyed by cause (data, fetch, arithmetic, cancellation)
    pub skip_counts: BTreeMap<SkipCause, usize>,
}

/// Final output of a screening run; owned by the caller, never mutated
/// after creation
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningResult {
    /// Passing symbols with their diagnostics, in deterministic order
    pub rows: Vec<CriterionOutcome>,
    pub stats: RunStats,
}

impl ScreeningResult {
    /// Codes of the passing symbols, in result order
    pub fn passing_codes(&self) -> Vec<&str> {
        self.rows.iter().map(|o| o.code.as_str()).collect()
    }
}

/// Aggregate with the default ordering (symbol code ascending)
pub fn aggregate(outcomes: Vec<CriterionOutcome>) -> ScreeningResult {
    aggregate_with(outcomes, |a, b| a.code.cmp(&b.code))
}

/// Aggregate with a caller-specified ordering over passing rows
pub fn aggregate_with<F>(outcomes: Vec<CriterionOutcome>, mut compare: F) -> ScreeningResult
where
    F: FnMut(&CriterionOutcome, &CriterionOutcome) -> Ordering,
{
    let mut stats = RunStats {
        total: outcomes.len(),
        ..RunStats::default()
    };
    let mut rows = Vec::new();

    for outcome in outcomes {
        match outcome.verdict {
            Verdict::Pass => {
                stats.passed += 1;
                rows.push(outcome);
            }
            Verdict::Fail(predicate) => {
                stats.failed += 1;
                *stats.fail_counts.entry(predicate).or_insert(0) += 1;
            }
            Verdict::Skip(cause) => {
                stats.skipped += 1;
                *stats.skip_counts.entry(cause).or_insert(0) += 1;
            }
        }
    }

    rows.sort_by(|a, b| compare(a, b));
    ScreeningResult { rows, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn outcome(code: &str, verdict: Verdict) -> CriterionOutcome {
        CriterionOutcome {
            code: code.to_string(),
            name: code.to_string(),
            verdict,
            diagnostics: Map::new(),
        }
    }

    #[test]
    fn test_passing_rows_sorted_by_code() {
        let outcomes = vec![
            outcome("600300", Verdict::Pass),
            outcome("600100", Verdict::Pass),
            outcome("600200", Verdict::Fail(PredicateId::Breakout)),
            outcome("000100", Verdict::Pass),
        ];
        let result = aggregate(outcomes);
        assert_eq!(result.passing_codes(), vec!["000100", "600100", "600300"]);
    }

    #[test]
    fn test_stats_partition() {
        let outcomes = vec![
            outcome("a", Verdict::Pass),
            outcome("b", Verdict::Fail(PredicateId::Breakout)),
            outcome("c", Verdict::Fail(PredicateId::Breakout)),
            outcome("d", Verdict::Fail(PredicateId::Amplitude)),
            outcome("e", Verdict::Skip(SkipCause::FetchFailure)),
            outcome("f", Verdict::Skip(SkipCause::InsufficientData)),
        ];
        let result = aggregate(outcomes);
        assert_eq!(result.stats.total, 6);
        assert_eq!(result.stats.passed, 1);
        assert_eq!(result.stats.failed, 3);
        assert_eq!(result.stats.skipped, 2);
        assert_eq!(result.stats.fail_counts[&PredicateId::Breakout], 2);
        assert_eq!(result.stats.skip_counts[&SkipCause::FetchFailure], 1);
    }

    #[test]
    fn test_custom_order() {
        let outcomes = vec![outcome("600100", Verdict::Pass), outcome("600300", Verdict::Pass)];
        let result = aggregate_with(outcomes, |a, b| b.code.cmp(&a.code));
        assert_eq!(result.passing_codes(), vec!["600300", "600100"]);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let a = vec![
            outcome("600100", Verdict::Pass),
            outcome("600200", Verdict::Pass),
            outcome("600300", Verdict::Skip(SkipCause::Cancelled)),
        ];
        let mut b = a.clone();
        b.reverse();
        let ra = aggregate(a);
        let rb = aggregate(b);
        assert_eq!(
            serde_json::to_string(&ra).unwrap(),
            serde_json::to_string(&rb).unwrap()
        );
    }

    #[test]
    fn test_empty() {
        let result = aggregate(Vec::new());
        assert_eq!(result.stats.total, 0);
        assert!(result.rows.is_empty());
    }
}
