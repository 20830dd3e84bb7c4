//! Capital-flow (main net inflow) screen
//!
//! An optional requirement that a symbol's main-capital net inflow is
//! positive over each configured trailing window (1/3/5/10 days in the
//! historical screens). Flow data comes from the provider, so the check is
//! applied by the dispatcher alongside the fetch, not by the pure
//! criterion evaluator.

use crate::types::BoundaryMode;
use serde::{Deserialize, Serialize};

/// Net-inflow sign requirement over trailing windows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowScreen {
    /// Trailing windows, in days, each of whose inflow sums must clear zero
    pub windows: Vec<usize>,
    /// Whether a zero sum clears (inclusive: >= 0, exclusive: > 0)
    pub boundary: BoundaryMode,
    /// Require the full window of data; otherwise "at least one day"
    /// suffices and shorter histories are summed as-is
    pub require_full_window: bool,
    /// When true, a flow-data fetch failure skips the symbol; when false
    /// the flow requirement is waived for that symbol
    pub mandatory: bool,
}

impl Default for FlowScreen {
    fn default() -> Self {
        Self {
            windows: vec![1, 3, 5, 10],
            boundary: BoundaryMode::Exclusive,
            require_full_window: false,
            mandatory: false,
        }
    }
}

impl FlowScreen {
    /// Whether a symbol's inflow history (oldest first) clears every window.
    ///
    /// Symbols with no flow history at all never clear: the source screens
    /// silently dropped new listings that lack flow data, and this keeps
    /// that behavior observable as a substantive failure.
    pub fn admits(&self, flows: &[f64]) -> bool {
        if flows.is_empty() || flows.iter().any(|f| f.is_nan()) {
            return false;
        }
        self.windows.iter().all(|&w| {
            if self.require_full_window && flows.len() < w {
                return false;
            }
            let start = flows.len().saturating_sub(w);
            let sum: f64 = flows[start..].iter().sum();
            self.boundary.above(sum, 0.0)
        })
    }

    /// Longest window, i.e. how many days of flow data to request
    pub fn max_window(&self) -> usize {
        self.windows.iter().copied().max().unwrap_or(0)
    }
}
