//! Universe snapshot and cheap pre-filtering
//!
//! The universe filter runs once per screening cycle, before any per-symbol
//! history fetch, so that suspended names, excluded boards, and
//! out-of-band market caps never cost a network call.

use crate::types::{Board, BoundaryMode, Price, SymbolCode};
use serde::{Deserialize, Serialize};

/// Static attributes of one listed symbol, as of the snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub code: SymbolCode,
    pub name: String,
    pub board: Board,
    /// Circulating market capitalization, if reported
    pub circulating_market_cap: Option<f64>,
    /// Daily turnover, if reported
    pub turnover: Option<f64>,
    pub latest_price: Option<Price>,
    pub open_price: Option<Price>,
}

impl Symbol {
    /// Minimal constructor; board derived from the code prefix
    pub fn new(code: impl Into<SymbolCode>, name: impl Into<String>) -> Self {
        let code = code.into();
        let board = Board::from_code(&code);
        Self {
            code,
            name: name.into(),
            board,
            circulating_market_cap: None,
            turnover: None,
            latest_price: None,
            open_price: None,
        }
    }

    pub fn with_market_cap(mut self, cap: f64) -> Self {
        self.circulating_market_cap = Some(cap);
        self
    }

    pub fn with_latest_price(mut self, price: Price) -> Self {
        self.latest_price = Some(price);
        self
    }

    pub fn with_turnover(mut self, turnover: f64) -> Self {
        self.turnover = Some(turnover);
        self
    }
}

/// Synchronous pre-filter over the full snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseFilter {
    /// Boards admitted to screening
    pub allowed_boards: Vec<Board>,
    /// Name prefixes excluded outright (suspended / special-treatment tags)
    pub excluded_name_prefixes: Vec<String>,
    /// Circulating market cap band; `None` bound means unbounded
    pub min_market_cap: Option<f64>,
    pub max_market_cap: Option<f64>,
    pub market_cap_boundary: BoundaryMode,
    /// Minimum turnover, when reported
    pub min_turnover: Option<f64>,
    /// Drop symbols with a missing or non-finite latest price
    pub require_valid_price: bool,
}

impl Default for UniverseFilter {
    fn default() -> Self {
        // Main-board band used by the consolidation-breakout screen:
        // 2e9..2e10 circulating cap, no ST names
        Self {
            allowed_boards: vec![Board::Main],
            excluded_name_prefixes: vec!["ST".to_string(), "*ST".to_string()],
            min_market_cap: Some(2e9),
            max_market_cap: Some(2e10),
            market_cap_boundary: BoundaryMode::Inclusive,
            min_turnover: None,
            require_valid_price: true,
        }
    }
}

impl UniverseFilter {
    /// A filter that admits everything (useful for tests and custom stacks)
    pub fn permissive() -> Self {
        Self {
            allowed_boards: vec![Board::Main, Board::Growth, Board::SciTech, Board::Other],
            excluded_name_prefixes: Vec::new(),
            min_market_cap: None,
            max_market_cap: None,
            market_cap_boundary: BoundaryMode::Inclusive,
            min_turnover: None,
            require_valid_price: false,
        }
    }

    /// Whether one symbol survives the pre-filter
    pub fn admits(&self, symbol: &Symbol) -> bool {
        if !self.allowed_boards.contains(&symbol.board) {
            return false;
        }
        if self
            .excluded_name_prefixes
            .iter()
            .any(|p| symbol.name.starts_with(p.as_str()))
        {
            return false;
        }
        if self.require_valid_price
            && !symbol.latest_price.map_or(false, |p| p.is_finite() && p > 0.0)
        {
            return false;
        }
        if self.min_market_cap.is_some() || self.max_market_cap.is_some() {
            let cap = match symbol.circulating_market_cap {
                Some(c) if c.is_finite() => c,
                _ => return false,
            };
            if let Some(min) = self.min_market_cap {
                if !self.market_cap_boundary.above(cap, min) {
                    return false;
                }
            }
            if let Some(max) = self.max_market_cap {
                if !self.market_cap_boundary.below(cap, max) {
                    return false;
                }
            }
        }
        if let Some(min_turnover) = self.min_turnover {
            match symbol.turnover {
                Some(t) if t.is_finite() && t >= min_turnover => {}
                _ => return false,
            }
        }
        true
    }

    /// Apply the filter to a snapshot, preserving input order
    pub fn apply(&self, snapshot: &[Symbol]) -> Vec<Symbol> {
        let kept: Vec<Symbol> = snapshot.iter().filter(|s| self.admits(s)).cloned().collect();
        log::info!(
            "universe filter: {} of {} symbols admitted",
            kept.len(),
            snapshot.len()
        );
        kept
    }
}
