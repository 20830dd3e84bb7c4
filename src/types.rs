//! Core types and constants

use serde::{Deserialize, Serialize};

/// Price type (f64 throughout, matching provider precision)
pub type Price = f64;

/// Volume type (shares; f64 because providers report lots and NaN gaps)
pub type Volume = f64;

/// Exchange-qualified symbol code (e.g. "600036", "000001")
pub type SymbolCode = String;

/// Listing board, derived from the code prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Board {
    /// Main board (Shanghai 60x / Shenzhen 00x)
    Main,
    /// Growth enterprise board (30x)
    Growth,
    /// Science and technology innovation board (688x)
    SciTech,
    /// Anything else (B shares, funds, unknown prefixes)
    Other,
}

impl Board {
    /// Classify a symbol code by its exchange prefix
    pub fn from_code(code: &str) -> Self {
        if code.starts_with("688") {
            Board::SciTech
        } else if code.starts_with("60") || code.starts_with("00") {
            Board::Main
        } else if code.starts_with("30") {
            Board::Growth
        } else {
            Board::Other
        }
    }
}

/// Price adjustment mode for history fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Adjustment {
    /// Raw exchange prices
    None,
    /// Forward-adjusted (splits/dividends folded into past prices)
    Forward,
    /// Backward-adjusted
    Backward,
}

impl Default for Adjustment {
    fn default() -> Self {
        Adjustment::Forward
    }
}

/// Whether a numeric threshold comparison admits equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryMode {
    Inclusive,
    Exclusive,
}

impl BoundaryMode {
    /// True when `value` exceeds `threshold` under this mode
    pub fn above(self, value: f64, threshold: f64) -> bool {
        match self {
            BoundaryMode::Inclusive => value >= threshold,
            BoundaryMode::Exclusive => value > threshold,
        }
    }

    /// True when `value` is under `threshold` under this mode
    pub fn below(self, value: f64, threshold: f64) -> bool {
        match self {
            BoundaryMode::Inclusive => value <= threshold,
            BoundaryMode::Exclusive => value < threshold,
        }
    }
}
