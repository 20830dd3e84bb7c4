//! Error types for the screening engine

use thiserror::Error;

/// Main error type for screening operations
#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("Universe fetch failed: {0}")]
    UniverseFetch(String),

    #[error("History fetch failed for {symbol}: {message}")]
    Fetch { symbol: String, message: String },

    #[error("Malformed series for {symbol}: {message}")]
    MalformedSeries { symbol: String, message: String },

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for screening operations
pub type Result<T> = std::result::Result<T, ScreenError>;
