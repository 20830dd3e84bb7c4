//! # screenline
//!
//! A concurrent multi-criteria technical screening engine for
//! exchange-listed equities: filter a universe snapshot, fan per-symbol
//! history fetches across a bounded task pool, evaluate an ordered chain
//! of technical predicates, and aggregate a deterministic candidate list.
//!
//! ## Example
//!
//! ```rust,no_run
//! use screenline::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> screenline::error::Result<()> {
//! let provider = Arc::new(HttpProvider::new(ProviderConfig::new(
//!     "https://quotes.example.com/api",
//! ))?);
//! let screener = Screener::new(provider)
//!     .with_config(ScreeningConfig::consolidation_breakout());
//! let result = screener.run().await?;
//! for row in &result.rows {
//!     println!("{} {} {:?}", row.code, row.name, row.diagnostics);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod criteria;
pub mod dispatch;
pub mod error;
pub mod flow;
pub mod indicators;
pub mod provider;
pub mod screener;
pub mod series;
pub mod types;
pub mod universe;
pub mod window;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::aggregate::{aggregate, RunStats, ScreeningResult};
    pub use crate::criteria::{
        CriterionEvaluator, CriterionOutcome, PredicateId, ScreeningConfig, SkipCause, Verdict,
    };
    pub use crate::dispatch::{Dispatcher, RunOptions};
    pub use crate::error::{Result, ScreenError};
    pub use crate::flow::FlowScreen;
    pub use crate::provider::{HttpProvider, InMemoryProvider, MarketDataProvider, ProviderConfig};
    pub use crate::screener::Screener;
    pub use crate::series::{PriceBar, SymbolSeries};
    pub use crate::types::{Adjustment, Board, BoundaryMode};
    pub use crate::universe::{Symbol, UniverseFilter};
}
