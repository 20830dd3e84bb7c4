//! Market data provider collaborators
//!
//! The screening core consumes symbol universes and bar history through the
//! narrow [`MarketDataProvider`] seam; wire protocol, pagination, rate
//! limits, and retry policy all live behind it.

pub mod http;
pub mod memory;

use crate::error::Result;
use crate::series::PriceBar;
use crate::types::Adjustment;
use crate::universe::Symbol;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

pub use http::HttpProvider;
pub use memory::InMemoryProvider;

/// Explicit, immutable provider construction settings.
///
/// Network behavior (endpoint, timeout, user agent) is fixed at
/// construction; nothing here is process-global or mutable mid-run.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Per-request timeout, distinct from any run-level deadline
    pub timeout: Duration,
    pub user_agent: String,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            user_agent: "screenline/0.1".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Narrow fetch interface over an external market data source
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Full symbol snapshot with static attributes; called once per run.
    /// This is the only call whose failure is fatal to a screening run.
    async fn get_universe(&self) -> Result<Vec<Symbol>>;

    /// Daily bars for one symbol in ascending date order; an empty range
    /// yields an empty vec, not an error
    async fn get_history(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
        adjustment: Adjustment,
    ) -> Result<Vec<PriceBar>>;

    /// Most recent daily main-capital net inflows, oldest first. Providers
    /// without capital-flow data keep the default empty answer.
    async fn get_net_inflows(&self, _code: &str, _days: usize) -> Result<Vec<f64>> {
        Ok(Vec::new())
    }
}
