//! Top-level screening run orchestration
//!
//! Universe snapshot → cheap pre-filter → bounded-concurrency dispatch →
//! deterministic aggregation. Universe-fetch failure is the only run-fatal
//! error; every per-symbol problem is folded into the result statistics.

use crate::aggregate::{aggregate, ScreeningResult};
use crate::criteria::ScreeningConfig;
use crate::dispatch::{Dispatcher, RunOptions};
use crate::error::Result;
use crate::provider::MarketDataProvider;
use crate::universe::UniverseFilter;
use std::sync::Arc;
use tokio::sync::watch;

/// One configured screening engine instance
pub struct Screener {
    provider: Arc<dyn MarketDataProvider>,
    filter: UniverseFilter,
    config: ScreeningConfig,
    options: RunOptions,
}

impl Screener {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            filter: UniverseFilter::default(),
            config: ScreeningConfig::default(),
            options: RunOptions::default(),
        }
    }

    pub fn with_filter(mut self, filter: UniverseFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_config(mut self, config: ScreeningConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one full screening cycle
    pub async fn run(&self) -> Result<ScreeningResult> {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.run_with_cancel(cancel_rx).await
    }

    /// Run one cycle, honoring an external cancellation signal
    pub async fn run_with_cancel(
        &self,
        cancel: watch::Receiver<bool>,
    ) -> Result<ScreeningResult> {
        log::info!("screening run start: config '{}'", self.config.name);
        let snapshot = self.provider.get_universe().await?;
        let candidates = self.filter.apply(&snapshot);

        let dispatcher = Dispatcher::new(Arc::clone(&self.provider), self.options.clone());
        let outcomes = dispatcher
            .run_with_cancel(candidates, &self.config, cancel)
            .await;
        let result = aggregate(outcomes);

        log::info!(
            "screening run complete: {} passed, {} failed, {} skipped of {}",
            result.stats.passed,
            result.stats.failed,
            result.stats.skipped,
            result.stats.total
        );
        Ok(result)
    }
}
