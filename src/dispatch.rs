//! Bounded-concurrency evaluation dispatcher
//!
//! Fans per-symbol work (history fetch, validation, criterion evaluation)
//! across a semaphore-bounded set of tasks. Workers share nothing; each
//! sends exactly one outcome over a channel, and any per-symbol failure
//! becomes a skip outcome rather than aborting the batch. A run-level
//! deadline or cancellation signal stops *submission* only: in-flight
//! fetches complete and their outcomes remain valid.

use crate::criteria::{
    CriterionEvaluator, CriterionOutcome, PredicateId, ScreeningConfig, SkipCause, Verdict,
};
use crate::flow::FlowScreen;
use crate::provider::MarketDataProvider;
use crate::series::SymbolSeries;
use crate::types::Adjustment;
use crate::universe::Symbol;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Per-run dispatch settings
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Maximum in-flight per-symbol tasks
    pub concurrency: usize,
    /// Run-level deadline; per-request timeouts belong to the provider
    pub deadline: Option<Duration>,
    pub adjustment: Adjustment,
    /// Optional capital-flow requirement (needs provider flow data)
    pub flow: Option<FlowScreen>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 10,
            deadline: None,
            adjustment: Adjustment::Forward,
            flow: None,
        }
    }
}

/// Fans out per-symbol evaluation over a bounded task pool
pub struct Dispatcher {
    provider: Arc<dyn MarketDataProvider>,
    options: RunOptions,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, options: RunOptions) -> Self {
        Self { provider, options }
    }

    /// Evaluate all symbols; completion order is unspecified.
    pub async fn run(
        &self,
        symbols: Vec<Symbol>,
        config: &ScreeningConfig,
    ) -> Vec<CriterionOutcome> {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.run_with_cancel(symbols, config, cancel_rx).await
    }

    /// Evaluate all symbols, honoring an external cancellation signal.
    ///
    /// Once `cancel` turns true (or the deadline passes), remaining symbols
    /// are recorded as `Cancelled` skips without being fetched.
    pub async fn run_with_cancel(
        &self,
        symbols: Vec<Symbol>,
        config: &ScreeningConfig,
        cancel: watch::Receiver<bool>,
    ) -> Vec<CriterionOutcome> {
        let total = symbols.len();
        let deadline = self.options.deadline.map(|d| Instant::now() + d);
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = Arc::new(config.clone());
        let mut tasks = JoinSet::new();

        log::info!(
            "dispatching {} symbols, concurrency {}",
            total,
            self.options.concurrency
        );

        let mut stopped = false;
        for symbol in symbols {
            if !stopped {
                stopped = *cancel.borrow() || deadline.is_some_and(|d| Instant::now() >= d);
            }
            if stopped {
                let _ = tx.send(CriterionOutcome::skipped(&symbol, SkipCause::Cancelled));
                continue;
            }

            // Bound submission: wait for a permit, but let the deadline or
            // cancellation break the wait.
            let permit = {
                let mut cancel = cancel.clone();
                let acquire = semaphore.clone().acquire_owned();
                tokio::pin!(acquire);
                let sleep_until = deadline.unwrap_or_else(far_future);
                tokio::select! {
                    permit = &mut acquire => permit.ok(),
                    _ = cancel.changed() => None,
                    _ = tokio::time::sleep_until(sleep_until) => None,
                }
            };
            let permit = match permit {
                Some(p) => p,
                None => {
                    stopped = true;
                    let _ = tx.send(CriterionOutcome::skipped(&symbol, SkipCause::Cancelled));
                    continue;
                }
            };

            let provider = Arc::clone(&self.provider);
            let config = Arc::clone(&config);
            let options = self.options.clone();
            let tx = tx.clone();
            tasks.spawn(async move {
                let outcome = process_symbol(provider, symbol, &config, &options).await;
                let _ = tx.send(outcome);
                drop(permit);
            });
        }
        drop(tx);

        while tasks.join_next().await.is_some() {}

        let mut outcomes = Vec::with_capacity(total);
        while let Ok(outcome) = rx.try_recv() {
            outcomes.push(outcome);
        }
        log::info!("dispatch complete: {} outcomes", outcomes.len());
        outcomes
    }
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86400 * 365)
}

/// Fetch, validate, and evaluate one symbol; every error path folds into a
/// skip outcome so nothing crosses the dispatcher boundary as `Err`.
async fn process_symbol(
    provider: Arc<dyn MarketDataProvider>,
    symbol: Symbol,
    config: &ScreeningConfig,
    options: &RunOptions,
) -> CriterionOutcome {
    // Capital-flow requirement first: its payload is far smaller than a
    // year of bars, so a flow rejection saves the history fetch.
    if let Some(screen) = &options.flow {
        match provider
            .get_net_inflows(&symbol.code, screen.max_window())
            .await
        {
            Ok(flows) => {
                if !screen.admits(&flows) {
                    let mut diagnostics = BTreeMap::new();
                    diagnostics.insert("net_inflow_sum", flows.iter().sum());
                    return CriterionOutcome {
                        code: symbol.code.clone(),
                        name: symbol.name.clone(),
                        verdict: Verdict::Fail(PredicateId::NetInflow),
                        diagnostics,
                    };
                }
            }
            Err(e) if screen.mandatory => {
                log::warn!("flow fetch failed for {}: {}", symbol.code, e);
                return CriterionOutcome::skipped(&symbol, SkipCause::FetchFailure);
            }
            Err(e) => {
                log::debug!("flow requirement waived for {}: {}", symbol.code, e);
            }
        }
    }

    let end = Utc::now().date_naive();
    let start = end - chrono::Duration::days(config.history_days as i64);
    let bars = match provider
        .get_history(&symbol.code, start, end, options.adjustment)
        .await
    {
        Ok(bars) => bars,
        Err(e) => {
            log::warn!("history fetch failed for {}: {}", symbol.code, e);
            return CriterionOutcome::skipped(&symbol, SkipCause::FetchFailure);
        }
    };

    let series = match SymbolSeries::new(&symbol.code, bars) {
        Ok(series) => series,
        Err(e) => {
            log::warn!("data quality: {}", e);
            return CriterionOutcome::skipped(&symbol, SkipCause::MalformedSeries);
        }
    };

    CriterionEvaluator::new(config).evaluate(&symbol, &series)
}
