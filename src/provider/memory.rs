//! In-memory provider for tests and offline fixtures

use crate::error::{Result, ScreenError};
use crate::provider::MarketDataProvider;
use crate::series::PriceBar;
use crate::types::Adjustment;
use crate::universe::Symbol;
use async_trait::async_trait;
use chrono::NaiveDate;
use hashbrown::{HashMap, HashSet};

/// HashMap-backed provider; histories are served filtered to the requested
/// date range, and selected codes can be made to fail to exercise the
/// dispatcher's failure isolation.
#[derive(Default)]
pub struct InMemoryProvider {
    universe: Vec<Symbol>,
    histories: HashMap<String, Vec<PriceBar>>,
    flows: HashMap<String, Vec<f64>>,
    failing_codes: HashSet<String>,
    fail_universe: bool,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(mut self, symbol: Symbol, bars: Vec<PriceBar>) -> Self {
        self.histories.insert(symbol.code.clone(), bars);
        self.universe.push(symbol);
        self
    }

    pub fn with_flows(mut self, code: &str, flows: Vec<f64>) -> Self {
        self.flows.insert(code.to_string(), flows);
        self
    }

    /// History fetches for this code will return a fetch error
    pub fn with_failing_code(mut self, code: &str) -> Self {
        self.failing_codes.insert(code.to_string());
        self
    }

    /// The universe fetch itself will fail (run-fatal path)
    pub fn with_failing_universe(mut self) -> Self {
        self.fail_universe = true;
        self
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryProvider {
    async fn get_universe(&self) -> Result<Vec<Symbol>> {
        if self.fail_universe {
            return Err(ScreenError::UniverseFetch("fixture failure".to_string()));
        }
        Ok(self.universe.clone())
    }

    async fn get_history(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
        _adjustment: Adjustment,
    ) -> Result<Vec<PriceBar>> {
        if self.failing_codes.contains(code) {
            return Err(ScreenError::Fetch {
                symbol: code.to_string(),
                message: "fixture failure".to_string(),
            });
        }
        let bars = self
            .histories
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(bars)
    }

    async fn get_net_inflows(&self, code: &str, days: usize) -> Result<Vec<f64>> {
        let flows = self.flows.get(code).cloned().unwrap_or_default();
        let start = flows.len().saturating_sub(days);
        Ok(flows[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: NaiveDate, close: f64) -> PriceBar {
        PriceBar::new(date, close, close, close, close, 1000.0)
    }

    #[tokio::test]
    async fn test_history_filtered_to_range() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        let provider = InMemoryProvider::new().with_symbol(
            Symbol::new("600000", "Test"),
            vec![bar(d1, 10.0), bar(d2, 11.0)],
        );

        let bars = provider
            .get_history("600000", d1, d1, Adjustment::Forward)
            .await
            .unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 10.0);
    }

    #[tokio::test]
    async fn test_unknown_code_is_empty_not_error() {
        let provider = InMemoryProvider::new();
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars = provider
            .get_history("999999", d, d, Adjustment::None)
            .await
            .unwrap();
        assert!(bars.is_empty());
    }

    #[tokio::test]
    async fn test_failing_code() {
        let provider = InMemoryProvider::new().with_failing_code("600000");
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let result = provider.get_history("600000", d, d, Adjustment::None).await;
        assert!(matches!(result, Err(ScreenError::Fetch { .. })));
    }

    #[tokio::test]
    async fn test_flows_tail() {
        let provider =
            InMemoryProvider::new().with_flows("600000", vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let flows = provider.get_net_inflows("600000", 3).await.unwrap();
        assert_eq!(flows, vec![3.0, 4.0, 5.0]);
        let flows = provider.get_net_inflows("600000", 10).await.unwrap();
        assert_eq!(flows.len(), 5);
    }
}
