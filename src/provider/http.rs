//! HTTP/JSON market data client
//!
//! Speaks the common quote-API shape: a spot endpoint for the universe
//! snapshot and a kline endpoint returning bars as comma-separated rows
//! (`date,open,close,high,low,volume`) inside a JSON envelope.

use crate::error::{Result, ScreenError};
use crate::provider::{MarketDataProvider, ProviderConfig};
use crate::series::PriceBar;
use crate::types::Adjustment;
use crate::universe::Symbol;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

/// Reqwest-backed provider for a JSON quote API
pub struct HttpProvider {
    client: Client,
    config: ProviderConfig,
}

#[derive(Debug, Deserialize)]
struct SpotRow {
    code: String,
    name: String,
    #[serde(default)]
    circulating_market_cap: Option<f64>,
    #[serde(default)]
    turnover: Option<f64>,
    #[serde(default)]
    latest_price: Option<f64>,
    #[serde(default)]
    open_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct KlineEnvelope {
    klines: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FlowEnvelope {
    net_inflows: Vec<f64>,
}

impl HttpProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    fn adjust_param(adjustment: Adjustment) -> &'static str {
        match adjustment {
            Adjustment::None => "",
            Adjustment::Forward => "qfq",
            Adjustment::Backward => "hfq",
        }
    }

    /// Parse one `date,open,close,high,low,volume` kline row
    fn parse_kline(row: &str) -> Result<PriceBar> {
        let fields: Vec<&str> = row.split(',').collect();
        if fields.len() < 6 {
            return Err(ScreenError::Parse(format!(
                "kline row has {} fields, expected 6: {row:?}",
                fields.len()
            )));
        }
        let date = NaiveDate::parse_from_str(fields[0], "%Y-%m-%d")
            .map_err(|e| ScreenError::Parse(format!("bad kline date {:?}: {e}", fields[0])))?;
        let num = |i: usize| -> Result<f64> {
            fields[i]
                .parse::<f64>()
                .map_err(|e| ScreenError::Parse(format!("bad kline field {:?}: {e}", fields[i])))
        };
        Ok(PriceBar::new(
            date,
            num(1)?,
            num(3)?,
            num(4)?,
            num(2)?,
            num(5)?,
        ))
    }

    fn parse_klines(envelope: KlineEnvelope) -> Result<Vec<PriceBar>> {
        envelope.klines.iter().map(|r| Self::parse_kline(r)).collect()
    }
}

#[async_trait]
impl MarketDataProvider for HttpProvider {
    async fn get_universe(&self) -> Result<Vec<Symbol>> {
        let url = format!("{}/spot", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ScreenError::UniverseFetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ScreenError::UniverseFetch(format!(
                "spot endpoint returned {}",
                response.status()
            )));
        }
        let rows: Vec<SpotRow> = response
            .json()
            .await
            .map_err(|e| ScreenError::UniverseFetch(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let mut s = Symbol::new(r.code, r.name);
                s.circulating_market_cap = r.circulating_market_cap;
                s.turnover = r.turnover;
                s.latest_price = r.latest_price;
                s.open_price = r.open_price;
                s
            })
            .collect())
    }

    async fn get_history(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
        adjustment: Adjustment,
    ) -> Result<Vec<PriceBar>> {
        let url = format!(
            "{}/hist?code={}&start={}&end={}&adjust={}",
            self.config.base_url.trim_end_matches('/'),
            code,
            start.format("%Y%m%d"),
            end.format("%Y%m%d"),
            Self::adjust_param(adjustment),
        );
        let response = self.client.get(&url).send().await.map_err(|e| {
            ScreenError::Fetch {
                symbol: code.to_string(),
                message: e.to_string(),
            }
        })?;
        if !response.status().is_success() {
            return Err(ScreenError::Fetch {
                symbol: code.to_string(),
                message: format!("hist endpoint returned {}", response.status()),
            });
        }
        let envelope: KlineEnvelope =
            response.json().await.map_err(|e| ScreenError::Fetch {
                symbol: code.to_string(),
                message: e.to_string(),
            })?;
        Self::parse_klines(envelope)
    }

    async fn get_net_inflows(&self, code: &str, days: usize) -> Result<Vec<f64>> {
        let url = format!(
            "{}/fundflow?code={}&days={}",
            self.config.base_url.trim_end_matches('/'),
            code,
            days,
        );
        let response = self.client.get(&url).send().await.map_err(|e| {
            ScreenError::Fetch {
                symbol: code.to_string(),
                message: e.to_string(),
            }
        })?;
        if !response.status().is_success() {
            return Err(ScreenError::Fetch {
                symbol: code.to_string(),
                message: format!("fundflow endpoint returned {}", response.status()),
            });
        }
        let envelope: FlowEnvelope =
            response.json().await.map_err(|e| ScreenError::Fetch {
                symbol: code.to_string(),
                message: e.to_string(),
            })?;
        Ok(envelope.net_inflows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = HttpProvider::new(ProviderConfig::new("http://localhost:9999"));
        assert!(provider.is_ok());
    }

    #[test]
    fn test_kline_parsing() {
        let bar = HttpProvider::parse_kline("2024-01-02,10.0,10.5,10.8,9.9,12345").unwrap();
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bar.open, 10.0);
        assert_eq!(bar.close, 10.5);
        assert_eq!(bar.high, 10.8);
        assert_eq!(bar.low, 9.9);
        assert_eq!(bar.volume, 12345.0);
    }

    #[test]
    fn test_kline_parse_errors() {
        assert!(HttpProvider::parse_kline("2024-01-02,10.0").is_err());
        assert!(HttpProvider::parse_kline("notadate,10,10,10,10,10").is_err());
        assert!(HttpProvider::parse_kline("2024-01-02,x,10,10,10,10").is_err());
    }

    #[test]
    fn test_adjust_param() {
        assert_eq!(HttpProvider::adjust_param(Adjustment::Forward), "qfq");
        assert_eq!(HttpProvider::adjust_param(Adjustment::Backward), "hfq");
        assert_eq!(HttpProvider::adjust_param(Adjustment::None), "");
    }
}
