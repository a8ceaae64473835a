//! Yahoo Finance JSON API client.
//!
//! Three endpoints cover everything the pipeline needs: `v8/finance/chart`
//! for daily bars, `v10/finance/quoteSummary` for fundamentals and
//! `v7/finance/options` for the option chain. Responses are navigated as
//! `serde_json::Value` since only a handful of fields matter.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::errors::{RotationError, RotationResult};
use crate::market::{DailyBar, OptionChain, OptionContract, PriceSeries};
use crate::provider::{Fundamentals, HistoryRange, MarketDataProvider};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; sector-rotation/0.1)";

/// HTTP client for the Yahoo Finance JSON endpoints.
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    /// Create a client with a 30-second request timeout.
    pub fn new() -> RotationResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RotationError::fetch("build http client", e.to_string()))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Borrow the underlying HTTP client, e.g. for the constituent fetch.
    pub fn http(&self) -> &Client {
        &self.client
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> RotationResult<Value> {
        debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;
        if !response.status().is_success() {
            return Err(RotationError::fetch(
                url.to_string(),
                format!("status {}", response.status()),
            ));
        }
        Ok(response.json::<Value>().await?)
    }

    fn parse_chart(symbol: &str, payload: &Value) -> RotationResult<PriceSeries> {
        let result = payload
            .pointer("/chart/result/0")
            .ok_or_else(|| RotationError::parse("chart", format!("no result for {}", symbol)))?;

        let timestamps = result
            .pointer("/timestamp")
            .and_then(Value::as_array)
            .ok_or_else(|| RotationError::empty_data(symbol, "no timestamps"))?;
        let quote = result
            .pointer("/indicators/quote/0")
            .ok_or_else(|| RotationError::parse("chart", "no quote block"))?;

        let field = |name: &str, idx: usize| -> Option<f64> {
            quote.pointer(&format!("/{}/{}", name, idx)).and_then(Value::as_f64)
        };

        let mut bars = Vec::with_capacity(timestamps.len());
        for (idx, ts) in timestamps.iter().enumerate() {
            let Some(ts) = ts.as_i64() else { continue };
            let Some(datetime) = DateTime::from_timestamp(ts, 0) else { continue };
            // skip sessions the venue reported without a complete bar
            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
                field("open", idx),
                field("high", idx),
                field("low", idx),
                field("close", idx),
                field("volume", idx),
            ) else {
                continue;
            };
            bars.push(DailyBar {
                date: datetime.date_naive(),
                open,
                high,
                low,
                close,
                volume,
            });
        }

        if bars.is_empty() {
            return Err(RotationError::empty_data(symbol, "no complete bars"));
        }
        Ok(PriceSeries::new(symbol, bars))
    }

    fn parse_fundamentals(payload: &Value) -> Fundamentals {
        let raw = |path: &str| -> Option<f64> {
            payload
                .pointer(&format!("/quoteSummary/result/0{}", path))
                .and_then(|v| v.pointer("/raw"))
                .and_then(Value::as_f64)
        };
        Fundamentals {
            trailing_pe: raw("/summaryDetail/trailingPE"),
            return_on_equity: raw("/financialData/returnOnEquity"),
            beta: raw("/summaryDetail/beta"),
            price_to_book: raw("/defaultKeyStatistics/priceToBook"),
        }
    }

    fn parse_contracts(value: Option<&Value>) -> Vec<OptionContract> {
        let Some(contracts) = value.and_then(Value::as_array) else {
            return Vec::new();
        };
        contracts
            .iter()
            .map(|c| OptionContract {
                strike: c.pointer("/strike").and_then(Value::as_f64).unwrap_or(0.0),
                volume: c.pointer("/volume").and_then(Value::as_f64),
                implied_volatility: c.pointer("/impliedVolatility").and_then(Value::as_f64),
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_history(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> RotationResult<PriceSeries> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let mut query: Vec<(&str, String)> = vec![("interval", "1d".to_string())];
        match range {
            HistoryRange::OneMonth => query.push(("range", "1mo".to_string())),
            HistoryRange::OneYear => query.push(("range", "1y".to_string())),
            HistoryRange::Dates { start, end } => {
                let to_unix = |d: NaiveDate| {
                    d.and_hms_opt(0, 0, 0)
                        .map(|dt| dt.and_utc().timestamp())
                        .unwrap_or_default()
                };
                query.push(("period1", to_unix(start).to_string()));
                query.push(("period2", to_unix(end).to_string()));
            }
        }
        let payload = self.get_json(&url, &query).await?;
        Self::parse_chart(symbol, &payload)
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> RotationResult<Fundamentals> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let query = vec![(
            "modules",
            "summaryDetail,financialData,defaultKeyStatistics".to_string(),
        )];
        let payload = self.get_json(&url, &query).await?;
        Ok(Self::parse_fundamentals(&payload))
    }

    async fn fetch_option_chain(
        &self,
        symbol: &str,
        expiry: NaiveDate,
    ) -> RotationResult<OptionChain> {
        let url = format!("{}/v7/finance/options/{}", self.base_url, symbol);
        let expiry_unix = expiry
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        let payload = self
            .get_json(&url, &[("date", expiry_unix.to_string())])
            .await?;

        let options = payload
            .pointer("/optionChain/result/0/options/0")
            .ok_or_else(|| RotationError::empty_data(symbol, "no option chain at expiry"))?;

        Ok(OptionChain {
            calls: Self::parse_contracts(options.pointer("/calls")),
            puts: Self::parse_contracts(options.pointer("/puts")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chart() {
        let payload = json!({
            "chart": {"result": [{
                "timestamp": [1704153600, 1704240000],
                "indicators": {"quote": [{
                    "open":   [10.0, 11.0],
                    "high":   [10.5, 11.5],
                    "low":    [9.5, 10.5],
                    "close":  [10.2, 11.2],
                    "volume": [1000.0, 2000.0]
                }]}
            }]}
        });
        let series = YahooClient::parse_chart("XLF", &payload).expect("series");
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars[0].close, 10.2);
        assert_eq!(series.bars[0].date.to_string(), "2024-01-02");
    }

    #[test]
    fn test_parse_chart_skips_incomplete_bars() {
        let payload = json!({
            "chart": {"result": [{
                "timestamp": [1704153600, 1704240000],
                "indicators": {"quote": [{
                    "open":   [10.0, 11.0],
                    "high":   [10.5, 11.5],
                    "low":    [9.5, 10.5],
                    "close":  [null, 11.2],
                    "volume": [1000.0, 2000.0]
                }]}
            }]}
        });
        let series = YahooClient::parse_chart("XLF", &payload).expect("series");
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_parse_chart_empty_is_error() {
        let payload = json!({"chart": {"result": [{"timestamp": [], "indicators": {"quote": [{}]}}]}});
        assert!(YahooClient::parse_chart("XLF", &payload).is_err());
    }

    #[test]
    fn test_parse_fundamentals_partial() {
        let payload = json!({
            "quoteSummary": {"result": [{
                "summaryDetail": {"trailingPE": {"raw": 21.5}},
                "financialData": {},
                "defaultKeyStatistics": {"priceToBook": {"raw": 3.1}}
            }]}
        });
        let fundamentals = YahooClient::parse_fundamentals(&payload);
        assert_eq!(fundamentals.trailing_pe, Some(21.5));
        assert_eq!(fundamentals.return_on_equity, None);
        assert_eq!(fundamentals.beta, None);
        assert_eq!(fundamentals.price_to_book, Some(3.1));
    }

    #[test]
    fn test_parse_contracts() {
        let value = json!([
            {"strike": 40.0, "volume": 12.0, "impliedVolatility": 0.3},
            {"strike": 45.0}
        ]);
        let contracts = YahooClient::parse_contracts(Some(&value));
        assert_eq!(contracts.len(), 2);
        assert_eq!(contracts[0].volume, Some(12.0));
        assert_eq!(contracts[1].volume, None);
    }
}
