//! Market data provider abstraction and the Yahoo Finance implementation.

pub mod universe;
pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::RotationResult;
use crate::market::{OptionChain, PriceSeries};

pub use universe::{fetch_sp500_symbols, parse_constituent_table, SP500_CONSTITUENTS_URL};
pub use yahoo::YahooClient;

/// History lookback passed to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    /// Trailing month of daily bars
    OneMonth,
    /// Trailing year of daily bars
    OneYear,
    /// Explicit date window
    Dates { start: NaiveDate, end: NaiveDate },
}

/// Company fundamentals; every field may be individually unavailable.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Fundamentals {
    pub trailing_pe: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub beta: Option<f64>,
    pub price_to_book: Option<f64>,
}

/// Upstream market-data source.
///
/// The collector and the feature pipeline only talk to this trait, so tests
/// substitute an in-memory provider for the HTTP client.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily OHLCV history for one symbol.
    async fn fetch_history(&self, symbol: &str, range: HistoryRange)
        -> RotationResult<PriceSeries>;

    /// Fundamentals snapshot for one symbol.
    async fn fetch_fundamentals(&self, symbol: &str) -> RotationResult<Fundamentals>;

    /// Option chain for one symbol at a given expiry date.
    async fn fetch_option_chain(
        &self,
        symbol: &str,
        expiry: NaiveDate,
    ) -> RotationResult<OptionChain>;
}
