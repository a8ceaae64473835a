//! Sector Rotation - S&P 500 data collection and sector-ETF classification
//!
//! This crate provides two pipelines over daily Yahoo Finance data:
//!
//! - A constituent collector that snapshots fundamentals, quote, RSI,
//!   option-chain sentiment, and benchmark alpha/beta for each S&P 500
//!   ticker, exporting a dated CSV and workbook
//! - A sector-ETF research pipeline that engineers momentum and trend
//!   features, labels five-day-forward outcomes, and trains a
//!   gradient-boosted classifier with a seeded holdout evaluation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sector_rotation::provider::{HistoryRange, MarketDataProvider, YahooClient};
//!
//! #[tokio::main]
//! async fn main() -> sector_rotation::RotationResult<()> {
//!     let client = YahooClient::new()?;
//!     let history = client.fetch_history("XLF", HistoryRange::OneYear).await?;
//!     println!("{} bars", history.len());
//!     Ok(())
//! }
//! ```

pub mod collector;
pub mod dataset;
pub mod errors;
pub mod features;
pub mod indicators;
pub mod labels;
pub mod logging;
pub mod market;
pub mod model;
pub mod provider;
pub mod regression;
pub mod settings;

// Re-export commonly used types
pub use collector::{collect_financial_data, run_collection, write_artifacts, TickerSnapshot};
pub use dataset::{RotationDataset, TrainTestSplit};
pub use errors::{RotationError, RotationResult};
pub use features::{build_feature_frame, build_labeled_frame};
pub use labels::{binary_labels, forward_returns, LABEL_HORIZON};
pub use market::{DailyBar, OptionChain, OptionContract, PriceSeries};
pub use model::{GbmModel, GbmParams};
pub use provider::{
    fetch_sp500_symbols, Fundamentals, HistoryRange, MarketDataProvider, YahooClient,
};
pub use settings::{Settings, SETTINGS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
