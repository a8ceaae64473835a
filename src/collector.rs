//! Per-ticker financial snapshot collection and spreadsheet export.
//!
//! Each ticker is processed independently: fundamentals, latest quote,
//! RSI over the trailing month, option-chain sentiment, and a one-year
//! alpha/beta regression against the benchmark. A failure in any stage
//! drops that ticker with a warning and the run continues.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use ta::indicators::RelativeStrengthIndex;
use ta::Next;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::errors::{RotationError, RotationResult};
use crate::market::PriceSeries;
use crate::provider::{HistoryRange, MarketDataProvider};
use crate::regression;
use crate::settings::CollectorSettings;

/// RSI lookback for the snapshot quote.
pub const SNAPSHOT_RSI_PERIOD: usize = 14;

/// Output column order for both the CSV and the workbook.
pub const SNAPSHOT_COLUMNS: [&str; 13] = [
    "Ticker",
    "PE Ratio",
    "ROE",
    "Beta (info)",
    "PB Ratio",
    "Open Price",
    "Close Price",
    "Volume",
    "RSI",
    "Put/Call Ratio",
    "Implied Volatility",
    "Alpha",
    "Beta (regression)",
];

/// One collected row. Every numeric field may be individually unavailable
/// and exports as "N/A".
#[derive(Debug, Clone, Default)]
pub struct TickerSnapshot {
    pub ticker: String,
    pub pe_ratio: Option<f64>,
    pub roe: Option<f64>,
    pub beta_info: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub open_price: Option<f64>,
    pub close_price: Option<f64>,
    pub volume: Option<f64>,
    pub rsi: Option<f64>,
    pub put_call_ratio: Option<f64>,
    pub implied_volatility: Option<f64>,
    pub alpha: Option<f64>,
    pub beta_regression: Option<f64>,
}

impl TickerSnapshot {
    /// Numeric fields in [`SNAPSHOT_COLUMNS`] order, after the ticker.
    fn numeric_fields(&self) -> [Option<f64>; 12] {
        [
            self.pe_ratio,
            self.roe,
            self.beta_info,
            self.pb_ratio,
            self.open_price,
            self.close_price,
            self.volume,
            self.rsi,
            self.put_call_ratio,
            self.implied_volatility,
            self.alpha,
            self.beta_regression,
        ]
    }
}

/// Trailing RSI from a month of closes. Needs one full period of price
/// changes, otherwise the value is not meaningful and is left out.
fn snapshot_rsi(closes: &[f64]) -> RotationResult<Option<f64>> {
    if closes.len() <= SNAPSHOT_RSI_PERIOD {
        return Ok(None);
    }
    let mut indicator = RelativeStrengthIndex::new(SNAPSHOT_RSI_PERIOD)
        .map_err(|e| RotationError::parse("rsi", e.to_string()))?;
    let mut last = None;
    for close in closes {
        last = Some(indicator.next(*close));
    }
    Ok(last)
}

/// Regress one year of the ticker's daily returns on the benchmark's,
/// joined by calendar date.
fn alpha_beta(ticker: &PriceSeries, benchmark: &PriceSeries) -> Option<regression::Ols> {
    let bench_returns = benchmark.daily_returns();
    let pairs: Vec<(Option<f64>, Option<f64>)> = ticker
        .daily_returns()
        .iter()
        .filter_map(|(date, r)| {
            bench_returns
                .iter()
                .find(|(bd, _)| bd == date)
                .map(|(_, br)| (Some(*br), Some(*r)))
        })
        .collect();
    regression::ols(&pairs)
}

/// Collect one ticker's full snapshot, or `None` when any stage fails.
pub async fn collect_financial_data<P: MarketDataProvider>(
    provider: &P,
    ticker: &str,
    benchmark_symbol: &str,
    option_expiry: NaiveDate,
) -> Option<TickerSnapshot> {
    match collect_inner(provider, ticker, benchmark_symbol, option_expiry).await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!("skipping {}: {}", ticker, e);
            None
        }
    }
}

async fn collect_inner<P: MarketDataProvider>(
    provider: &P,
    ticker: &str,
    benchmark_symbol: &str,
    option_expiry: NaiveDate,
) -> RotationResult<TickerSnapshot> {
    let fundamentals = provider.fetch_fundamentals(ticker).await?;

    let month = provider
        .fetch_history(ticker, HistoryRange::OneMonth)
        .await?;
    let last = month
        .last_bar()
        .copied()
        .ok_or_else(|| RotationError::empty_data(ticker, "no trailing-month bars"))?;
    let rsi = snapshot_rsi(&month.closes()?)?;

    let chain = provider.fetch_option_chain(ticker, option_expiry).await?;

    let year = provider.fetch_history(ticker, HistoryRange::OneYear).await?;
    let benchmark_year = provider
        .fetch_history(benchmark_symbol, HistoryRange::OneYear)
        .await?;
    let fit = alpha_beta(&year, &benchmark_year);

    Ok(TickerSnapshot {
        ticker: ticker.to_string(),
        pe_ratio: fundamentals.trailing_pe,
        roe: fundamentals.return_on_equity,
        beta_info: fundamentals.beta,
        pb_ratio: fundamentals.price_to_book,
        open_price: Some(last.open),
        close_price: Some(last.close),
        volume: Some(last.volume),
        rsi,
        put_call_ratio: chain.put_call_ratio(),
        implied_volatility: chain.mean_call_iv(),
        alpha: fit.as_ref().map(|f| f.alpha),
        beta_regression: fit.as_ref().map(|f| f.beta),
    })
}

/// Collect every symbol in order, pacing requests per the settings.
pub async fn run_collection<P: MarketDataProvider>(
    provider: &P,
    symbols: &[String],
    settings: &CollectorSettings,
    option_expiry: NaiveDate,
) -> Vec<TickerSnapshot> {
    let mut snapshots = Vec::new();
    for (i, symbol) in symbols.iter().enumerate() {
        info!("collecting {} ({}/{})", symbol, i + 1, symbols.len());
        if let Some(snapshot) =
            collect_financial_data(provider, symbol, &settings.benchmark_symbol, option_expiry)
                .await
        {
            snapshots.push(snapshot);
        }
        if i + 1 < symbols.len() && settings.request_pause_ms > 0 {
            sleep(Duration::from_millis(settings.request_pause_ms)).await;
        }
    }
    info!(
        "collected {} of {} tickers",
        snapshots.len(),
        symbols.len()
    );
    snapshots
}

/// Assemble snapshots into a frame with the [`SNAPSHOT_COLUMNS`] layout.
pub fn snapshots_to_frame(snapshots: &[TickerSnapshot]) -> RotationResult<DataFrame> {
    let tickers: Vec<String> = snapshots.iter().map(|s| s.ticker.clone()).collect();
    let mut columns = vec![Column::new(SNAPSHOT_COLUMNS[0].into(), tickers)];
    for (offset, name) in SNAPSHOT_COLUMNS[1..].iter().enumerate() {
        let values: Vec<Option<f64>> = snapshots
            .iter()
            .map(|s| s.numeric_fields()[offset])
            .collect();
        columns.push(Column::new((*name).into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

fn dated_path(output_dir: &Path, extension: &str) -> PathBuf {
    let stamp = Local::now().date_naive().format("%Y-%m-%d");
    output_dir.join(format!("sp500_financial_data_{}.{}", stamp, extension))
}

fn write_csv(frame: &mut DataFrame, path: &Path) -> RotationResult<()> {
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_null_value("N/A".into())
        .finish(frame)?;
    Ok(())
}

fn write_xlsx(snapshots: &[TickerSnapshot], path: &Path) -> RotationResult<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in SNAPSHOT_COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (i, snapshot) in snapshots.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &snapshot.ticker)?;
        for (offset, value) in snapshot.numeric_fields().iter().enumerate() {
            let col = (offset + 1) as u16;
            match value {
                Some(v) => sheet.write_number(row, col, *v)?,
                None => sheet.write_string(row, col, "N/A")?,
            };
        }
    }
    workbook.save(path)?;
    Ok(())
}

/// Write the dated CSV and workbook, returning their paths.
pub fn write_artifacts(
    snapshots: &[TickerSnapshot],
    output_dir: &Path,
) -> RotationResult<(PathBuf, PathBuf)> {
    let mut frame = snapshots_to_frame(snapshots)?;
    let csv_path = dated_path(output_dir, "csv");
    write_csv(&mut frame, &csv_path)?;
    let xlsx_path = dated_path(output_dir, "xlsx");
    write_xlsx(snapshots, &xlsx_path)?;
    info!("wrote {} and {}", csv_path.display(), xlsx_path.display());
    Ok((csv_path, xlsx_path))
}
