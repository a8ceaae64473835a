//! Feature builder: turns an ETF series plus a benchmark series into the
//! supervised-learning feature table.
//!
//! Every transform is pure and independent given the close column. Undefined
//! entries (insufficient window history, zero denominators) become polars
//! nulls and any row containing one is dropped, so the returned frame only
//! holds dates with full lookback coverage.

use polars::prelude::*;

use crate::errors::{RotationError, RotationResult};
use crate::indicators;
use crate::labels::{self, LABEL_HORIZON};
use crate::market::PriceSeries;

/// Moving-average lookbacks; the longest determines the head trim.
pub const MA_WINDOWS: [usize; 4] = [20, 50, 100, 200];
/// RSI lookbacks.
pub const RSI_WINDOWS: [usize; 3] = [6, 12, 24];
/// Lagged-return depth.
pub const RETURN_LAGS: usize = 5;

pub const COL_DATE: &str = "date";
pub const COL_PRICE: &str = "price";
pub const COL_BENCHMARK: &str = "benchmark_price";
pub const COL_TARGET: &str = "target";

/// Columns excluded from the model's feature matrix.
pub const EXCLUDED_FEATURE_COLS: [&str; 4] = [COL_DATE, COL_PRICE, COL_BENCHMARK, COL_TARGET];

/// Restrict a column identifier to `[A-Za-z0-9_]` for downstream
/// compatibility with the training side.
pub fn sanitize_column_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

fn ratio(numer: &[Option<f64>], denom: &[f64]) -> Vec<Option<f64>> {
    numer
        .iter()
        .zip(denom.iter())
        .map(|(n, &d)| {
            let n = (*n)?;
            if d == 0.0 {
                None
            } else {
                Some(n / d)
            }
        })
        .collect()
}

fn opt_ratio(numer: &[Option<f64>], denom: &[Option<f64>]) -> Vec<Option<f64>> {
    numer
        .iter()
        .zip(denom.iter())
        .map(|(n, d)| {
            let n = (*n)?;
            let d = (*d)?;
            if d == 0.0 {
                None
            } else {
                Some(n / d)
            }
        })
        .collect()
}

/// Compute all feature columns over the aligned close series.
///
/// No rows are dropped here; callers decide whether a label column joins the
/// frame before the null-drop.
fn assemble_columns(
    dates: &[chrono::NaiveDate],
    price: &[f64],
    benchmark: &[f64],
) -> Vec<Column> {
    let mut columns: Vec<Column> = Vec::new();

    let date_strings: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
    columns.push(Column::new(COL_DATE.into(), date_strings));
    columns.push(Column::new(COL_PRICE.into(), price.to_vec()));
    columns.push(Column::new(COL_BENCHMARK.into(), benchmark.to_vec()));

    for lag in 1..=RETURN_LAGS {
        columns.push(Column::new(
            sanitize_column_name(&format!("return_{}", lag)).into(),
            indicators::pct_change(price, lag),
        ));
    }

    for window in RSI_WINDOWS {
        columns.push(Column::new(
            sanitize_column_name(&format!("rsi_{}", window)).into(),
            indicators::rsi(price, window),
        ));
    }

    let mut ma_gaps: Vec<(usize, Vec<Option<f64>>)> = Vec::new();
    for window in MA_WINDOWS {
        let ma = indicators::rolling_mean(price, window);
        let gap: Vec<Option<f64>> = ma
            .iter()
            .zip(price.iter())
            .map(|(m, &p)| {
                let m = (*m)?;
                if p == 0.0 {
                    None
                } else {
                    Some((m - p) / p)
                }
            })
            .collect();
        columns.push(Column::new(
            sanitize_column_name(&format!("ma{}_ratio", window)).into(),
            ratio(&ma, price),
        ));
        columns.push(Column::new(
            sanitize_column_name(&format!("ma{}_gap", window)).into(),
            gap.clone(),
        ));
        ma_gaps.push((window, gap));
    }

    let benchmark_returns = indicators::pct_change(benchmark, 1);
    columns.push(Column::new(
        "benchmark_mean_return_20".into(),
        indicators::rolling_mean_opt(&benchmark_returns, 20),
    ));

    let (macd_line, signal, histogram) = indicators::macd(price, 12, 26, 9);
    columns.push(Column::new("macd".into(), macd_line));
    columns.push(Column::new("macd_signal".into(), signal));
    columns.push(Column::new("macd_histogram".into(), histogram));

    for window in [20usize, 5] {
        columns.push(Column::new(
            sanitize_column_name(&format!("high{}_ratio", window)).into(),
            ratio(&indicators::rolling_max(price, window), price),
        ));
        columns.push(Column::new(
            sanitize_column_name(&format!("low{}_ratio", window)).into(),
            ratio(&indicators::rolling_min(price, window), price),
        ));
    }

    // derived columns: ETF-to-benchmark price ratio and MA-gap ratios
    let price_opt: Vec<Option<f64>> = price.iter().map(|&p| Some(p)).collect();
    columns.push(Column::new(
        "price_to_benchmark".into(),
        ratio(&price_opt, benchmark),
    ));

    let gap20 = &ma_gaps[0].1;
    let gap50 = &ma_gaps[1].1;
    let gap100 = &ma_gaps[2].1;
    columns.push(Column::new(
        "ma_gap_20_to_50".into(),
        opt_ratio(gap20, gap50),
    ));
    columns.push(Column::new(
        "ma_gap_20_to_100".into(),
        opt_ratio(gap20, gap100),
    ));

    columns
}

/// Align the two series on date; fails when either carries no closes or the
/// calendars do not overlap.
fn aligned_closes(
    etf: &PriceSeries,
    benchmark: &PriceSeries,
) -> RotationResult<(Vec<chrono::NaiveDate>, Vec<f64>, Vec<f64>)> {
    etf.closes()?;
    benchmark.closes()?;

    let (dates, price, bench) = etf.align_closes(benchmark);
    if dates.is_empty() {
        return Err(RotationError::empty_data(
            etf.symbol.clone(),
            format!("no overlapping dates with {}", benchmark.symbol),
        ));
    }
    Ok((dates, price, bench))
}

/// Feature table without labels; rows with any undefined entry are dropped.
pub fn build_feature_frame(
    etf: &PriceSeries,
    benchmark: &PriceSeries,
) -> RotationResult<DataFrame> {
    let (dates, price, bench) = aligned_closes(etf, benchmark)?;
    let df = DataFrame::new(assemble_columns(&dates, &price, &bench))?;
    Ok(df.lazy().drop_nulls(None).collect()?)
}

/// Feature table with the 5-day forward-return target attached; the label
/// tail and every insufficient-history row fall out in one null-drop.
pub fn build_labeled_frame(
    etf: &PriceSeries,
    benchmark: &PriceSeries,
) -> RotationResult<DataFrame> {
    let (dates, price, bench) = aligned_closes(etf, benchmark)?;
    let mut columns = assemble_columns(&dates, &price, &bench);
    columns.push(Column::new(
        COL_TARGET.into(),
        labels::binary_labels(&price, LABEL_HORIZON),
    ));
    let df = DataFrame::new(columns)?;
    Ok(df.lazy().drop_nulls(None).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::DailyBar;
    use chrono::{Duration, NaiveDate};

    fn synthetic_series(symbol: &str, len: usize, skip_head: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
        let bars = (skip_head..len)
            .map(|i| {
                // upward drift with a small deterministic wobble
                let close = 100.0 + 0.3 * i as f64 + 0.2 * ((i % 7) as f64);
                DailyBar {
                    date: start + Duration::days(i as i64),
                    open: close - 0.1,
                    high: close + 0.5,
                    low: close - 0.5,
                    close,
                    volume: 1_000.0 + i as f64,
                }
            })
            .collect();
        PriceSeries::new(symbol, bars)
    }

    #[test]
    fn test_missing_close_column_fails() {
        let etf = PriceSeries::new("XLF", vec![]);
        let bench = synthetic_series("^GSPC", 300, 0);
        assert!(build_feature_frame(&etf, &bench).is_err());
    }

    #[test]
    fn test_row_count_equals_len_minus_longest_window() {
        let etf = synthetic_series("XLF", 300, 0);
        let bench = synthetic_series("^GSPC", 300, 0);
        let df = build_feature_frame(&etf, &bench).expect("frame");
        assert_eq!(df.height(), 300 - 200);
    }

    #[test]
    fn test_row_count_accounts_for_misalignment() {
        let etf = synthetic_series("XLF", 300, 0);
        // benchmark misses the first 10 calendar days
        let bench = synthetic_series("^GSPC", 300, 10);
        let df = build_feature_frame(&etf, &bench).expect("frame");
        assert_eq!(df.height(), 290 - 200);
    }

    #[test]
    fn test_labeled_frame_end_to_end() {
        let etf = synthetic_series("XLF", 300, 0);
        let bench = synthetic_series("^GSPC", 300, 0);
        let df = build_labeled_frame(&etf, &bench).expect("frame");
        // 300 - 200 (longest MA window) - 5 (forward-label window)
        assert_eq!(df.height(), 95);

        let target = df
            .column(COL_TARGET)
            .expect("target column")
            .u32()
            .expect("u32 labels");
        assert_eq!(target.null_count(), 0);
        for value in target.into_iter().flatten() {
            assert!(value == 0 || value == 1);
        }
    }

    #[test]
    fn test_feature_columns_present_and_sanitized() {
        let etf = synthetic_series("XLF", 300, 0);
        let bench = synthetic_series("^GSPC", 300, 0);
        let df = build_feature_frame(&etf, &bench).expect("frame");
        for name in ["return_1", "rsi_24", "ma200_ratio", "macd_histogram", "high5_ratio"] {
            assert!(df.column(name).is_ok(), "missing column {}", name);
        }
        for name in df.get_column_names() {
            let name = name.to_string();
            assert_eq!(name, sanitize_column_name(&name));
        }
    }

    #[test]
    fn test_sanitize_column_name() {
        assert_eq!(sanitize_column_name("('Close', 'XLF')"), "CloseXLF");
        assert_eq!(sanitize_column_name("ma20_gap"), "ma20_gap");
        assert_eq!(sanitize_column_name("P/E ratio!"), "PEratio");
    }
}
