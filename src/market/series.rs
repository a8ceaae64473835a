//! Daily OHLCV series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{RotationError, RotationResult};

/// One trading day of a single instrument.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Ordered-by-date series of daily bars for one instrument.
///
/// Dates are `NaiveDate`, so series from different venues align by calendar
/// date without any timezone normalization step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<DailyBar>,
}

impl PriceSeries {
    /// Build a series, sorting bars by date.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<DailyBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Closing prices in date order. Errors when the series carries no bars,
    /// which is the "missing close column" contract of the feature builder.
    pub fn closes(&self) -> RotationResult<Vec<f64>> {
        if self.bars.is_empty() {
            return Err(RotationError::missing_column(format!(
                "close ({})",
                self.symbol
            )));
        }
        Ok(self.bars.iter().map(|b| b.close).collect())
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn last_bar(&self) -> Option<&DailyBar> {
        self.bars.last()
    }

    /// Day-over-day simple returns keyed by date; the first day has none.
    pub fn daily_returns(&self) -> Vec<(NaiveDate, f64)> {
        self.bars
            .windows(2)
            .filter(|w| w[0].close != 0.0)
            .map(|w| (w[1].date, w[1].close / w[0].close - 1.0))
            .collect()
    }

    /// Inner-join two series on date, returning (dates, self closes, other closes).
    pub fn align_closes(&self, other: &PriceSeries) -> (Vec<NaiveDate>, Vec<f64>, Vec<f64>) {
        let mut dates = Vec::new();
        let mut left = Vec::new();
        let mut right = Vec::new();

        let mut i = 0;
        let mut j = 0;
        while i < self.bars.len() && j < other.bars.len() {
            let a = &self.bars[i];
            let b = &other.bars[j];
            if a.date == b.date {
                dates.push(a.date);
                left.push(a.close);
                right.push(b.close);
                i += 1;
                j += 1;
            } else if a.date < b.date {
                i += 1;
            } else {
                j += 1;
            }
        }

        (dates, left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> DailyBar {
        DailyBar {
            date: date.parse().expect("valid date"),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_empty_series_has_no_close_column() {
        let series = PriceSeries::new("XLF", vec![]);
        assert!(series.closes().is_err());
    }

    #[test]
    fn test_align_skips_unshared_dates() {
        let etf = PriceSeries::new(
            "XLF",
            vec![bar("2024-01-02", 10.0), bar("2024-01-03", 11.0), bar("2024-01-04", 12.0)],
        );
        let bench = PriceSeries::new(
            "^GSPC",
            vec![bar("2024-01-03", 100.0), bar("2024-01-04", 101.0), bar("2024-01-05", 102.0)],
        );

        let (dates, left, right) = etf.align_closes(&bench);
        assert_eq!(dates.len(), 2);
        assert_eq!(left, vec![11.0, 12.0]);
        assert_eq!(right, vec![100.0, 101.0]);
    }

    #[test]
    fn test_daily_returns() {
        let series = PriceSeries::new(
            "XLF",
            vec![bar("2024-01-02", 10.0), bar("2024-01-03", 11.0)],
        );
        let returns = series.daily_returns();
        assert_eq!(returns.len(), 1);
        assert!((returns[0].1 - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_bars_sorted_on_construction() {
        let series = PriceSeries::new(
            "XLF",
            vec![bar("2024-01-04", 12.0), bar("2024-01-02", 10.0)],
        );
        assert_eq!(series.bars[0].close, 10.0);
    }
}
