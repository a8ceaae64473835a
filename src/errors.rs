//! Error types for the sector-rotation pipeline.

use thiserror::Error;

/// All error conditions the pipeline can surface.
///
/// Per-ticker collection failures are deliberately *not* propagated through
/// this type: the collector logs them and skips the ticker. The enum covers
/// everything that should stop the caller.
#[derive(Error, Debug)]
pub enum RotationError {
    /// Upstream HTTP request failed or returned a non-success status
    #[error("fetch failed: {operation} - {reason}")]
    Fetch { operation: String, reason: String },

    /// Upstream payload could not be parsed into the expected shape
    #[error("parse failed: {data_type} - {reason}")]
    Parse { data_type: String, reason: String },

    /// A required column is absent from a price series or data frame
    #[error("missing column: {column}")]
    MissingColumn { column: String },

    /// A fetch returned no usable rows
    #[error("no data for {symbol}: {reason}")]
    EmptyData { symbol: String, reason: String },

    /// DataFrame construction or manipulation failed
    #[error("dataframe error: {0}")]
    Frame(#[from] polars::error::PolarsError),

    /// Spreadsheet export failed
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// File I/O failed
    #[error("io error: {operation} - {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Model training or evaluation was handed unusable input
    #[error("model error: {0}")]
    Model(String),
}

/// Result alias used across the crate.
pub type RotationResult<T> = Result<T, RotationError>;

impl RotationError {
    pub fn fetch(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(data_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            data_type: data_type.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn empty_data(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EmptyData {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for RotationError {
    fn from(error: reqwest::Error) -> Self {
        let operation = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "http request".to_string());
        RotationError::Fetch {
            operation,
            reason: error.to_string(),
        }
    }
}

impl From<std::io::Error> for RotationError {
    fn from(error: std::io::Error) -> Self {
        RotationError::Io {
            operation: "file io".to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = RotationError::empty_data("XLF", "no 1y history");
        assert_eq!(error.to_string(), "no data for XLF: no 1y history");
    }

    #[test]
    fn test_missing_column() {
        let error = RotationError::missing_column("close");
        match error {
            RotationError::MissingColumn { column } => assert_eq!(column, "close"),
            _ => panic!("wrong error variant"),
        }
    }
}
