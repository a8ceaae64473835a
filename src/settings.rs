//! Runtime settings for both pipeline binaries.
//!
//! Settings live in an optional `rotation_settings.json` next to the working
//! directory; a missing or unreadable file falls back to the defaults below.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Settings file name looked up in the working directory.
pub const SETTINGS_FILE: &str = "rotation_settings.json";

/// Settings for the constituent collector binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    /// Benchmark index symbol for the alpha/beta regression
    pub benchmark_symbol: String,
    /// Option expiry passed to the option-chain lookup (YYYY-MM-DD)
    pub option_expiry: String,
    /// Pause between per-ticker fetches, in milliseconds
    pub request_pause_ms: u64,
    /// Directory the dated CSV/XLSX artifacts are written to
    pub output_dir: String,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            benchmark_symbol: "^GSPC".to_string(),
            option_expiry: "2025-01-17".to_string(),
            request_pause_ms: 1000,
            output_dir: ".".to_string(),
        }
    }
}

/// Settings for the feature/model pipeline binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Sector ETF whose forward return is classified
    pub etf_symbol: String,
    /// Benchmark index symbol
    pub benchmark_symbol: String,
    /// History start date (YYYY-MM-DD)
    pub start_date: String,
    /// History end date (YYYY-MM-DD)
    pub end_date: String,
    /// Held-out fraction for evaluation
    pub test_size: f64,
    /// Split seed
    pub seed: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            etf_symbol: "XLF".to_string(),
            benchmark_symbol: "^GSPC".to_string(),
            start_date: "2017-01-01".to_string(),
            end_date: "2025-01-01".to_string(),
            test_size: 0.2,
            seed: 42,
        }
    }
}

/// Combined settings document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub collector: CollectorSettings,
    pub pipeline: PipelineSettings,
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("invalid settings file {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

/// Global settings, loaded once from the working directory.
pub static SETTINGS: Lazy<Settings> = Lazy::new(|| Settings::load(Path::new(SETTINGS_FILE)));
