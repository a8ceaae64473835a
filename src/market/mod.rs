//! Market data objects: daily price series and option-chain snapshots.

pub mod options;
pub mod series;

pub use options::{OptionChain, OptionContract};
pub use series::{DailyBar, PriceSeries};
