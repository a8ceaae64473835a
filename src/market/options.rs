//! Option-chain snapshot at a single expiry.

use serde::{Deserialize, Serialize};

/// One listed contract. Volume and implied volatility are frequently absent
/// upstream, so both are optional.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: f64,
    pub volume: Option<f64>,
    pub implied_volatility: Option<f64>,
}

/// Calls and puts at one expiry date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionChain {
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

impl OptionChain {
    fn volume_sum(contracts: &[OptionContract]) -> f64 {
        contracts.iter().filter_map(|c| c.volume).sum()
    }

    /// Put/call volume ratio. `None` when call volume sums to zero: the
    /// ratio is undefined there, never infinity.
    pub fn put_call_ratio(&self) -> Option<f64> {
        let call_volume = Self::volume_sum(&self.calls);
        if call_volume == 0.0 {
            return None;
        }
        Some(Self::volume_sum(&self.puts) / call_volume)
    }

    /// Mean implied volatility across calls that report one.
    pub fn mean_call_iv(&self) -> Option<f64> {
        let ivs: Vec<f64> = self
            .calls
            .iter()
            .filter_map(|c| c.implied_volatility)
            .collect();
        if ivs.is_empty() {
            return None;
        }
        Some(ivs.iter().sum::<f64>() / ivs.len() as f64)
    }
}
