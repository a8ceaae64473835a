//! Forward-return label construction.

/// Horizon used by the rotation classifier.
pub const LABEL_HORIZON: usize = 5;

/// Percentage change from day t to day t+horizon.
///
/// The last `horizon` entries have no forward window and are `None`.
pub fn forward_returns(closes: &[f64], horizon: usize) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|t| {
            let future = closes.get(t + horizon)?;
            if closes[t] == 0.0 {
                None
            } else {
                Some(future / closes[t] - 1.0)
            }
        })
        .collect()
}

/// Binary label: 1 iff the forward return is strictly positive.
///
/// Unlabeled rows stay `None` so the feature table's null-drop removes them.
pub fn binary_labels(closes: &[f64], horizon: usize) -> Vec<Option<u32>> {
    forward_returns(closes, horizon)
        .into_iter()
        .map(|r| r.map(|v| u32::from(v > 0.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_return_values() {
        let closes = vec![100.0, 101.0, 102.0, 103.0, 104.0, 110.0, 99.0];
        let fwd = forward_returns(&closes, 5);
        assert!((fwd[0].expect("defined") - 0.10).abs() < 1e-12);
        assert!(fwd[1].expect("defined") < 0.0);
        assert!(fwd[2].is_none());
        assert!(fwd[6].is_none());
    }

    #[test]
    fn test_labels_match_forward_sign() {
        // up 10% over 5 days from index 0, down from index 1
        let closes = vec![100.0, 101.0, 102.0, 103.0, 104.0, 110.0, 99.0];
        let labels = binary_labels(&closes, 5);
        assert_eq!(labels[0], Some(1));
        assert_eq!(labels[1], Some(0));
        for label in &labels[2..] {
            assert!(label.is_none());
        }
    }

    #[test]
    fn test_zero_forward_return_labeled_down() {
        let closes = vec![100.0; 7];
        let labels = binary_labels(&closes, 5);
        // strictly positive required for an up label
        assert_eq!(labels[0], Some(0));
    }

    #[test]
    fn test_short_series_entirely_unlabeled() {
        let closes = vec![100.0, 101.0, 102.0];
        assert!(binary_labels(&closes, 5).iter().all(Option::is_none));
    }
}
