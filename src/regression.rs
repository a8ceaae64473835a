//! Ordinary least squares alpha/beta against a benchmark return series.

/// OLS fit of asset returns on benchmark returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ols {
    /// Intercept: return unexplained by the benchmark
    pub alpha: f64,
    /// Slope: sensitivity to the benchmark
    pub beta: f64,
}

/// Fit `y = alpha + beta * x` by least squares.
///
/// Pairs where either side is missing are skipped. Returns `None` when no
/// complete pairs remain or when the regressor has zero variance, the two
/// degenerate cases the collector reports as not-available.
pub fn ols(pairs: &[(Option<f64>, Option<f64>)]) -> Option<Ols> {
    let data: Vec<(f64, f64)> = pairs
        .iter()
        .filter_map(|(x, y)| Some((((*x)?), ((*y)?))))
        .collect();
    if data.is_empty() {
        return None;
    }

    let n = data.len() as f64;
    let mean_x = data.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = data.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    for (x, y) in &data {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x) * (x - mean_x);
    }

    if var_x == 0.0 {
        return None;
    }

    let beta = cov / var_x;
    let alpha = mean_y - beta * mean_x;
    Some(Ols { alpha, beta })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_perfectly_correlated_series() {
        // stock = 2 * benchmark + 0.001
        let pairs: Vec<(Option<f64>, Option<f64>)> = (0..252)
            .map(|i| {
                let x = ((i * 31) % 17) as f64 / 1000.0 - 0.008;
                (Some(x), Some(2.0 * x + 0.001))
            })
            .collect();
        let fit = ols(&pairs).expect("defined");
        assert!((fit.beta - 2.0).abs() < 1e-9);
        assert!((fit.alpha - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_empty_overlap() {
        let pairs = vec![(None, Some(0.01)), (Some(0.02), None)];
        assert!(ols(&pairs).is_none());
    }

    #[test]
    fn test_zero_variance_regressor() {
        let pairs = vec![(Some(0.01), Some(0.02)), (Some(0.01), Some(0.05))];
        assert!(ols(&pairs).is_none());
    }

    #[test]
    fn test_skips_incomplete_pairs() {
        let pairs = vec![
            (Some(0.0), Some(1.0)),
            (None, Some(100.0)),
            (Some(1.0), Some(3.0)),
        ];
        let fit = ols(&pairs).expect("defined");
        assert!((fit.beta - 2.0).abs() < 1e-12);
        assert!((fit.alpha - 1.0).abs() < 1e-12);
    }
}
