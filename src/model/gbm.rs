//! Gradient-boosted regression trees over binary labels.
//!
//! Boosting runs in probability space: the ensemble starts at 0.5 and each
//! round fits a depth-limited tree to the label/prediction residuals. Fitting
//! is fully deterministic, so a seeded split reproduces the same model.

use serde::{Deserialize, Serialize};

use crate::errors::{RotationError, RotationResult};

/// Candidate split thresholds examined per feature at each node.
const SPLIT_CANDIDATES: usize = 16;

/// Boosting hyperparameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GbmParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 6,
            min_samples_leaf: 5,
        }
    }
}

/// One node of a fitted regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, row: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

/// Fitted boosted ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbmModel {
    params: GbmParams,
    feature_names: Vec<String>,
    trees: Vec<TreeNode>,
    importance: Vec<f64>,
}

impl GbmModel {
    /// Fit an ensemble on a dense matrix of feature rows and binary labels.
    pub fn fit(
        params: GbmParams,
        x: &[Vec<f64>],
        y: &[u32],
        feature_names: &[String],
    ) -> RotationResult<Self> {
        if x.is_empty() {
            return Err(RotationError::Model("no training rows".to_string()));
        }
        if x.len() != y.len() {
            return Err(RotationError::Model(format!(
                "row/label mismatch: {} rows, {} labels",
                x.len(),
                y.len()
            )));
        }
        let n_features = x[0].len();
        if n_features != feature_names.len() {
            return Err(RotationError::Model(format!(
                "feature mismatch: {} columns, {} names",
                n_features,
                feature_names.len()
            )));
        }

        let mut model = Self {
            params,
            feature_names: feature_names.to_vec(),
            trees: Vec::with_capacity(params.n_estimators),
            importance: vec![0.0; n_features],
        };

        let targets: Vec<f64> = y.iter().map(|&label| f64::from(label)).collect();
        let mut predictions = vec![0.5; x.len()];
        let all_rows: Vec<usize> = (0..x.len()).collect();

        for _ in 0..params.n_estimators {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(&predictions)
                .map(|(t, p)| t - p)
                .collect();

            let tree = model.fit_node(x, &residuals, &all_rows, 0);
            for (i, row) in x.iter().enumerate() {
                predictions[i] =
                    (predictions[i] + params.learning_rate * tree.predict(row)).clamp(0.0, 1.0);
            }
            model.trees.push(tree);
        }

        let total: f64 = model.importance.iter().sum();
        if total > 0.0 {
            for gain in &mut model.importance {
                *gain /= total;
            }
        }
        Ok(model)
    }

    /// Grow one node over the given row subset, splitting greedily on sum
    /// of squared residuals.
    fn fit_node(
        &mut self,
        x: &[Vec<f64>],
        residuals: &[f64],
        rows: &[usize],
        depth: usize,
    ) -> TreeNode {
        let mean = rows.iter().map(|&i| residuals[i]).sum::<f64>() / rows.len() as f64;
        if depth >= self.params.max_depth || rows.len() < 2 * self.params.min_samples_leaf {
            return TreeNode::Leaf { value: mean };
        }

        let node_sse: f64 = rows.iter().map(|&i| (residuals[i] - mean).powi(2)).sum();
        let Some((feature, threshold, gain)) = self.best_split(x, residuals, rows, node_sse) else {
            return TreeNode::Leaf { value: mean };
        };
        self.importance[feature] += gain;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|&i| x[i][feature] <= threshold);
        let left = self.fit_node(x, residuals, &left_rows, depth + 1);
        let right = self.fit_node(x, residuals, &right_rows, depth + 1);
        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Best (feature, threshold) by SSE reduction, or `None` when no split
    /// beats the parent node.
    fn best_split(
        &self,
        x: &[Vec<f64>],
        residuals: &[f64],
        rows: &[usize],
        node_sse: f64,
    ) -> Option<(usize, f64, f64)> {
        let n_features = self.feature_names.len();
        let mut best: Option<(usize, f64, f64)> = None;

        for feature in 0..n_features {
            let mut values: Vec<(f64, f64)> = rows
                .iter()
                .map(|&i| (x[i][feature], residuals[i]))
                .collect();
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            let step = (values.len() / SPLIT_CANDIDATES).max(1);
            for split_idx in
                (self.params.min_samples_leaf..values.len().saturating_sub(self.params.min_samples_leaf))
                    .step_by(step)
            {
                let threshold = values[split_idx - 1].0;
                if values[split_idx].0 <= threshold {
                    continue; // tied values, not a real boundary
                }

                let (left, right) = values.split_at(split_idx);
                let gain = node_sse - sse(left) - sse(right);
                if gain <= 0.0 {
                    continue;
                }
                if best.map_or(true, |(_, _, g)| gain > g) {
                    best = Some((feature, threshold, gain));
                }
            }
        }
        best
    }

    /// Class-1 probability for each row.
    pub fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| {
                let mut prediction = 0.5;
                for tree in &self.trees {
                    prediction += self.params.learning_rate * tree.predict(row);
                }
                prediction.clamp(0.0, 1.0)
            })
            .collect()
    }

    /// Hard labels at the 0.5 boundary.
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<u32> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| u32::from(p > 0.5))
            .collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Normalized split gains per feature, most important first.
    pub fn feature_importance(&self) -> Vec<(String, f64)> {
        let mut pairs: Vec<(String, f64)> = self
            .feature_names
            .iter()
            .cloned()
            .zip(self.importance.iter().copied())
            .collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs
    }
}

fn sse(values: &[(f64, f64)]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().map(|(_, r)| r).sum::<f64>() / values.len() as f64;
    values.iter().map(|(_, r)| (r - mean).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Class 1 iff the first feature is positive; the second is noise.
    fn separable_data() -> (Vec<Vec<f64>>, Vec<u32>, Vec<String>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..120 {
            let x1 = (i as f64) / 60.0 - 1.0;
            let x2 = ((i as f64) / 7.0).sin();
            x.push(vec![x1, x2]);
            y.push(u32::from(x1 > 0.0));
        }
        (x, y, vec!["signal".to_string(), "noise".to_string()])
    }

    #[test]
    fn test_fit_learns_separable_boundary() {
        let (x, y, names) = separable_data();
        let model = GbmModel::fit(GbmParams::default(), &x, &y, &names).unwrap();

        let predictions = model.predict(&x);
        let correct = predictions.iter().zip(&y).filter(|(p, l)| p == l).count();
        assert!(correct as f64 / y.len() as f64 > 0.95);
        assert_eq!(model.n_trees(), 100);
    }

    #[test]
    fn test_probabilities_stay_bounded() {
        let (x, y, names) = separable_data();
        let model = GbmModel::fit(GbmParams::default(), &x, &y, &names).unwrap();
        for p in model.predict_proba(&x) {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_importance_prefers_informative_feature() {
        let (x, y, names) = separable_data();
        let model = GbmModel::fit(GbmParams::default(), &x, &y, &names).unwrap();
        let importance = model.feature_importance();
        assert_eq!(importance[0].0, "signal");
        assert!(importance[0].1 > 0.5);
        let total: f64 = importance.iter().map(|(_, g)| g).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y, names) = separable_data();
        let a = GbmModel::fit(GbmParams::default(), &x, &y, &names).unwrap();
        let b = GbmModel::fit(GbmParams::default(), &x, &y, &names).unwrap();
        assert_eq!(a.predict_proba(&x), b.predict_proba(&x));
    }

    #[test]
    fn test_fit_rejects_empty_input() {
        let result = GbmModel::fit(GbmParams::default(), &[], &[], &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fit_rejects_shape_mismatch() {
        let x = vec![vec![1.0, 2.0]];
        let y = vec![1, 0];
        let names = vec!["a".to_string(), "b".to_string()];
        assert!(GbmModel::fit(GbmParams::default(), &x, &y, &names).is_err());
    }
}
