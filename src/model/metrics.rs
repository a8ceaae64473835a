//! Binary classification metrics for the holdout evaluation.

use std::fmt::Write as _;

/// Fraction of matching predictions. Zero-length input scores 0.
pub fn accuracy(predictions: &[u32], labels: &[u32]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|(p, l)| p == l)
        .count();
    correct as f64 / labels.len() as f64
}

/// 2x2 matrix indexed `[actual][predicted]`.
pub fn confusion_matrix(predictions: &[u32], labels: &[u32]) -> [[usize; 2]; 2] {
    let mut matrix = [[0usize; 2]; 2];
    for (&pred, &label) in predictions.iter().zip(labels) {
        matrix[label.min(1) as usize][pred.min(1) as usize] += 1;
    }
    matrix
}

/// Area under the ROC curve via the rank statistic, with tied scores
/// receiving their average rank. `None` when only one class is present.
pub fn roc_auc(probabilities: &[f64], labels: &[u32]) -> Option<f64> {
    let n_pos = labels.iter().filter(|&&l| l == 1).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by(|&a, &b| probabilities[a].total_cmp(&probabilities[b]));

    // Average ranks across ties, then sum positive-class ranks.
    let mut ranks = vec![0.0; labels.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len()
            && probabilities[order[j + 1]] == probabilities[order[i]]
        {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(&l, _)| l == 1)
        .map(|(_, &r)| r)
        .sum();
    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Some((positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

fn class_stats(predictions: &[u32], labels: &[u32], class: u32) -> (f64, f64, f64, usize) {
    let tp = predictions
        .iter()
        .zip(labels)
        .filter(|(&p, &l)| p == class && l == class)
        .count() as f64;
    let predicted = predictions.iter().filter(|&&p| p == class).count() as f64;
    let support = labels.iter().filter(|&&l| l == class).count();

    let precision = if predicted > 0.0 { tp / predicted } else { 0.0 };
    let recall = if support > 0 { tp / support as f64 } else { 0.0 };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    (precision, recall, f1, support)
}

/// Per-class precision/recall/F1 table in the familiar sklearn layout.
pub fn classification_report(predictions: &[u32], labels: &[u32]) -> String {
    let mut report = String::new();
    let _ = writeln!(
        report,
        "{:>12} {:>9} {:>9} {:>9} {:>9}",
        "", "precision", "recall", "f1-score", "support"
    );
    for class in 0..2u32 {
        let (precision, recall, f1, support) = class_stats(predictions, labels, class);
        let _ = writeln!(
            report,
            "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            class, precision, recall, f1, support
        );
    }
    let _ = writeln!(
        report,
        "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
        "accuracy",
        "",
        "",
        accuracy(predictions, labels),
        labels.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_and_confusion() {
        let predictions = vec![1, 0, 1, 1, 0, 0, 1, 0];
        let labels = vec![1, 0, 0, 1, 0, 1, 1, 0];

        assert!((accuracy(&predictions, &labels) - 0.75).abs() < 1e-12);

        let matrix = confusion_matrix(&predictions, &labels);
        assert_eq!(matrix[1][1], 3);
        assert_eq!(matrix[0][0], 3);
        assert_eq!(matrix[0][1], 1);
        assert_eq!(matrix[1][0], 1);
    }

    #[test]
    fn test_auc_perfect_ranking() {
        let probs = vec![0.9, 0.8, 0.3, 0.1];
        let labels = vec![1, 1, 0, 0];
        assert!((roc_auc(&probs, &labels).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_auc_tied_scores_are_uninformative() {
        let probs = vec![0.5, 0.5, 0.5, 0.5];
        let labels = vec![1, 1, 0, 0];
        assert!((roc_auc(&probs, &labels).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_auc_single_class_undefined() {
        let probs = vec![0.9, 0.8];
        let labels = vec![1, 1];
        assert_eq!(roc_auc(&probs, &labels), None);
    }

    #[test]
    fn test_report_contains_both_classes() {
        let predictions = vec![1, 0, 1, 0];
        let labels = vec![1, 0, 0, 1];
        let report = classification_report(&predictions, &labels);
        assert!(report.contains("precision"));
        assert!(report.contains("accuracy"));
        assert!(report.lines().count() >= 4);
    }
}
