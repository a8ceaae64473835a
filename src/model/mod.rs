//! Gradient-boosted classifier and its evaluation metrics.

pub mod gbm;
pub mod metrics;

pub use gbm::{GbmModel, GbmParams};
pub use metrics::{accuracy, classification_report, confusion_matrix, roc_auc};
