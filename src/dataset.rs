//! Labeled frame to training matrices, with a seeded train/test split.

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::errors::{RotationError, RotationResult};
use crate::features::{COL_TARGET, EXCLUDED_FEATURE_COLS};

/// Dense feature matrix and binary labels extracted from a labeled frame.
#[derive(Debug, Clone)]
pub struct RotationDataset {
    pub feature_names: Vec<String>,
    pub x: Vec<Vec<f64>>,
    pub y: Vec<u32>,
}

/// One shuffled split of a [`RotationDataset`].
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Vec<Vec<f64>>,
    pub y_train: Vec<u32>,
    pub x_test: Vec<Vec<f64>>,
    pub y_test: Vec<u32>,
}

impl RotationDataset {
    /// Pull every non-bookkeeping column as a feature and `target` as the
    /// label. The frame must already be fully dense.
    pub fn from_frame(frame: &DataFrame) -> RotationResult<Self> {
        let feature_names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .filter(|n| !EXCLUDED_FEATURE_COLS.contains(&n.as_str()))
            .collect();
        if feature_names.is_empty() {
            return Err(RotationError::missing_column("any feature column"));
        }

        let mut columns = Vec::with_capacity(feature_names.len());
        for name in &feature_names {
            columns.push(frame.column(name)?.f64()?);
        }

        let mut x = Vec::with_capacity(frame.height());
        for i in 0..frame.height() {
            let mut row = Vec::with_capacity(columns.len());
            for (col, name) in columns.iter().zip(&feature_names) {
                let value = col.get(i).ok_or_else(|| {
                    RotationError::parse("dataset", format!("null value in column {}", name))
                })?;
                row.push(value);
            }
            x.push(row);
        }

        let target = frame.column(COL_TARGET)?.u32()?;
        let mut y = Vec::with_capacity(frame.height());
        for i in 0..frame.height() {
            let label = target
                .get(i)
                .ok_or_else(|| RotationError::parse("dataset", "null label"))?;
            y.push(label);
        }

        Ok(Self {
            feature_names,
            x,
            y,
        })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Shuffle rows with a seeded generator and carve off the trailing
    /// `test_size` fraction as the holdout.
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> TrainTestSplit {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let test_count = ((self.len() as f64) * test_size).round() as usize;
        let train_count = self.len() - test_count;

        let mut split = TrainTestSplit {
            x_train: Vec::with_capacity(train_count),
            y_train: Vec::with_capacity(train_count),
            x_test: Vec::with_capacity(test_count),
            y_test: Vec::with_capacity(test_count),
        };
        for (pos, &idx) in indices.iter().enumerate() {
            if pos < train_count {
                split.x_train.push(self.x[idx].clone());
                split.y_train.push(self.y[idx]);
            } else {
                split.x_test.push(self.x[idx].clone());
                split.y_test.push(self.y[idx]);
            }
        }
        split
    }
}
