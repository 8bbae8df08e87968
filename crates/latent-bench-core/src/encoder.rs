use ndarray::Array1;

use crate::error::{BenchError, BenchResult};
use crate::target::Cell;

/// Encode categorical labels as class indices.
///
/// Classes are sorted: numbers ascending, text lexicographically.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<Cell>,
}

impl LabelEncoder {
    /// Fit the encoder on the present (non-missing) labels.
    pub fn fit(labels: &[Cell]) -> BenchResult<Self> {
        let mut unique: Vec<Cell> = labels.iter().filter(|c| !c.is_missing()).cloned().collect();
        if unique.is_empty() {
            return Err(BenchError::EmptyInput);
        }
        unique.sort_by(|a, b| a.total_cmp(b));
        unique.dedup();
        Ok(LabelEncoder { classes: unique })
    }

    pub fn classes(&self) -> &[Cell] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn index_of(&self, label: &Cell) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.total_cmp(label))
            .ok()
    }

    /// Transform labels to class indices stored as `f64`.
    pub fn transform(&self, labels: &[Cell]) -> BenchResult<Array1<f64>> {
        labels
            .iter()
            .map(|l| {
                self.index_of(l)
                    .map(|i| i as f64)
                    .ok_or_else(|| BenchError::UnknownLabel(l.to_string()))
            })
            .collect::<BenchResult<Vec<f64>>>()
            .map(Array1::from)
    }

    /// Inverse transform: class index → label.
    pub fn inverse_transform(&self, encoded: &[f64]) -> BenchResult<Vec<Cell>> {
        encoded
            .iter()
            .map(|&v| {
                self.classes
                    .get(v.round() as usize)
                    .cloned()
                    .ok_or_else(|| BenchError::UnknownLabel(v.to_string()))
            })
            .collect()
    }
}
