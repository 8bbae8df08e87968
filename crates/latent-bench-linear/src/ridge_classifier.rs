use latent_bench_core::{BenchError, BenchResult, Estimator, ParamValue};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::ridge::Ridge;

/// Sorted distinct class labels of an encoded target.
pub fn unique_classes(y: ArrayView1<'_, f64>) -> Vec<f64> {
    let mut classes: Vec<f64> = y.iter().cloned().collect();
    classes.sort_by(|a, b| a.total_cmp(b));
    classes.dedup();
    classes
}

/// Ridge classifier: regress ±1 class indicators, predict the best-scoring class.
///
/// Two classes share a single decision column (positive = second class).
#[derive(Debug, Clone)]
pub struct RidgeClassifier {
    pub ridge: Ridge,
    classes: Vec<f64>,
}

impl RidgeClassifier {
    pub fn new(alpha: f64) -> Self {
        RidgeClassifier::from_ridge(Ridge::new(alpha))
    }

    pub fn from_ridge(ridge: Ridge) -> Self {
        RidgeClassifier {
            ridge,
            classes: Vec::new(),
        }
    }

    /// `[n_samples, 1]` for two classes, `[n_samples, n_classes]` otherwise.
    pub fn decision_function(&self, x: ArrayView2<'_, f64>) -> BenchResult<Array2<f64>> {
        if self.classes.is_empty() {
            return Err(BenchError::NotFitted);
        }
        self.ridge.decision(x)
    }

    fn binarize(&self, y: ArrayView1<'_, f64>) -> Array2<f64> {
        let n = y.len();
        if self.classes.len() == 2 {
            let positive = self.classes[1];
            Array2::from_shape_fn((n, 1), |(i, _)| if y[i] == positive { 1.0 } else { -1.0 })
        } else {
            Array2::from_shape_fn((n, self.classes.len()), |(i, c)| {
                if y[i] == self.classes[c] {
                    1.0
                } else {
                    -1.0
                }
            })
        }
    }
}

impl Estimator for RidgeClassifier {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> BenchResult<()> {
        let classes = unique_classes(y);
        if classes.len() < 2 {
            return Err(BenchError::InvalidOperation(format!(
                "RidgeClassifier needs at least two classes, got {}",
                classes.len()
            )));
        }
        self.classes = classes;
        let targets = self.binarize(y);
        self.ridge.fit_multi(x, targets.view())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> BenchResult<Array1<f64>> {
        let scores = self.decision_function(x)?;
        let labels = scores
            .outer_iter()
            .map(|row| {
                if row.len() == 1 {
                    self.classes[usize::from(row[0] > 0.0)]
                } else {
                    let best = row
                        .iter()
                        .enumerate()
                        .fold((0, f64::NEG_INFINITY), |acc, (i, &v)| {
                            if v > acc.1 {
                                (i, v)
                            } else {
                                acc
                            }
                        });
                    self.classes[best.0]
                }
            })
            .collect();
        Ok(labels)
    }

    fn classes(&self) -> Option<&[f64]> {
        Some(&self.classes)
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> BenchResult<()> {
        self.ridge.set_param(name, value)
    }
}
