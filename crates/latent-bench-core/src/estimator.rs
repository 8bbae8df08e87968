use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{BenchError, BenchResult};
use crate::params::{ParamSet, ParamValue};

/// Trait for supervised estimators that can be cloned into a parameter search.
///
/// Targets are passed as `f64`: continuous values for regressors, encoded class
/// indices for classifiers.
pub trait Estimator: Clone + Send + Sync {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> BenchResult<()>;

    fn predict(&self, x: ArrayView2<'_, f64>) -> BenchResult<Array1<f64>>;

    /// Class probabilities, one column per entry of [`Estimator::classes`].
    fn predict_proba(&self, _x: ArrayView2<'_, f64>) -> BenchResult<Array2<f64>> {
        Err(BenchError::InvalidOperation(
            "predict_proba is not available for this estimator".into(),
        ))
    }

    /// Class labels seen during fit, if this is a classifier.
    fn classes(&self) -> Option<&[f64]> {
        None
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> BenchResult<()>;

    fn set_params(&mut self, params: &ParamSet) -> BenchResult<()> {
        for (name, value) in params.iter() {
            self.set_param(name, value)?;
        }
        Ok(())
    }
}
