use std::fmt;

use latent_bench_core::{BenchResult, Estimator};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::classification::roc_auc_ovr;
use crate::regression::mean_absolute_error;

/// Score functions applied to a fitted estimator.
///
/// Search scorers are oriented so that greater is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    NegMeanAbsoluteError,
    MeanAbsoluteError,
    RocAucOvr,
}

impl Scorer {
    /// Score `estimator` on `(x, y)`; undefined scores are NaN.
    pub fn score<E: Estimator>(
        &self,
        estimator: &E,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
    ) -> BenchResult<f64> {
        match self {
            Scorer::NegMeanAbsoluteError => {
                let pred = estimator.predict(x)?;
                Ok(-mean_absolute_error(y, pred.view())?)
            }
            Scorer::MeanAbsoluteError => {
                let pred = estimator.predict(x)?;
                mean_absolute_error(y, pred.view())
            }
            Scorer::RocAucOvr => {
                let proba = estimator.predict_proba(x)?;
                Ok(roc_auc_ovr(y, proba.view()).unwrap_or(f64::NAN))
            }
        }
    }

    /// Scorer used on held-out data once the search is over.
    pub fn for_report(self) -> Scorer {
        match self {
            Scorer::NegMeanAbsoluteError => Scorer::MeanAbsoluteError,
            other => other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scorer::NegMeanAbsoluteError | Scorer::MeanAbsoluteError => "MAE",
            Scorer::RocAucOvr => "AUC ROC",
        }
    }
}

impl fmt::Display for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use latent_bench_core::{BenchError, ParamValue};
    use ndarray::{array, Array1, Array2, Axis};

    /// Predicts the first feature; probabilities are `[1 - x0, x0]`.
    #[derive(Clone)]
    struct Echo;

    impl Estimator for Echo {
        fn fit(&mut self, _x: ArrayView2<'_, f64>, _y: ArrayView1<'_, f64>) -> BenchResult<()> {
            Ok(())
        }

        fn predict(&self, x: ArrayView2<'_, f64>) -> BenchResult<Array1<f64>> {
            Ok(x.column(0).to_owned())
        }

        fn predict_proba(&self, x: ArrayView2<'_, f64>) -> BenchResult<Array2<f64>> {
            let p = x.column(0).to_owned().insert_axis(Axis(1));
            let q = p.mapv(|v| 1.0 - v);
            Ok(ndarray::concatenate![Axis(1), q, p])
        }

        fn set_param(&mut self, name: &str, _value: &ParamValue) -> BenchResult<()> {
            Err(BenchError::invalid_parameter(name, "no parameters"))
        }
    }

    #[test]
    fn test_mae_scorers() {
        let x = array![[1.0], [2.0], [4.0]];
        let y = array![1.0, 3.0, 3.0];
        let neg = Scorer::NegMeanAbsoluteError.score(&Echo, x.view(), y.view()).unwrap();
        let pos = Scorer::MeanAbsoluteError.score(&Echo, x.view(), y.view()).unwrap();
        assert_abs_diff_eq!(neg, -2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pos, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_auc_scorer_nan_when_undefined() {
        let x = array![[0.2], [0.9]];
        let y = array![1.0, 1.0];
        let score = Scorer::RocAucOvr.score(&Echo, x.view(), y.view()).unwrap();
        assert!(score.is_nan());
    }

    #[test]
    fn test_report_scorer_and_names() {
        assert_eq!(Scorer::NegMeanAbsoluteError.for_report(), Scorer::MeanAbsoluteError);
        assert_eq!(Scorer::RocAucOvr.for_report(), Scorer::RocAucOvr);
        assert_eq!(Scorer::NegMeanAbsoluteError.name(), "MAE");
        assert_eq!(Scorer::RocAucOvr.to_string(), "AUC ROC");
    }
}
