use latent_bench_core::{BenchError, Cell, LabelEncoder, TargetColumn, TargetKind};
use latent_bench_linear::{CalibratedClassifier, Ridge, RidgeClassifier, RidgeSolver};
use latent_bench_metrics::Scorer;
use latent_bench_selection::{logspace, ParamGrid};
use ndarray::Array1;

use crate::error::WorkflowResult;

/// Alpha of the regressor before the search.
pub const REGRESSOR_ALPHA: f64 = 0.5;

/// Estimator chosen from the training values of a target.
#[derive(Debug, Clone)]
pub enum Predictor {
    /// Isotonic-calibrated ridge classifier, scored by one-vs-rest ROC AUC.
    Classifier(CalibratedClassifier),
    /// Ridge regressor, scored by mean absolute error.
    Regressor(Ridge),
}

impl Predictor {
    pub fn for_kind(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Categorical => {
                Predictor::Classifier(CalibratedClassifier::new(RidgeClassifier::new(1.0)))
            }
            TargetKind::Continuous => Predictor::Regressor(Ridge::new(REGRESSOR_ALPHA)),
        }
    }

    /// Search scorer; greater is better.
    pub fn scorer(&self) -> Scorer {
        match self {
            Predictor::Classifier(_) => Scorer::RocAucOvr,
            Predictor::Regressor(_) => Scorer::NegMeanAbsoluteError,
        }
    }

    /// `alpha` over `logspace(-2, 4, 7)` crossed with the searched solvers.
    pub fn param_grid(&self) -> ParamGrid {
        let prefix = match self {
            Predictor::Classifier(_) => "estimator__",
            Predictor::Regressor(_) => "",
        };
        ParamGrid::new()
            .with(format!("{}alpha", prefix), logspace(-2.0, 4.0, 7))
            .with(
                format!("{}solver", prefix),
                RidgeSolver::SEARCH.iter().map(|s| s.as_str()),
            )
    }
}

/// Encoded target restricted to usable rows of both splits.
#[derive(Debug, Clone)]
pub struct TargetData {
    pub name: String,
    pub kind: TargetKind,
    /// Training rows with a present value.
    pub train_rows: Vec<usize>,
    pub y_train: Array1<f64>,
    /// Test rows with a present value known to the training set.
    pub test_rows: Vec<usize>,
    pub y_test: Array1<f64>,
}

impl TargetData {
    /// Drop missing rows, and for categorical targets test labels absent from training.
    pub fn prepare(train: &TargetColumn, test: &TargetColumn) -> WorkflowResult<Self> {
        let kind = train.kind()?;
        let train_rows = train.present_rows();
        if train_rows.len() < train.len() {
            log::warn!(
                "{}: dropping {} training rows with a missing value",
                train.name,
                train.len() - train_rows.len()
            );
        }
        let train_kept = train.select(&train_rows);

        let present_test = test.present_rows();
        if present_test.len() < test.len() {
            log::warn!(
                "{}: dropping {} test rows with a missing value",
                test.name,
                test.len() - present_test.len()
            );
        }

        let (y_train, test_rows, y_test) = match kind {
            TargetKind::Categorical => {
                let encoder = LabelEncoder::fit(&train_kept.cells)?;
                let test_rows: Vec<usize> = present_test
                    .into_iter()
                    .filter(|&i| encoder.index_of(&test.cells[i]).is_some())
                    .collect();
                let unseen = test.present_rows().len() - test_rows.len();
                if unseen > 0 {
                    log::warn!(
                        "{}: dropping {} test rows with labels unseen in training",
                        test.name,
                        unseen
                    );
                }
                let y_test = encoder.transform(&test.select(&test_rows).cells)?;
                (encoder.transform(&train_kept.cells)?, test_rows, y_test)
            }
            TargetKind::Continuous => {
                let y_test = numeric(test, &present_test)?;
                (train_kept.to_f64()?, present_test, y_test)
            }
        };

        Ok(TargetData {
            name: train.name.clone(),
            kind,
            train_rows,
            y_train,
            test_rows,
            y_test,
        })
    }
}

fn numeric(column: &TargetColumn, rows: &[usize]) -> WorkflowResult<Array1<f64>> {
    let values = rows
        .iter()
        .map(|&i| match &column.cells[i] {
            Cell::Number(v) => Ok(*v),
            other => Err(BenchError::InvalidOperation(format!(
                "column '{}' holds non-numeric value '{}'",
                column.name, other
            ))),
        })
        .collect::<Result<Vec<f64>, BenchError>>()?;
    Ok(Array1::from(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use latent_bench_core::ParamValue;

    fn text(name: &str, values: &[Option<&str>]) -> TargetColumn {
        TargetColumn::new(
            name,
            values
                .iter()
                .map(|v| v.map_or(Cell::Missing, |s| Cell::Text(s.to_string())))
                .collect(),
        )
    }

    #[test]
    fn test_kind_selects_predictor() {
        let clf = Predictor::for_kind(TargetKind::Categorical);
        assert_eq!(clf.scorer(), Scorer::RocAucOvr);
        let reg = Predictor::for_kind(TargetKind::Continuous);
        assert_eq!(reg.scorer(), Scorer::NegMeanAbsoluteError);
        assert!(matches!(reg, Predictor::Regressor(ref r) if r.alpha == REGRESSOR_ALPHA));
    }

    #[test]
    fn test_param_grid_prefix() {
        let grid = Predictor::for_kind(TargetKind::Categorical).param_grid();
        assert_eq!(grid.len(), 35);
        let names: Vec<&str> = grid.names().collect();
        assert_eq!(names, vec!["estimator__alpha", "estimator__solver"]);

        let first = &Predictor::for_kind(TargetKind::Continuous).param_grid().candidates()[0];
        let alpha = first.get("alpha").and_then(ParamValue::as_f64).unwrap();
        assert_relative_eq!(alpha, 0.01, epsilon = 1e-12);
        assert_eq!(first.get("solver"), Some(&ParamValue::Text("auto".into())));
    }

    #[test]
    fn test_prepare_categorical_drops_missing_and_unseen() {
        let train = text("site", &[Some("a"), None, Some("b"), Some("a")]);
        let test = text("site", &[Some("b"), Some("c"), None, Some("a")]);
        let data = TargetData::prepare(&train, &test).unwrap();
        assert_eq!(data.kind, TargetKind::Categorical);
        assert_eq!(data.train_rows, vec![0, 2, 3]);
        assert_eq!(data.y_train.to_vec(), vec![0.0, 1.0, 0.0]);
        assert_eq!(data.test_rows, vec![0, 3]);
        assert_eq!(data.y_test.to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_prepare_continuous() {
        let train = TargetColumn::new(
            "age",
            vec![Cell::Number(10.5), Cell::Missing, Cell::Number(8.25)],
        );
        let test = TargetColumn::new("age", vec![Cell::Missing, Cell::Number(11.0)]);
        let data = TargetData::prepare(&train, &test).unwrap();
        assert_eq!(data.kind, TargetKind::Continuous);
        assert_eq!(data.y_train.to_vec(), vec![10.5, 8.25]);
        assert_eq!(data.test_rows, vec![1]);
        assert_eq!(data.y_test.to_vec(), vec![11.0]);
    }
}
