use latent_bench_core::{BenchError, BenchResult, Estimator, ParamValue};
use latent_bench_selection::StratifiedKFold;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::isotonic::IsotonicRegression;
use crate::ridge_classifier::{unique_classes, RidgeClassifier};

const ESTIMATOR_PREFIX: &str = "estimator__";

/// One cross-validation fold: the classifier fitted on the training part and
/// isotonic maps from its decision columns to class probabilities.
#[derive(Debug, Clone)]
struct CalibratedFold {
    classifier: RidgeClassifier,
    /// `(decision column, class index, map)` triples.
    calibrators: Vec<(usize, usize, IsotonicRegression)>,
}

/// Ridge classifier with isotonic probability calibration over stratified folds.
///
/// Each fold fits a clone of the base classifier on its training part and
/// calibrates decision values on the held-out part. Probabilities are the mean
/// over folds.
#[derive(Debug, Clone)]
pub struct CalibratedClassifier {
    pub estimator: RidgeClassifier,
    pub cv: usize,
    classes: Vec<f64>,
    folds: Vec<CalibratedFold>,
}

impl CalibratedClassifier {
    pub fn new(estimator: RidgeClassifier) -> Self {
        CalibratedClassifier {
            estimator,
            cv: 5,
            classes: Vec::new(),
            folds: Vec::new(),
        }
    }

    pub fn with_cv(mut self, cv: usize) -> Self {
        self.cv = cv;
        self
    }

    fn fit_fold(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        train: &[usize],
        test: &[usize],
    ) -> BenchResult<CalibratedFold> {
        let mut classifier = self.estimator.clone();
        let x_train = x.select(Axis(0), train);
        let y_train = y.select(Axis(0), train);
        classifier.fit(x_train.view(), y_train.view())?;

        let x_test = x.select(Axis(0), test);
        let y_test = y.select(Axis(0), test);
        let decision = classifier.decision_function(x_test.view())?;
        let fold_classes = classifier.classes().unwrap_or(&[]).to_vec();

        // A binary decision has one column scoring the second class.
        let columns: Vec<f64> = if decision.ncols() == 1 {
            vec![fold_classes[1]]
        } else {
            fold_classes
        };

        let mut calibrators = Vec::with_capacity(columns.len());
        for (col, label) in columns.iter().enumerate() {
            let class_idx = self
                .classes
                .iter()
                .position(|c| c == label)
                .ok_or_else(|| BenchError::UnknownLabel(label.to_string()))?;
            let scores = decision.column(col).to_vec();
            let hits: Vec<f64> = y_test
                .iter()
                .map(|v| if v == label { 1.0 } else { 0.0 })
                .collect();
            calibrators.push((col, class_idx, IsotonicRegression::fit(&scores, &hits)?));
        }

        Ok(CalibratedFold {
            classifier,
            calibrators,
        })
    }

    fn fold_proba(
        &self,
        fold: &CalibratedFold,
        x: ArrayView2<'_, f64>,
    ) -> BenchResult<Array2<f64>> {
        let decision = fold.classifier.decision_function(x)?;
        let n = x.nrows();
        let k = self.classes.len();
        let mut proba = Array2::<f64>::zeros((n, k));

        if k == 2 {
            if let Some((col, _, iso)) = fold.calibrators.first() {
                for i in 0..n {
                    let p = iso.predict_one(decision[[i, *col]]);
                    proba[[i, 1]] = p;
                    proba[[i, 0]] = 1.0 - p;
                }
            }
            return Ok(proba);
        }

        for (col, class_idx, iso) in &fold.calibrators {
            for i in 0..n {
                proba[[i, *class_idx]] = iso.predict_one(decision[[i, *col]]);
            }
        }
        for mut row in proba.rows_mut() {
            let total = row.sum();
            if total == 0.0 {
                row.fill(1.0 / k as f64);
            } else {
                row /= total;
            }
            // Rounding can push a normalized value slightly above one.
            row.mapv_inplace(|p| if p > 1.0 && p <= 1.0 + 1e-5 { 1.0 } else { p });
        }
        Ok(proba)
    }
}

impl Estimator for CalibratedClassifier {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> BenchResult<()> {
        if x.nrows() != y.len() {
            return Err(BenchError::ShapeMismatch {
                expected: vec![x.nrows()],
                got: vec![y.len()],
            });
        }
        let classes = unique_classes(y);
        if classes.len() < 2 {
            return Err(BenchError::InvalidOperation(format!(
                "calibration needs at least two classes, got {}",
                classes.len()
            )));
        }
        for class in &classes {
            let count = y.iter().filter(|v| *v == class).count();
            if count < self.cv {
                return Err(BenchError::InvalidOperation(format!(
                    "class {} has {} samples, fewer than {} folds",
                    class, count, self.cv
                )));
            }
        }
        self.classes = classes;

        let splits = StratifiedKFold::new(self.cv).split(y)?;
        let mut folds = Vec::with_capacity(splits.len());
        for (train, test) in &splits {
            folds.push(self.fit_fold(x, y, train, test)?);
        }
        self.folds = folds;
        log::debug!(
            "calibrated {} classes over {} folds",
            self.classes.len(),
            self.folds.len()
        );
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> BenchResult<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        let labels = proba
            .outer_iter()
            .map(|row| {
                let mut best = 0;
                for (j, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = j;
                    }
                }
                self.classes[best]
            })
            .collect();
        Ok(labels)
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> BenchResult<Array2<f64>> {
        if self.folds.is_empty() {
            return Err(BenchError::NotFitted);
        }
        let mut mean = Array2::<f64>::zeros((x.nrows(), self.classes.len()));
        for fold in &self.folds {
            mean += &self.fold_proba(fold, x)?;
        }
        mean /= self.folds.len() as f64;
        Ok(mean)
    }

    fn classes(&self) -> Option<&[f64]> {
        Some(&self.classes)
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> BenchResult<()> {
        if let Some(inner) = name.strip_prefix(ESTIMATOR_PREFIX) {
            return self.estimator.set_param(inner, value);
        }
        match name {
            "cv" => {
                let cv = value
                    .as_f64()
                    .ok_or_else(|| BenchError::invalid_parameter(name, "expected a number"))?;
                if cv < 2.0 || cv.fract() != 0.0 {
                    return Err(BenchError::invalid_parameter(name, "needs an integer >= 2"));
                }
                self.cv = cv as usize;
                Ok(())
            }
            _ => Err(BenchError::invalid_parameter(
                name,
                "calibrated classifier only accepts 'cv' and 'estimator__' parameters",
            )),
        }
    }
}
