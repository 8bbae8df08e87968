use latent_bench_core::{BenchError, BenchResult, Estimator, ParamSet};
use latent_bench_metrics::Scorer;
use ndarray::{ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::grid::ParamGrid;
use crate::Split;

/// Per-candidate cross-validation scores.
#[derive(Debug, Clone)]
pub struct CvResults {
    pub params: Vec<ParamSet>,
    /// `split_test_scores[candidate][split]`
    pub split_test_scores: Vec<Vec<f64>>,
    pub split_train_scores: Option<Vec<Vec<f64>>>,
    pub mean_test_score: Vec<f64>,
    pub std_test_score: Vec<f64>,
    pub mean_train_score: Option<Vec<f64>>,
    /// 1 is best; NaN means rank last and ties share the lowest rank.
    pub rank_test_score: Vec<usize>,
}

/// Outcome of [`GridSearch::fit`].
#[derive(Debug, Clone)]
pub struct SearchResult<E> {
    pub cv_results: CvResults,
    pub best_index: usize,
    pub best_score: f64,
    pub best_params: ParamSet,
    /// Best candidate refitted on all the data given to the search.
    pub best_estimator: E,
}

impl<E> SearchResult<E> {
    /// Spread of the split scores at the best candidate.
    pub fn best_std(&self) -> f64 {
        self.cv_results.std_test_score[self.best_index]
    }
}

/// Exhaustive search over a parameter grid with precomputed splits.
#[derive(Debug, Clone)]
pub struct GridSearch<E: Estimator> {
    pub estimator: E,
    pub grid: ParamGrid,
    pub scorer: Scorer,
    pub splits: Vec<Split>,
    pub return_train_score: bool,
}

/// Mean and population standard deviation; NaN if any value is NaN.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Descending "min" ranking with NaN placed after every finite score.
pub fn rank_scores(scores: &[f64]) -> Vec<usize> {
    if scores.iter().all(|s| s.is_nan()) {
        return vec![1; scores.len()];
    }
    scores
        .iter()
        .map(|&s| {
            if s.is_nan() {
                1 + scores.iter().filter(|v| !v.is_nan()).count()
            } else {
                1 + scores.iter().filter(|&&v| !v.is_nan() && v > s).count()
            }
        })
        .collect()
}

impl<E: Estimator> GridSearch<E> {
    pub fn new(estimator: E, grid: ParamGrid, scorer: Scorer, splits: Vec<Split>) -> Self {
        GridSearch {
            estimator,
            grid,
            scorer,
            splits,
            return_train_score: false,
        }
    }

    pub fn with_train_score(mut self, return_train_score: bool) -> Self {
        self.return_train_score = return_train_score;
        self
    }

    /// Fit and score one candidate on one split. Failures score NaN.
    fn evaluate(
        &self,
        params: &ParamSet,
        split: &Split,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
    ) -> (f64, f64) {
        let (train, test) = split;
        let run = || -> BenchResult<(f64, f64)> {
            let mut model = self.estimator.clone();
            model.set_params(params)?;
            let x_train = x.select(Axis(0), train);
            let y_train = y.select(Axis(0), train);
            model.fit(x_train.view(), y_train.view())?;

            let x_test = x.select(Axis(0), test);
            let y_test = y.select(Axis(0), test);
            let test_score = self.scorer.score(&model, x_test.view(), y_test.view())?;
            let train_score = if self.return_train_score {
                self.scorer.score(&model, x_train.view(), y_train.view())?
            } else {
                f64::NAN
            };
            Ok((test_score, train_score))
        };
        match run() {
            Ok(scores) => scores,
            Err(err) => {
                log::warn!("fit failed for {}: {}; scoring NaN", params, err);
                (f64::NAN, f64::NAN)
            }
        }
    }

    pub fn fit(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
    ) -> BenchResult<SearchResult<E>> {
        if x.nrows() != y.len() {
            return Err(BenchError::ShapeMismatch {
                expected: vec![x.nrows()],
                got: vec![y.len()],
            });
        }
        if self.splits.is_empty() {
            return Err(BenchError::invalid_parameter("splits", "no cross-validation splits"));
        }
        let candidates = self.grid.candidates();
        if candidates.is_empty() {
            return Err(BenchError::invalid_parameter("grid", "empty parameter grid"));
        }

        let n_splits = self.splits.len();
        let tasks: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..n_splits).map(move |s| (c, s)))
            .collect();
        let scores: Vec<(f64, f64)> = tasks
            .par_iter()
            .map(|&(c, s)| self.evaluate(&candidates[c], &self.splits[s], x, y))
            .collect();

        let split_test_scores: Vec<Vec<f64>> = scores
            .chunks(n_splits)
            .map(|chunk| chunk.iter().map(|s| s.0).collect())
            .collect();
        let (mean_test_score, std_test_score): (Vec<f64>, Vec<f64>) =
            split_test_scores.iter().map(|s| mean_std(s)).unzip();
        let split_train_scores = self.return_train_score.then(|| {
            scores
                .chunks(n_splits)
                .map(|chunk| chunk.iter().map(|s| s.1).collect::<Vec<f64>>())
                .collect::<Vec<_>>()
        });
        let mean_train_score = split_train_scores
            .as_ref()
            .map(|rows| rows.iter().map(|s| mean_std(s).0).collect());
        let rank_test_score = rank_scores(&mean_test_score);

        let best_index = rank_test_score
            .iter()
            .position(|&r| r == 1)
            .unwrap_or(0);
        let best_params = candidates[best_index].clone();
        let best_score = mean_test_score[best_index];

        let mut best_estimator = self.estimator.clone();
        best_estimator.set_params(&best_params)?;
        best_estimator.fit(x, y)?;
        log::debug!(
            "best of {} candidates: {} with score {:.4}",
            candidates.len(),
            best_params,
            best_score
        );

        Ok(SearchResult {
            cv_results: CvResults {
                params: candidates,
                split_test_scores,
                split_train_scores,
                mean_test_score,
                std_test_score,
                mean_train_score,
                rank_test_score,
            },
            best_index,
            best_score,
            best_params,
            best_estimator,
        })
    }
}
