use latent_bench_core::{BenchError, BenchResult};
use ndarray::{Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::Split;

/// Shuffle-split cross-validator that preserves the frequency of every label
/// of a multilabel indicator matrix in both parts.
///
/// Each split shuffles the samples and assigns them by iterative
/// stratification.
#[derive(Debug, Clone, Copy)]
pub struct MultilabelStratifiedShuffleSplit {
    pub n_splits: usize,
    pub test_size: f64,
    pub random_state: u64,
}

impl Default for MultilabelStratifiedShuffleSplit {
    fn default() -> Self {
        MultilabelStratifiedShuffleSplit {
            n_splits: 5,
            test_size: 0.2,
            random_state: 42,
        }
    }
}

impl MultilabelStratifiedShuffleSplit {
    pub fn new(n_splits: usize, test_size: f64, random_state: u64) -> Self {
        MultilabelStratifiedShuffleSplit {
            n_splits,
            test_size,
            random_state,
        }
    }

    /// `(n_train, n_test)` for `n_samples` rows.
    pub fn sizes(&self, n_samples: usize) -> BenchResult<(usize, usize)> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(BenchError::invalid_parameter(
                "test_size",
                format!("must lie in (0, 1), got {}", self.test_size),
            ));
        }
        let n_test = (self.test_size * n_samples as f64).ceil() as usize;
        let n_train = n_samples.saturating_sub(n_test);
        if n_train == 0 {
            return Err(BenchError::invalid_parameter(
                "test_size",
                format!(
                    "{} samples with test_size {} leave an empty training set",
                    n_samples, self.test_size
                ),
            ));
        }
        Ok((n_train, n_test))
    }

    pub fn split(&self, labels: ArrayView2<'_, bool>) -> BenchResult<Vec<Split>> {
        let n_samples = labels.nrows();
        if n_samples == 0 {
            return Err(BenchError::EmptyInput);
        }
        let (n_train, n_test) = self.sizes(n_samples)?;
        let total = (n_train + n_test) as f64;
        let ratios = [n_train as f64 / total, n_test as f64 / total];

        let mut rng = StdRng::seed_from_u64(self.random_state);
        let mut splits = Vec::with_capacity(self.n_splits);
        for _ in 0..self.n_splits {
            let mut order: Vec<usize> = (0..n_samples).collect();
            order.shuffle(&mut rng);
            let shuffled = labels.select(Axis(0), &order);
            let folds = iterative_stratification(&shuffled, &ratios, &mut rng);

            let mut is_test = vec![false; n_samples];
            for (pos, &sample) in order.iter().enumerate() {
                is_test[sample] = folds[pos] == 1;
            }
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..n_samples).partition(|&i| is_test[i]);
            splits.push((train, test));
        }
        Ok(splits)
    }
}

/// Indices of the maxima of `values`.
fn argmax_all(values: impl Iterator<Item = f64>) -> Vec<usize> {
    let values: Vec<f64> = values.collect();
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (0..values.len()).filter(|&i| values[i] == max).collect()
}

fn pick<R: Rng>(candidates: &[usize], rng: &mut R) -> usize {
    if candidates.len() > 1 {
        candidates[rng.gen_range(0..candidates.len())]
    } else {
        candidates[0]
    }
}

/// Assign each row of `labels` to a fold so that every fold receives its
/// `ratios` share of each label. Rows are handled rarest label first; rows
/// without any remaining label fill the folds with the most free capacity.
pub fn iterative_stratification<R: Rng>(
    labels: &Array2<bool>,
    ratios: &[f64],
    rng: &mut R,
) -> Vec<usize> {
    let (n_samples, n_labels) = labels.dim();
    let mut folds = vec![0usize; n_samples];

    let label_totals: Vec<f64> = (0..n_labels)
        .map(|l| labels.column(l).iter().filter(|&&v| v).count() as f64)
        .collect();
    let mut fold_capacity: Vec<f64> = ratios.iter().map(|r| r * n_samples as f64).collect();
    let mut fold_label_demand: Vec<Vec<f64>> = ratios
        .iter()
        .map(|r| label_totals.iter().map(|t| r * t).collect())
        .collect();
    let mut pending = vec![true; n_samples];

    while pending.iter().any(|&p| p) {
        let remaining: Vec<usize> = (0..n_labels)
            .map(|l| (0..n_samples).filter(|&i| pending[i] && labels[[i, l]]).count())
            .collect();

        if remaining.iter().all(|&c| c == 0) {
            for sample in (0..n_samples).filter(|&i| pending[i]) {
                let best = argmax_all(fold_capacity.iter().cloned());
                let fold = pick(&best, rng);
                folds[sample] = fold;
                fold_capacity[fold] -= 1.0;
            }
            break;
        }

        let rarest = remaining.iter().filter(|&&c| c > 0).min().cloned().unwrap_or(0);
        let candidates: Vec<usize> = (0..n_labels).filter(|&l| remaining[l] == rarest).collect();
        let label = pick(&candidates, rng);

        let samples: Vec<usize> = (0..n_samples)
            .filter(|&i| pending[i] && labels[[i, label]])
            .collect();
        for sample in samples {
            let by_label = argmax_all(fold_label_demand.iter().map(|d| d[label]));
            let fold = if by_label.len() > 1 {
                let by_capacity = argmax_all(by_label.iter().map(|&f| fold_capacity[f]));
                let chosen: Vec<usize> = by_capacity.iter().map(|&j| by_label[j]).collect();
                pick(&chosen, rng)
            } else {
                by_label[0]
            };

            folds[sample] = fold;
            pending[sample] = false;
            for l in 0..n_labels {
                if labels[[sample, l]] {
                    fold_label_demand[fold][l] -= 1.0;
                }
            }
            fold_capacity[fold] -= 1.0;
        }
    }
    folds
}
