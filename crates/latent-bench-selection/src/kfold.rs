use latent_bench_core::{BenchError, BenchResult};
use ndarray::ArrayView1;

use crate::Split;

/// Stratified k-fold splitter without shuffling.
///
/// Each fold gets close to the same share of every class. Samples of a
/// class are dealt to folds in their original order.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedKFold {
    pub n_splits: usize,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        StratifiedKFold { n_splits }
    }

    /// Fold index of every sample.
    pub fn test_folds(&self, y: ArrayView1<'_, f64>) -> BenchResult<Vec<usize>> {
        let k = self.n_splits;
        if k < 2 {
            return Err(BenchError::invalid_parameter(
                "n_splits",
                format!("needs at least 2 folds, got {}", k),
            ));
        }
        if y.len() < k {
            return Err(BenchError::invalid_parameter(
                "n_splits",
                format!("cannot split {} samples into {} folds", y.len(), k),
            ));
        }

        // Encode classes by order of first appearance.
        let mut seen: Vec<f64> = Vec::new();
        let encoded: Vec<usize> = y
            .iter()
            .map(|&v| match seen.iter().position(|&s| s == v) {
                Some(i) => i,
                None => {
                    seen.push(v);
                    seen.len() - 1
                }
            })
            .collect();
        let n_classes = seen.len();

        let mut sorted = encoded.clone();
        sorted.sort_unstable();

        // allocation[f][c]: samples of class c that go to fold f.
        let mut allocation = vec![vec![0usize; n_classes]; k];
        for (i, &class) in sorted.iter().enumerate() {
            allocation[i % k][class] += 1;
        }

        let mut folds = vec![0usize; y.len()];
        for class in 0..n_classes {
            let mut targets = (0..k).flat_map(|f| std::iter::repeat(f).take(allocation[f][class]));
            for (sample, _) in encoded.iter().enumerate().filter(|&(_, &c)| c == class) {
                if let Some(fold) = targets.next() {
                    folds[sample] = fold;
                }
            }
        }
        Ok(folds)
    }

    pub fn split(&self, y: ArrayView1<'_, f64>) -> BenchResult<Vec<Split>> {
        let folds = self.test_folds(y)?;
        let splits = (0..self.n_splits)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..folds.len()).partition(|&i| folds[i] == fold);
                (train, test)
            })
            .collect();
        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_balanced_folds() {
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let splits = StratifiedKFold::new(2).split(y.view()).unwrap();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].1, vec![0, 1, 4, 5]);
        assert_eq!(splits[1].1, vec![2, 3, 6, 7]);
        assert_eq!(splits[0].0, vec![2, 3, 6, 7]);
    }

    #[test]
    fn test_every_sample_tested_once() {
        let y = array![1.0, 0.0, 2.0, 1.0, 0.0, 2.0, 1.0, 0.0, 2.0, 1.0, 0.0, 1.0];
        let splits = StratifiedKFold::new(3).split(y.view()).unwrap();
        let mut seen = vec![0; y.len()];
        for (train, test) in &splits {
            assert_eq!(train.len() + test.len(), y.len());
            for &i in test {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_class_shares_per_fold() {
        // 10 of class 0, 5 of class 1 over 5 folds.
        let y: Vec<f64> = (0..15).map(|i| if i % 3 == 2 { 1.0 } else { 0.0 }).collect();
        let y = ndarray::Array1::from(y);
        let splits = StratifiedKFold::new(5).split(y.view()).unwrap();
        for (_, test) in &splits {
            let ones = test.iter().filter(|&&i| y[i] == 1.0).count();
            assert_eq!(ones, 1);
            assert_eq!(test.len(), 3);
        }
    }

    #[test]
    fn test_too_many_folds() {
        let y = array![0.0, 1.0];
        assert!(StratifiedKFold::new(3).split(y.view()).is_err());
        assert!(StratifiedKFold::new(1).split(y.view()).is_err());
    }
}
