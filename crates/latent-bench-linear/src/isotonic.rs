use latent_bench_core::{BenchError, BenchResult};

/// Increasing isotonic regression with clipping outside the fitted range.
///
/// Fitted by pool-adjacent-violators; predictions interpolate linearly
/// between the retained thresholds.
#[derive(Debug, Clone, Default)]
pub struct IsotonicRegression {
    x_thresholds: Vec<f64>,
    y_thresholds: Vec<f64>,
}

impl IsotonicRegression {
    pub fn fit(x: &[f64], y: &[f64]) -> BenchResult<Self> {
        if x.len() != y.len() {
            return Err(BenchError::DimensionMismatch(format!(
                "isotonic: {} inputs but {} targets",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(BenchError::EmptyInput);
        }

        let mut order: Vec<usize> = (0..x.len()).collect();
        order.sort_by(|&a, &b| x[a].total_cmp(&x[b]).then(y[a].total_cmp(&y[b])));

        // Merge (numerically) equal inputs into weighted means.
        let eps = 1e-15;
        let mut ux: Vec<f64> = Vec::new();
        let mut uy: Vec<f64> = Vec::new();
        let mut uw: Vec<f64> = Vec::new();
        let mut current_x = x[order[0]];
        let (mut sum_x, mut sum_y, mut weight) = (0.0, 0.0, 0.0);
        for &i in &order {
            if x[i] - current_x >= eps {
                ux.push(sum_x / weight);
                uy.push(sum_y / weight);
                uw.push(weight);
                current_x = x[i];
                sum_x = 0.0;
                sum_y = 0.0;
                weight = 0.0;
            }
            sum_x += x[i];
            sum_y += y[i];
            weight += 1.0;
        }
        ux.push(sum_x / weight);
        uy.push(sum_y / weight);
        uw.push(weight);

        let fitted = pool_adjacent_violators(&uy, &uw);

        // Interior points on a flat run carry no information for interpolation.
        let n = fitted.len();
        let mut x_thresholds = Vec::with_capacity(n);
        let mut y_thresholds = Vec::with_capacity(n);
        for i in 0..n {
            let keep = i == 0
                || i == n - 1
                || fitted[i - 1] != fitted[i]
                || fitted[i] != fitted[i + 1];
            if keep {
                x_thresholds.push(ux[i]);
                y_thresholds.push(fitted[i]);
            }
        }

        Ok(IsotonicRegression {
            x_thresholds,
            y_thresholds,
        })
    }

    pub fn thresholds(&self) -> (&[f64], &[f64]) {
        (&self.x_thresholds, &self.y_thresholds)
    }

    pub fn predict_one(&self, v: f64) -> f64 {
        let xs = &self.x_thresholds;
        let ys = &self.y_thresholds;
        match xs.len() {
            0 => f64::NAN,
            1 => ys[0],
            n => {
                if v <= xs[0] {
                    return ys[0];
                }
                if v >= xs[n - 1] {
                    return ys[n - 1];
                }
                let hi = xs.partition_point(|&t| t <= v);
                let lo = hi - 1;
                let t = (v - xs[lo]) / (xs[hi] - xs[lo]);
                ys[lo] + t * (ys[hi] - ys[lo])
            }
        }
    }

    pub fn predict(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&v| self.predict_one(v)).collect()
    }
}

/// Weighted least-squares non-decreasing fit of `y`.
pub fn pool_adjacent_violators(y: &[f64], w: &[f64]) -> Vec<f64> {
    // (weighted sum, weight, number of points)
    let mut blocks: Vec<(f64, f64, usize)> = Vec::with_capacity(y.len());
    for (&yi, &wi) in y.iter().zip(w.iter()) {
        blocks.push((yi * wi, wi, 1));
        while blocks.len() > 1 {
            let at = blocks.len() - 2;
            let last = blocks[at + 1];
            let prev = &mut blocks[at];
            if prev.0 / prev.1 < last.0 / last.1 {
                break;
            }
            prev.0 += last.0;
            prev.1 += last.1;
            prev.2 += last.2;
            blocks.pop();
        }
    }

    let mut out = Vec::with_capacity(y.len());
    for (sum, weight, count) in blocks {
        out.extend(std::iter::repeat(sum / weight).take(count));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_pava_pools_violators() {
        let fitted = pool_adjacent_violators(&[1.0, 3.0, 2.0, 4.0], &[1.0; 4]);
        assert_eq!(fitted, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn test_pava_cascading_merges_are_weighted() {
        // each new point merges back through every earlier block
        let fitted = pool_adjacent_violators(&[4.0, 3.0, 2.0, 0.0], &[1.0, 1.0, 1.0, 3.0]);
        for v in &fitted {
            assert_abs_diff_eq!(*v, 1.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_fit_is_monotone() {
        let x = [0.1, 0.4, 0.35, 0.8, 0.7, 0.9, 0.2];
        let y = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let iso = IsotonicRegression::fit(&x, &y).unwrap();
        let grid: Vec<f64> = (0..=20).map(|i| i as f64 / 20.0).collect();
        let pred = iso.predict(&grid);
        for w in pred.windows(2) {
            assert!(w[0] <= w[1] + 1e-12);
        }
        assert!(pred.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_clip_and_interpolate() {
        let iso = IsotonicRegression::fit(&[0.0, 1.0, 2.0], &[0.0, 0.5, 1.0]).unwrap();
        assert_abs_diff_eq!(iso.predict_one(-5.0), 0.0);
        assert_abs_diff_eq!(iso.predict_one(5.0), 1.0);
        assert_abs_diff_eq!(iso.predict_one(1.5), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_duplicate_inputs_are_averaged() {
        let iso = IsotonicRegression::fit(&[1.0, 1.0, 2.0], &[0.0, 1.0, 1.0]).unwrap();
        let (xs, ys) = iso.thresholds();
        assert_eq!(xs, &[1.0, 2.0]);
        assert_eq!(ys, &[0.5, 1.0]);
    }

    #[test]
    fn test_flat_runs_are_trimmed() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let iso = IsotonicRegression::fit(&x, &[0.0, 1.0, 1.0, 1.0, 2.0]).unwrap();
        let (xs, ys) = iso.thresholds();
        assert_eq!(xs, &[0.0, 1.0, 3.0, 4.0]);
        assert_eq!(ys, &[0.0, 1.0, 1.0, 2.0]);
        assert_abs_diff_eq!(iso.predict_one(2.0), 1.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(IsotonicRegression::fit(&[1.0], &[1.0, 2.0]).is_err());
        assert!(IsotonicRegression::fit(&[], &[]).is_err());
    }
}
