use serde::Serialize;

use crate::special::student_t_two_sided;

/// A t statistic with its two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TtestResult {
    pub statistic: f64,
    pub pvalue: f64,
    pub df: f64,
}

impl TtestResult {
    fn nan(df: f64) -> Self {
        TtestResult {
            statistic: f64::NAN,
            pvalue: f64::NAN,
            df,
        }
    }

    fn from_difference(diff: f64, stderr: f64, df: f64) -> Self {
        let statistic = if stderr == 0.0 {
            if diff == 0.0 {
                f64::NAN
            } else {
                diff.signum() * f64::INFINITY
            }
        } else {
            diff / stderr
        };
        TtestResult {
            statistic,
            pvalue: student_t_two_sided(statistic, df),
            df,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with one degree of freedom removed.
fn sample_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (values.len() as f64 - 1.0)
}

/// One-sample two-sided t-test of `H0: mean(a) == popmean`.
pub fn ttest_1samp(a: &[f64], popmean: f64) -> TtestResult {
    let n = a.len() as f64;
    let df = n - 1.0;
    if a.len() < 2 {
        return TtestResult::nan(df);
    }
    let m = mean(a);
    let stderr = (sample_variance(a, m) / n).sqrt();
    TtestResult::from_difference(m - popmean, stderr, df)
}

/// Two-sample two-sided t-test assuming equal variances (pooled).
pub fn ttest_ind(a: &[f64], b: &[f64]) -> TtestResult {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let df = n1 + n2 - 2.0;
    if a.is_empty() || b.is_empty() || df <= 0.0 {
        return TtestResult::nan(df);
    }
    let (m1, m2) = (mean(a), mean(b));
    let ss1: f64 = a.iter().map(|v| (v - m1) * (v - m1)).sum();
    let ss2: f64 = b.iter().map(|v| (v - m2) * (v - m2)).sum();
    let pooled = (ss1 + ss2) / df;
    let stderr = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    TtestResult::from_difference(m1 - m2, stderr, df)
}

const STAR_THRESHOLDS: [f64; 4] = [1.0, 0.05, 0.001, 0.0001];
const STARS: [&str; 4] = ["n.s.", "*", "**", "***"];

/// Significance marker: the strictest threshold the p-value falls under.
pub fn significance_stars(pvalue: f64) -> &'static str {
    STAR_THRESHOLDS
        .iter()
        .rposition(|&t| pvalue < t)
        .map(|i| STARS[i])
        .unwrap_or(STARS[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ttest_1samp() {
        // scipy.stats.ttest_1samp([1, 2, 3, 4, 5], 2)
        let res = ttest_1samp(&[1.0, 2.0, 3.0, 4.0, 5.0], 2.0);
        assert_abs_diff_eq!(res.statistic, 1.414_213_562_373_095, epsilon = 1e-12);
        assert_abs_diff_eq!(res.pvalue, 0.230_199_641_080_544_5, epsilon = 1e-9);
        assert_eq!(res.df, 4.0);
    }

    #[test]
    fn test_ttest_ind_pooled() {
        // scipy.stats.ttest_ind([1, 2, 3, 4], [3, 4, 5, 6])
        let res = ttest_ind(&[1.0, 2.0, 3.0, 4.0], &[3.0, 4.0, 5.0, 6.0]);
        assert_abs_diff_eq!(res.statistic, -2.190_890_230_020_664_5, epsilon = 1e-12);
        assert_abs_diff_eq!(res.pvalue, 0.070_987_654_320_987_6, epsilon = 1e-9);
        assert_eq!(res.df, 6.0);
    }

    #[test]
    fn test_zero_variance() {
        let same = ttest_ind(&[1.0, 1.0], &[1.0, 1.0]);
        assert!(same.statistic.is_nan());
        assert!(same.pvalue.is_nan());

        let shifted = ttest_1samp(&[2.0, 2.0, 2.0], 0.0);
        assert_eq!(shifted.statistic, f64::INFINITY);
        assert_eq!(shifted.pvalue, 0.0);
    }

    #[test]
    fn test_too_few_samples() {
        assert!(ttest_1samp(&[1.0], 0.0).pvalue.is_nan());
        assert!(ttest_ind(&[1.0], &[2.0]).pvalue.is_nan());
    }

    #[test]
    fn test_significance_stars() {
        assert_eq!(significance_stars(0.5), "n.s.");
        assert_eq!(significance_stars(0.05), "n.s.");
        assert_eq!(significance_stars(0.04), "*");
        assert_eq!(significance_stars(0.0005), "**");
        assert_eq!(significance_stars(0.00001), "***");
        assert_eq!(significance_stars(1.0), "n.s.");
        assert_eq!(significance_stars(f64::NAN), "n.s.");
    }
}
