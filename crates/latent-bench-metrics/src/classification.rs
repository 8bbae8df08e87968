use ndarray::{ArrayView1, ArrayView2};

/// 1-based ranks with ties sharing their average rank.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end (0-based) share ranks start+1..=end.
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// ROC-AUC for binary labels (`1.0` positive, anything else negative).
///
/// Uses the Mann–Whitney rank statistic, which equals the trapezoidal area
/// under the ROC curve including tied scores. Returns `None` when only one
/// class is present.
pub fn roc_auc_binary(y_true: ArrayView1<'_, f64>, scores: ArrayView1<'_, f64>) -> Option<f64> {
    if y_true.len() != scores.len() {
        return None;
    }
    let scores: Vec<f64> = scores.to_vec();
    let ranks = average_ranks(&scores);

    let mut n_pos = 0.0;
    let mut rank_sum = 0.0;
    for (&label, &rank) in y_true.iter().zip(ranks.iter()) {
        if label == 1.0 {
            n_pos += 1.0;
            rank_sum += rank;
        }
    }
    let n_neg = y_true.len() as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return None;
    }
    Some((rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Macro-averaged one-vs-rest ROC-AUC.
///
/// Columns of `proba` correspond to the sorted distinct labels of `y_true`.
/// With two columns the second one scores the positive class.
pub fn roc_auc_ovr(y_true: ArrayView1<'_, f64>, proba: ArrayView2<'_, f64>) -> Option<f64> {
    if y_true.len() != proba.nrows() {
        return None;
    }
    let mut classes: Vec<f64> = y_true.to_vec();
    classes.sort_by(|a, b| a.total_cmp(b));
    classes.dedup();
    if classes.len() < 2 || classes.len() != proba.ncols() {
        return None;
    }

    let indicator = |class: f64| y_true.mapv(|v| if v == class { 1.0 } else { 0.0 });
    if classes.len() == 2 {
        return roc_auc_binary(indicator(classes[1]).view(), proba.column(1));
    }

    let mut total = 0.0;
    for (j, &class) in classes.iter().enumerate() {
        total += roc_auc_binary(indicator(class).view(), proba.column(j))?;
    }
    Some(total / classes.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_average_ranks() {
        assert_eq!(average_ranks(&[10.0, 20.0, 10.0, 30.0]), vec![1.5, 3.0, 1.5, 4.0]);
    }

    #[test]
    fn test_perfect_auc() {
        let y = array![0.0, 0.0, 1.0, 1.0];
        let s = array![0.1, 0.2, 0.8, 0.9];
        assert_abs_diff_eq!(roc_auc_binary(y.view(), s.view()).unwrap(), 1.0);
    }

    #[test]
    fn test_auc_with_ties() {
        let y = array![0.0, 0.0, 1.0, 1.0];
        let s = array![0.1, 0.4, 0.35, 0.8];
        assert_abs_diff_eq!(roc_auc_binary(y.view(), s.view()).unwrap(), 0.75, epsilon = 1e-12);

        let tied = array![0.5, 0.5, 0.5, 0.5];
        assert_abs_diff_eq!(roc_auc_binary(y.view(), tied.view()).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_auc_single_class() {
        let y = array![1.0, 1.0];
        let s = array![0.2, 0.3];
        assert!(roc_auc_binary(y.view(), s.view()).is_none());
    }

    #[test]
    fn test_ovr_binary_uses_second_column() {
        let y = array![3.0, 3.0, 7.0, 7.0];
        let proba = array![[0.9, 0.1], [0.6, 0.4], [0.3, 0.7], [0.2, 0.8]];
        assert_abs_diff_eq!(roc_auc_ovr(y.view(), proba.view()).unwrap(), 1.0);
    }

    #[test]
    fn test_ovr_multiclass() {
        let y = array![0.0, 1.0, 2.0, 0.0, 1.0, 2.0];
        let proba = array![
            [0.8, 0.1, 0.1],
            [0.1, 0.8, 0.1],
            [0.1, 0.1, 0.8],
            [0.6, 0.3, 0.1],
            [0.3, 0.6, 0.1],
            [0.2, 0.2, 0.6],
        ];
        assert_abs_diff_eq!(roc_auc_ovr(y.view(), proba.view()).unwrap(), 1.0);
    }

    #[test]
    fn test_ovr_column_count_mismatch() {
        let y = array![0.0, 1.0, 0.0, 1.0];
        let proba = array![[0.5, 0.3, 0.2], [0.2, 0.5, 0.3], [0.6, 0.2, 0.2], [0.1, 0.8, 0.1]];
        assert!(roc_auc_ovr(y.view(), proba.view()).is_none());
    }
}
