use latent_bench_core::{BenchError, BenchResult};
use ndarray::ArrayView1;

fn check_lengths(y_true: &ArrayView1<'_, f64>, y_pred: &ArrayView1<'_, f64>) -> BenchResult<()> {
    if y_true.len() != y_pred.len() {
        return Err(BenchError::ShapeMismatch {
            expected: vec![y_true.len()],
            got: vec![y_pred.len()],
        });
    }
    if y_true.is_empty() {
        return Err(BenchError::EmptyInput);
    }
    Ok(())
}

/// Mean Absolute Error.
pub fn mean_absolute_error(
    y_true: ArrayView1<'_, f64>,
    y_pred: ArrayView1<'_, f64>,
) -> BenchResult<f64> {
    check_lengths(&y_true, &y_pred)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).abs())
        .sum();
    Ok(sum / y_true.len() as f64)
}
