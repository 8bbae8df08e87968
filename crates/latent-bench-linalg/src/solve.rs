use latent_bench_core::{BenchError, BenchResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::decomposition::{cholesky, lu};

/// Solve the linear system Ax = b using LU decomposition.
pub fn solve(a: ArrayView2<'_, f64>, b: ArrayView1<'_, f64>) -> BenchResult<Array1<f64>> {
    let n = a.nrows();
    if b.len() != n {
        return Err(BenchError::DimensionMismatch(format!(
            "solve: b has {} elements but A is {}x{}",
            b.len(),
            n,
            a.ncols()
        )));
    }

    let decomp = lu(a)?;

    // Forward substitution: L * y = P * b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += decomp.l[[i, j]] * y[j];
        }
        y[i] = b[decomp.pivot[i]] - sum;
    }

    // Back substitution: U * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += decomp.u[[i, j]] * x[j];
        }
        let diag = decomp.u[[i, i]];
        if diag.abs() < f64::EPSILON {
            return Err(BenchError::SingularMatrix);
        }
        x[i] = (y[i] - sum) / diag;
    }

    Ok(x)
}

/// Solve L * Lᵀ * X = B given the lower Cholesky factor, one column of B at a time.
pub fn cholesky_solve(l: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> BenchResult<Array2<f64>> {
    let n = l.nrows();
    if b.nrows() != n {
        return Err(BenchError::DimensionMismatch(format!(
            "cholesky_solve: b has {} rows but L is {}x{}",
            b.nrows(),
            n,
            l.ncols()
        )));
    }

    let mut x = Array2::<f64>::zeros(b.raw_dim());
    for col in 0..b.ncols() {
        let rhs = b.column(col);

        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut sum = 0.0;
            for k in 0..i {
                sum += l[[i, k]] * y[k];
            }
            y[i] = (rhs[i] - sum) / l[[i, i]];
        }

        for i in (0..n).rev() {
            let mut sum = 0.0;
            for k in (i + 1)..n {
                sum += l[[k, i]] * x[[k, col]];
            }
            x[[i, col]] = (y[i] - sum) / l[[i, i]];
        }
    }

    Ok(x)
}

/// Solve a symmetric positive-definite system A * X = B.
pub fn solve_spd(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> BenchResult<Array2<f64>> {
    let l = cholesky(a)?;
    cholesky_solve(l.view(), b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_solve() {
        // 2x + y = 5
        // x + 3y = 7
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![5.0, 7.0];
        let x = solve(a.view(), b.view()).unwrap();
        assert_abs_diff_eq!(x[0], 1.6, epsilon = 1e-10);
        assert_abs_diff_eq!(x[1], 1.8, epsilon = 1e-10);
    }

    #[test]
    fn test_solve_with_pivoting() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let b = array![3.0, 4.0];
        let x = solve(a.view(), b.view()).unwrap();
        assert_abs_diff_eq!(x[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_spd_multiple_columns() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![[2.0, 8.0], [1.0, 7.0]];
        let x = solve_spd(a.view(), b.view()).unwrap();
        let back = a.dot(&x);
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(back[[i, j]], b[[i, j]], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        let b = array![1.0, 2.0, 3.0];
        assert!(matches!(
            solve(a.view(), b.view()),
            Err(BenchError::DimensionMismatch(_))
        ));
    }
}
