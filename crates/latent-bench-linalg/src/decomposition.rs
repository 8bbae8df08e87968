use latent_bench_core::{BenchError, BenchResult};
use ndarray::{Array1, Array2, ArrayView2};

/// LU decomposition result: P * A = L * U
pub struct LuDecomposition {
    pub l: Array2<f64>,
    pub u: Array2<f64>,
    pub pivot: Vec<usize>,
}

/// Symmetric eigendecomposition: A = V * diag(values) * Vᵀ
pub struct SymmetricEigen {
    /// Eigenvalues, descending.
    pub values: Array1<f64>,
    /// Eigenvectors as columns, in the order of `values`.
    pub vectors: Array2<f64>,
}

fn require_square(a: &ArrayView2<'_, f64>, what: &str) -> BenchResult<usize> {
    let (n, m) = a.dim();
    if n != m {
        return Err(BenchError::InvalidOperation(format!(
            "{} requires a square matrix, got {}x{}",
            what, n, m
        )));
    }
    if n == 0 {
        return Err(BenchError::EmptyInput);
    }
    Ok(n)
}

/// LU decomposition with partial pivoting.
pub fn lu(a: ArrayView2<'_, f64>) -> BenchResult<LuDecomposition> {
    let n = require_square(&a, "LU")?;

    let mut u = a.to_owned();
    let mut l = Array2::<f64>::zeros((n, n));
    let mut pivot: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let mut max_val = u[[k, k]].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let v = u[[i, k]].abs();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }

        if max_val < f64::EPSILON {
            return Err(BenchError::SingularMatrix);
        }

        if max_row != k {
            pivot.swap(k, max_row);
            for j in 0..n {
                u.swap([k, j], [max_row, j]);
            }
            for j in 0..k {
                l.swap([k, j], [max_row, j]);
            }
        }

        l[[k, k]] = 1.0;

        for i in (k + 1)..n {
            let factor = u[[i, k]] / u[[k, k]];
            l[[i, k]] = factor;
            for j in k..n {
                u[[i, j]] -= factor * u[[k, j]];
            }
        }
    }

    Ok(LuDecomposition { l, u, pivot })
}

/// Cholesky decomposition for symmetric positive-definite matrices: A = L * Lᵀ
pub fn cholesky(a: ArrayView2<'_, f64>) -> BenchResult<Array2<f64>> {
    let n = require_square(&a, "Cholesky")?;
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let val = a[[i, i]] - sum;
                if val <= 0.0 || !val.is_finite() {
                    return Err(BenchError::SingularMatrix);
                }
                l[[i, j]] = val.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    Ok(l)
}

/// Eigendecomposition of a symmetric matrix by cyclic Jacobi rotations.
pub fn symmetric_eigen(a: ArrayView2<'_, f64>) -> BenchResult<SymmetricEigen> {
    let n = require_square(&a, "symmetric_eigen")?;
    let mut m = a.to_owned();
    let mut v = Array2::<f64>::eye(n);

    let norm: f64 = m.iter().map(|x| x * x).sum::<f64>().sqrt();
    let tol = 1e-14 * norm.max(f64::MIN_POSITIVE);

    for _sweep in 0..100 {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += m[[p, q]] * m[[p, q]];
            }
        }
        if off.sqrt() <= tol {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = m[[p, q]];
                if apq.abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (m[[q, q]] - m[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let mkp = m[[k, p]];
                    let mkq = m[[k, q]];
                    m[[k, p]] = c * mkp - s * mkq;
                    m[[k, q]] = s * mkp + c * mkq;
                }
                for k in 0..n {
                    let mpk = m[[p, k]];
                    let mqk = m[[q, k]];
                    m[[p, k]] = c * mpk - s * mqk;
                    m[[q, k]] = s * mpk + c * mqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| m[[j, j]].total_cmp(&m[[i, i]]));

    let values = Array1::from_iter(order.iter().map(|&i| m[[i, i]]));
    let mut vectors = Array2::<f64>::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        vectors.column_mut(dst).assign(&v.column(src));
    }

    Ok(SymmetricEigen { values, vectors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_lu() {
        let a = array![[2.0, 1.0, 1.0], [4.0, 3.0, 3.0], [8.0, 7.0, 9.0]];
        let decomp = lu(a.view()).unwrap();
        let product = decomp.l.dot(&decomp.u);
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(product[[i, j]], a[[decomp.pivot[i], j]], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_lu_singular() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(lu(a.view()), Err(BenchError::SingularMatrix)));
    }

    #[test]
    fn test_cholesky() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let l = cholesky(a.view()).unwrap();
        let llt = l.dot(&l.t());
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(llt[[i, j]], a[[i, j]], epsilon = 1e-10);
            }
        }
        assert_eq!(l[[0, 1]], 0.0);
    }

    #[test]
    fn test_cholesky_not_positive_definite() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(matches!(cholesky(a.view()), Err(BenchError::SingularMatrix)));
    }

    #[test]
    fn test_symmetric_eigen() {
        let a = array![[2.0, 1.0, 0.0], [1.0, 2.0, 0.0], [0.0, 0.0, 5.0]];
        let eig = symmetric_eigen(a.view()).unwrap();
        assert_abs_diff_eq!(eig.values[0], 5.0, epsilon = 1e-10);
        assert_abs_diff_eq!(eig.values[1], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(eig.values[2], 1.0, epsilon = 1e-10);

        let rebuilt = eig.vectors.dot(&Array2::from_diag(&eig.values)).dot(&eig.vectors.t());
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(rebuilt[[i, j]], a[[i, j]], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_non_square_rejected() {
        let a = Array2::<f64>::zeros((2, 3));
        assert!(lu(a.view()).is_err());
        assert!(cholesky(a.view()).is_err());
    }
}
