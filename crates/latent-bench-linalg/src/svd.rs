use latent_bench_core::{BenchError, BenchResult};
use ndarray::{s, Array1, Array2, ArrayView2};

use crate::decomposition::symmetric_eigen;

/// Thin singular value decomposition `A = U Σ Vᵀ`.
pub struct Svd {
    /// `[m, k]` left singular vectors.
    pub u: Array2<f64>,
    /// `[k]` singular values, descending.
    pub s: Array1<f64>,
    /// `[k, n]` right singular vectors, transposed.
    pub vt: Array2<f64>,
}

/// SVD through the eigendecomposition of `AᵀA`, with k = min(m, n).
pub fn svd(a: ArrayView2<'_, f64>) -> BenchResult<Svd> {
    let (m, n) = a.dim();
    if m == 0 || n == 0 {
        return Err(BenchError::EmptyInput);
    }
    let k = m.min(n);

    let ata = a.t().dot(&a);
    let eig = symmetric_eigen(ata.view())?;

    let s = eig.values.slice(s![..k]).mapv(|ev| ev.max(0.0).sqrt());
    let v = eig.vectors.slice(s![.., ..k]).to_owned();

    // U = A V Σ⁻¹, zero columns for vanishing singular values
    let av = a.dot(&v);
    let scale = s[0] * 1e-7;
    let mut u = Array2::<f64>::zeros((m, k));
    for j in 0..k {
        if s[j] > scale && s[j] > 0.0 {
            let col = av.column(j).mapv(|x| x / s[j]);
            u.column_mut(j).assign(&col);
        }
    }

    Ok(Svd {
        u,
        s,
        vt: v.t().to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_svd_reconstruction() {
        let a = array![[3.0, 1.0], [1.0, 3.0], [0.0, 2.0]];
        let d = svd(a.view()).unwrap();
        assert_eq!(d.u.dim(), (3, 2));
        assert_eq!(d.vt.dim(), (2, 2));
        assert!(d.s[0] >= d.s[1]);

        let rebuilt = d.u.dot(&Array2::from_diag(&d.s)).dot(&d.vt);
        for i in 0..3 {
            for j in 0..2 {
                assert_abs_diff_eq!(rebuilt[[i, j]], a[[i, j]], epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_singular_values_of_diagonal() {
        let a = array![[2.0, 0.0], [0.0, -5.0]];
        let d = svd(a.view()).unwrap();
        assert_abs_diff_eq!(d.s[0], 5.0, epsilon = 1e-10);
        assert_abs_diff_eq!(d.s[1], 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_rank_deficient() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let d = svd(a.view()).unwrap();
        assert!(d.s[1].abs() < 1e-6);
        assert!(d.u.column(1).iter().all(|&x| x == 0.0));
    }
}
