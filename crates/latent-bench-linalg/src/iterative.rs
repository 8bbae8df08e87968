use latent_bench_core::{BenchError, BenchResult};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Result of an iterative solver.
#[derive(Debug, Clone)]
pub struct IterativeSolution {
    pub x: Array1<f64>,
    pub iterations: usize,
    pub converged: bool,
}

fn norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

/// Conjugate gradient for a symmetric positive-definite operator `op`.
///
/// Stops when ‖r‖ ≤ tol·‖b‖.
pub fn conjugate_gradient<F>(
    op: F,
    b: ArrayView1<'_, f64>,
    tol: f64,
    max_iter: usize,
) -> BenchResult<IterativeSolution>
where
    F: Fn(&Array1<f64>) -> Array1<f64>,
{
    let n = b.len();
    let mut x = Array1::<f64>::zeros(n);
    let mut r = b.to_owned();
    let b_norm = norm(&r);
    if b_norm == 0.0 {
        return Ok(IterativeSolution {
            x,
            iterations: 0,
            converged: true,
        });
    }

    let mut p = r.clone();
    let mut rs = r.dot(&r);

    for iter in 0..max_iter {
        let ap = op(&p);
        if ap.len() != n {
            return Err(BenchError::DimensionMismatch(format!(
                "conjugate_gradient: operator returned {} values for {} unknowns",
                ap.len(),
                n
            )));
        }
        let pap = p.dot(&ap);
        if pap <= 0.0 {
            return Err(BenchError::SingularMatrix);
        }
        let step = rs / pap;
        x.scaled_add(step, &p);
        r.scaled_add(-step, &ap);

        let rs_new = r.dot(&r);
        if rs_new.sqrt() <= tol * b_norm {
            return Ok(IterativeSolution {
                x,
                iterations: iter + 1,
                converged: true,
            });
        }
        p = &r + &(p * (rs_new / rs));
        rs = rs_new;
    }

    Ok(IterativeSolution {
        x,
        iterations: max_iter,
        converged: false,
    })
}

fn sym_ortho(a: f64, b: f64) -> (f64, f64, f64) {
    let r = a.hypot(b);
    if r == 0.0 {
        (1.0, 0.0, 0.0)
    } else {
        (a / r, b / r, r)
    }
}

/// LSQR (Paige & Saunders) for `min ‖Ax − b‖² + damp²‖x‖²`.
///
/// `tol` is used for both the residual and the normal-equation stopping tests.
pub fn lsqr(
    a: ArrayView2<'_, f64>,
    b: ArrayView1<'_, f64>,
    damp: f64,
    tol: f64,
    max_iter: usize,
) -> BenchResult<IterativeSolution> {
    let (m, n) = a.dim();
    if b.len() != m {
        return Err(BenchError::DimensionMismatch(format!(
            "lsqr: b has {} elements but A has {} rows",
            b.len(),
            m
        )));
    }

    let mut x = Array1::<f64>::zeros(n);
    let mut u = b.to_owned();
    let b_norm = norm(&u);
    let mut beta = b_norm;
    if beta > 0.0 {
        u /= beta;
    }
    let mut v = a.t().dot(&u);
    let mut alpha = norm(&v);
    if alpha > 0.0 {
        v /= alpha;
    }
    if alpha * beta == 0.0 {
        return Ok(IterativeSolution {
            x,
            iterations: 0,
            converged: true,
        });
    }

    let mut w = v.clone();
    let mut rhobar = alpha;
    let mut phibar = beta;
    let mut a_norm = 0.0f64;
    let mut res2 = 0.0f64;
    let damp_sq = damp * damp;

    for iter in 0..max_iter {
        u = a.dot(&v) - &(u * alpha);
        beta = norm(&u);
        if beta > 0.0 {
            u /= beta;
            a_norm = (a_norm * a_norm + alpha * alpha + beta * beta + damp_sq).sqrt();
            v = a.t().dot(&u) - &(v * beta);
            alpha = norm(&v);
            if alpha > 0.0 {
                v /= alpha;
            }
        }

        // Eliminate the damping term, then the subdiagonal.
        let (rhobar1, psi) = if damp > 0.0 {
            let rhobar1 = rhobar.hypot(damp);
            let cs1 = rhobar / rhobar1;
            let sn1 = damp / rhobar1;
            let psi = sn1 * phibar;
            phibar *= cs1;
            (rhobar1, psi)
        } else {
            (rhobar, 0.0)
        };

        let (cs, sn, rho) = sym_ortho(rhobar1, beta);
        let theta = sn * alpha;
        rhobar = -cs * alpha;
        let phi = cs * phibar;
        phibar *= sn;
        let tau = sn * phi;

        x.scaled_add(phi / rho, &w);
        w = &v - &(w * (theta / rho));

        res2 += psi * psi;
        let r_norm = (phibar * phibar + res2).sqrt();
        let ar_norm = alpha * tau.abs();

        let test1 = r_norm / b_norm;
        let test2 = ar_norm / (a_norm * r_norm + f64::EPSILON);
        let x_norm = norm(&x);
        let rtol = tol + tol * a_norm * x_norm / b_norm;

        if test1 <= rtol || test2 <= tol || alpha == 0.0 {
            return Ok(IterativeSolution {
                x,
                iterations: iter + 1,
                converged: true,
            });
        }
    }

    Ok(IterativeSolution {
        x,
        iterations: max_iter,
        converged: false,
    })
}
