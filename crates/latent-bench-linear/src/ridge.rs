use std::fmt;
use std::str::FromStr;

use latent_bench_core::{BenchError, BenchResult, Estimator, ParamValue};
use latent_bench_linalg::{conjugate_gradient, lsqr, solve_spd, svd};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Strategy used to solve the ridge normal equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RidgeSolver {
    /// Same as `Cholesky` for dense inputs.
    Auto,
    Svd,
    Cholesky,
    Lsqr,
    SparseCg,
    Saga,
}

impl RidgeSolver {
    /// Solvers explored by the prediction benchmark.
    pub const SEARCH: [RidgeSolver; 5] = [
        RidgeSolver::Auto,
        RidgeSolver::Svd,
        RidgeSolver::Lsqr,
        RidgeSolver::SparseCg,
        RidgeSolver::Saga,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RidgeSolver::Auto => "auto",
            RidgeSolver::Svd => "svd",
            RidgeSolver::Cholesky => "cholesky",
            RidgeSolver::Lsqr => "lsqr",
            RidgeSolver::SparseCg => "sparse_cg",
            RidgeSolver::Saga => "saga",
        }
    }
}

impl fmt::Display for RidgeSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RidgeSolver {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(RidgeSolver::Auto),
            "svd" => Ok(RidgeSolver::Svd),
            "cholesky" => Ok(RidgeSolver::Cholesky),
            "lsqr" => Ok(RidgeSolver::Lsqr),
            "sparse_cg" => Ok(RidgeSolver::SparseCg),
            "saga" => Ok(RidgeSolver::Saga),
            other => Err(BenchError::invalid_parameter(
                "solver",
                format!("unknown ridge solver '{}'", other),
            )),
        }
    }
}

/// Ridge regression (L2-regularized least squares).
///
/// Minimizes `‖y − Xw − b‖² + α‖w‖²`. The intercept is not penalized: X and y
/// are centered before solving and `b = ȳ − x̄·w`.
#[derive(Debug, Clone)]
pub struct Ridge {
    pub alpha: f64,
    pub solver: RidgeSolver,
    pub fit_intercept: bool,
    /// Iteration cap for the iterative solvers; each picks its own default when `None`.
    pub max_iter: Option<usize>,
    pub tol: f64,
    /// Seed for the sample order of `saga`.
    pub random_state: u64,
    /// `[n_targets, n_features]`
    pub coef: Option<Array2<f64>>,
    /// `[n_targets]`
    pub intercept: Option<Array1<f64>>,
}

impl Ridge {
    pub fn new(alpha: f64) -> Self {
        Ridge {
            alpha,
            solver: RidgeSolver::Auto,
            fit_intercept: true,
            max_iter: None,
            tol: 1e-4,
            random_state: 0,
            coef: None,
            intercept: None,
        }
    }

    pub fn with_solver(mut self, solver: RidgeSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Fit one model per column of `y`.
    pub fn fit_multi(&mut self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> BenchResult<()> {
        let (n, p) = x.dim();
        if n == 0 || p == 0 {
            return Err(BenchError::EmptyInput);
        }
        if y.nrows() != n {
            return Err(BenchError::ShapeMismatch {
                expected: vec![n, y.ncols()],
                got: vec![y.nrows(), y.ncols()],
            });
        }
        if !(self.alpha >= 0.0) || !self.alpha.is_finite() {
            return Err(BenchError::invalid_parameter(
                "alpha",
                format!("must be a non-negative number, got {}", self.alpha),
            ));
        }

        let (x_c, y_c, x_mean, y_mean) = if self.fit_intercept {
            let x_mean = x.mean_axis(Axis(0)).ok_or(BenchError::EmptyInput)?;
            let y_mean = y.mean_axis(Axis(0)).ok_or(BenchError::EmptyInput)?;
            (&x - &x_mean, &y - &y_mean, x_mean, y_mean)
        } else {
            (
                x.to_owned(),
                y.to_owned(),
                Array1::zeros(p),
                Array1::zeros(y.ncols()),
            )
        };

        // [n_features, n_targets]
        let coef = match self.solver {
            RidgeSolver::Auto | RidgeSolver::Cholesky => self.solve_cholesky(&x_c, &y_c)?,
            RidgeSolver::Svd => self.solve_svd(&x_c, &y_c)?,
            RidgeSolver::Lsqr => self.solve_lsqr(&x_c, &y_c)?,
            RidgeSolver::SparseCg => self.solve_sparse_cg(&x_c, &y_c)?,
            RidgeSolver::Saga => self.solve_saga(&x_c, &y_c)?,
        };

        self.intercept = Some(&y_mean - &x_mean.dot(&coef));
        self.coef = Some(coef.reversed_axes());
        Ok(())
    }

    /// Raw predictions, `[n_samples, n_targets]`.
    pub fn decision(&self, x: ArrayView2<'_, f64>) -> BenchResult<Array2<f64>> {
        let coef = self.coef.as_ref().ok_or(BenchError::NotFitted)?;
        let intercept = self.intercept.as_ref().ok_or(BenchError::NotFitted)?;
        if x.ncols() != coef.ncols() {
            return Err(BenchError::ShapeMismatch {
                expected: vec![x.nrows(), coef.ncols()],
                got: vec![x.nrows(), x.ncols()],
            });
        }
        Ok(x.dot(&coef.t()) + intercept)
    }

    fn solve_cholesky(&self, x: &Array2<f64>, y: &Array2<f64>) -> BenchResult<Array2<f64>> {
        let (n, p) = x.dim();
        if n >= p {
            let mut gram = x.t().dot(x);
            gram.diag_mut().mapv_inplace(|d| d + self.alpha);
            solve_spd(gram.view(), x.t().dot(y).view())
        } else {
            // Dual form: (XXᵀ + αI) a = y, w = Xᵀa
            let mut kernel = x.dot(&x.t());
            kernel.diag_mut().mapv_inplace(|d| d + self.alpha);
            let dual = solve_spd(kernel.view(), y.view())?;
            Ok(x.t().dot(&dual))
        }
    }

    fn solve_svd(&self, x: &Array2<f64>, y: &Array2<f64>) -> BenchResult<Array2<f64>> {
        let d = svd(x.view())?;
        let cutoff = d.s.iter().cloned().fold(0.0, f64::max) * 1e-15;
        let shrink = d.s.mapv(|s| if s > cutoff { s / (s * s + self.alpha) } else { 0.0 });
        let uty = d.u.t().dot(y);
        let scaled = &uty * &shrink.insert_axis(Axis(1));
        Ok(d.vt.t().dot(&scaled))
    }

    fn solve_lsqr(&self, x: &Array2<f64>, y: &Array2<f64>) -> BenchResult<Array2<f64>> {
        let p = x.ncols();
        let max_iter = self.max_iter.unwrap_or(2 * p.max(x.nrows()));
        let damp = self.alpha.sqrt();
        let mut coef = Array2::<f64>::zeros((p, y.ncols()));
        for (t, target) in y.axis_iter(Axis(1)).enumerate() {
            let sol = lsqr(x.view(), target, damp, self.tol, max_iter)?;
            if !sol.converged {
                log::warn!(
                    "lsqr did not converge after {} iterations (alpha={})",
                    sol.iterations,
                    self.alpha
                );
            }
            coef.column_mut(t).assign(&sol.x);
        }
        Ok(coef)
    }

    fn solve_sparse_cg(&self, x: &Array2<f64>, y: &Array2<f64>) -> BenchResult<Array2<f64>> {
        let p = x.ncols();
        let max_iter = self.max_iter.unwrap_or(10 * p);
        let alpha = self.alpha;
        let op = |w: &Array1<f64>| {
            let mut out = x.t().dot(&x.dot(w));
            out.scaled_add(alpha, w);
            out
        };
        let mut coef = Array2::<f64>::zeros((p, y.ncols()));
        for (t, target) in y.axis_iter(Axis(1)).enumerate() {
            let rhs = x.t().dot(&target);
            let sol = conjugate_gradient(&op, rhs.view(), self.tol, max_iter)?;
            if !sol.converged {
                log::warn!(
                    "sparse_cg did not converge after {} iterations (alpha={})",
                    sol.iterations,
                    alpha
                );
            }
            coef.column_mut(t).assign(&sol.x);
        }
        Ok(coef)
    }

    fn solve_saga(&self, x: &Array2<f64>, y: &Array2<f64>) -> BenchResult<Array2<f64>> {
        let (n, p) = x.dim();
        let max_iter = self.max_iter.unwrap_or(1000);
        let mut coef = Array2::<f64>::zeros((p, y.ncols()));
        for (t, target) in y.axis_iter(Axis(1)).enumerate() {
            let (w, epochs, converged) = saga(
                x.view(),
                target,
                self.alpha / n as f64,
                self.tol,
                max_iter,
                self.random_state,
            );
            if !converged {
                log::warn!(
                    "saga did not converge after {} epochs (alpha={})",
                    epochs,
                    self.alpha
                );
            }
            coef.column_mut(t).assign(&w);
        }
        Ok(coef)
    }
}

/// SAGA on `(1/n) Σ ½(xᵢ·w − yᵢ)² + (μ/2)‖w‖²`.
///
/// Returns the weights, the number of epochs run and whether the relative
/// weight change fell below `tol`.
fn saga(
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    mu: f64,
    tol: f64,
    max_iter: usize,
    seed: u64,
) -> (Array1<f64>, usize, bool) {
    let (n, p) = x.dim();
    let n_f = n as f64;
    let max_sq = x
        .axis_iter(Axis(0))
        .map(|row| row.dot(&row))
        .fold(0.0, f64::max);
    let lipschitz = max_sq + mu;
    let step = 1.0 / (2.0 * lipschitz + (2.0 * n_f * mu).min(lipschitz));
    let shrink = 1.0 - step * mu;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut w = Array1::<f64>::zeros(p);
    let mut memory = vec![0.0; n];
    let mut grad_sum = Array1::<f64>::zeros(p);

    for epoch in 0..max_iter {
        let previous = w.clone();
        for _ in 0..n {
            let i = rng.gen_range(0..n);
            let row = x.row(i);
            let grad = row.dot(&w) - y[i];
            let delta = grad - memory[i];

            w *= shrink;
            w.scaled_add(-step * delta, &row);
            w.scaled_add(-step / n_f, &grad_sum);

            grad_sum.scaled_add(delta, &row);
            memory[i] = grad;
        }

        let max_change = w
            .iter()
            .zip(previous.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        let max_weight = w.iter().map(|v| v.abs()).fold(0.0, f64::max);
        if max_change == 0.0 || (max_weight > 0.0 && max_change / max_weight <= tol) {
            return (w, epoch + 1, true);
        }
    }

    (w, max_iter, false)
}

impl Estimator for Ridge {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> BenchResult<()> {
        let y_col = y.insert_axis(Axis(1));
        self.fit_multi(x, y_col)
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> BenchResult<Array1<f64>> {
        Ok(self.decision(x)?.column(0).to_owned())
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> BenchResult<()> {
        match name {
            "alpha" => {
                self.alpha = value
                    .as_f64()
                    .ok_or_else(|| BenchError::invalid_parameter(name, "expected a number"))?;
            }
            "solver" => {
                self.solver = value
                    .as_str()
                    .ok_or_else(|| BenchError::invalid_parameter(name, "expected a solver name"))?
                    .parse()?;
            }
            "tol" => {
                self.tol = value
                    .as_f64()
                    .ok_or_else(|| BenchError::invalid_parameter(name, "expected a number"))?;
            }
            other => return Err(BenchError::invalid_parameter(other, "not a Ridge parameter")),
        }
        Ok(())
    }
}
