//! # latent-bench
//!
//! Compare learned latent spaces by how well repeated draws of each embedding
//! predict clinical and demographic variables.
//!
//! ## Modules
//!
//! - **core**: Errors, the `Estimator` trait, parameter sets, target columns, label encoding
//! - **linalg**: Cholesky, LU, symmetric eigen, SVD, conjugate gradient, LSQR
//! - **linear**: Ridge (five solvers), RidgeClassifier, isotonic regression, calibrated classifier
//! - **metrics**: MAE, ROC AUC (binary and one-vs-rest), search scorers
//! - **selection**: Stratified k-fold, multilabel stratified shuffle split, parameter grid,
//!   grid search
//! - **stats**: Student t distribution, one-sample and independent t-tests, significance stars
//! - **io**: `.npz` latent archives, TSV metadata tables and report writers
//! - **plot**: Bar plots with strip points and stars, heatmaps, curves, figure grids
//! - **workflow**: Configuration and the prediction benchmark

/// Errors, traits and target handling.
pub use latent_bench_core as core;

/// Linear algebra routines.
pub use latent_bench_linalg as linalg;

/// Linear models and calibration.
pub use latent_bench_linear as linear;

/// Evaluation metrics.
pub use latent_bench_metrics as metrics;

/// Cross-validation and parameter search.
pub use latent_bench_selection as selection;

/// Statistical tests.
pub use latent_bench_stats as stats;

/// Input and report files.
pub use latent_bench_io as io;

/// Plotting.
pub use latent_bench_plot as plot;

/// The prediction benchmark.
pub use latent_bench_workflow as workflow;
