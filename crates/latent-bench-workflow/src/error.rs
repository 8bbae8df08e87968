use std::path::PathBuf;

use latent_bench_core::BenchError;
use latent_bench_io::IoError;
use latent_bench_plot::PlotError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Bench(#[from] BenchError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Plot(#[from] PlotError),

    #[error("cannot create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("latent data must have the same keys: test {test:?}, train {train:?}")]
    KeyMismatch { test: Vec<String>, train: Vec<String> },

    #[error("metadata must have the same columns: test {test:?}, train {train:?}")]
    ColumnMismatch { test: Vec<String>, train: Vec<String> },

    #[error("'{key}': train latent dim {train} differs from test latent dim {test}")]
    LatentDimMismatch { key: String, train: usize, test: usize },

    #[error("'{key}': {got} draws, expected {expected}")]
    DrawMismatch {
        key: String,
        expected: usize,
        got: usize,
    },

    #[error("'{key}' ({split}): {subjects} subjects but {rows} metadata rows")]
    SubjectMismatch {
        key: String,
        split: &'static str,
        subjects: usize,
        rows: usize,
    },

    #[error("no default stratification columns for dataset '{0}'; set `stratify`")]
    MissingStratification(String),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
