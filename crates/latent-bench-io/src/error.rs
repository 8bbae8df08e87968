use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading inputs or writing result tables.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("npz error: {0}")]
    Npz(#[from] ndarray_npy::ReadNpzError),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("array '{name}' has shape {shape:?}, expected (n_draws, n_subjects, latent_dim)")]
    BadShape { name: String, shape: Vec<usize> },

    #[error("{path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

pub type IoResult<T> = Result<T, IoError>;
