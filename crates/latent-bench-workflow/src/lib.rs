pub mod error;
pub mod config;
pub mod predictor;
pub mod report;
pub mod predict;

pub use error::*;
pub use config::*;
pub use predictor::*;
pub use report::*;
pub use predict::*;
