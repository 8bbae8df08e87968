pub mod ridge;
pub mod ridge_classifier;
pub mod isotonic;
pub mod calibration;

pub use ridge::*;
pub use ridge_classifier::*;
pub use isotonic::*;
pub use calibration::*;
