pub mod error;
pub mod estimator;
pub mod params;
pub mod target;
pub mod encoder;

pub use error::{BenchError, BenchResult};
pub use estimator::Estimator;
pub use params::{ParamSet, ParamValue};
pub use target::{Cell, TargetColumn, TargetKind};
pub use encoder::LabelEncoder;
