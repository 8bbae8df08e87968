pub mod regression;
pub mod classification;
pub mod scorer;

pub use regression::*;
pub use classification::*;
pub use scorer::*;
