pub mod error;
pub mod palette;
pub mod bar;
pub mod mat;
pub mod curve;
pub mod figure;

pub use error::*;
pub use palette::*;
pub use bar::*;
pub use mat::*;
pub use curve::*;
pub use figure::*;
