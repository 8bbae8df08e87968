pub mod decomposition;
pub mod solve;
pub mod svd;
pub mod iterative;

pub use decomposition::*;
pub use solve::*;
pub use svd::*;
pub use iterative::*;
