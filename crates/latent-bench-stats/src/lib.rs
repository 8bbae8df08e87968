pub mod special;
pub mod ttest;
pub mod pairwise;

pub use special::*;
pub use ttest::*;
pub use pairwise::*;
