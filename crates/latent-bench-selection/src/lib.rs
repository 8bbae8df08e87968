pub mod kfold;
pub mod multilabel;
pub mod grid;
pub mod search;

pub use kfold::*;
pub use multilabel::*;
pub use grid::*;
pub use search::*;

/// Train and test row indices of one split.
pub type Split = (Vec<usize>, Vec<usize>);
