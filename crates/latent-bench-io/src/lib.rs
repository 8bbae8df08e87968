pub mod error;
pub mod npz;
pub mod meta;
pub mod tsv;

pub use error::*;
pub use npz::*;
pub use meta::*;
pub use tsv::*;
