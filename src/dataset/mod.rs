//! Dataset loading and train/test splitting
//!
//! Every experiment in this crate starts here: parse the vehicle CSV into a
//! DataFrame, then shuffle and split it into numeric feature/label matrices.

mod loader;
mod split;

pub use loader::{DatasetLoader, FileInfo};
pub use split::{SplitData, Splitter, DEFAULT_SEED_PHRASE};
