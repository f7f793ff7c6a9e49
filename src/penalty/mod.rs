//! Sparse-group penalties.

mod sparse_group;

pub use sparse_group::SparseGroupBlock;
