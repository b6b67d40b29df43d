//! Sparse linear algebra used by the centrality measures.

pub mod solve;
pub mod sparse;

pub use solve::{SolveFailure, bicgstab, lu_solve};
pub use sparse::SparseMatrix;
