//! Problem representation shared by every solver.
//!
//! A [`DistanceMatrix`] is built once, either from a full table of rows
//! (a routing-service response) or from a nested `from -> to -> km`
//! mapping, and is never mutated afterwards. Missing edges are `+inf`.
//!
//! # Key Types
//!
//! - [`DistanceMatrix`]: dense `N x N` costs plus the name <-> index table
//! - [`DistanceMatrixBuilder`]: incremental construction by name or index
//! - [`MatrixOptions`] / [`SymmetryPolicy`]: validation applied at build time
//!
//! # Submodules
//!
//! - [`table`]: labelled delimited table used to cache a matrix on disk

mod distance;
mod options;
pub mod table;

pub use distance::{DistanceMatrix, DistanceMatrixBuilder};
pub use options::{MatrixOptions, SymmetryPolicy};
