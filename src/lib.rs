//! Symmetric Traveling Salesperson solvers for small dense instances.
//!
//! Three solvers share one problem representation and produce a closed
//! tour from a fixed start node:
//!
//! - **Brute force**: enumerates every permutation of the non-start
//!   nodes; the ground truth for N up to about 10.
//! - **Branch-and-bound**: depth-first search pruned by an admissible
//!   lower bound; exact, with optional time/node limits and a parallel
//!   root split.
//! - **Ant Colony Optimization (ACO)**: pheromone-guided stochastic tour
//!   construction; fast, seedable, no optimality guarantee.
//!
//! # Architecture
//!
//! A [`DistanceMatrix`] is built once (from rows, a nested name mapping,
//! or a cached CSV table) and only read afterwards. Missing edges are
//! `+inf`, so an infeasible tour simply costs `+inf` and the solvers
//! return the "no solution" sentinel instead of failing. Costs are
//! kilometres throughout.
//!
//! # Usage
//!
//! ```
//! use std::collections::BTreeMap;
//! use u_tsp::exact::{BnbConfig, BnbRunner, BruteForceRunner};
//! use u_tsp::matrix::{DistanceMatrix, MatrixOptions};
//!
//! let mut nested: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
//! for (a, b, d) in [("A", "B", 2.0), ("A", "C", 2.0), ("A", "D", 5.0),
//!                   ("B", "C", 3.0), ("B", "D", 4.0), ("C", "D", 1.0)] {
//!     nested.entry(a.into()).or_default().insert(b.into(), d);
//! }
//! let matrix = DistanceMatrix::from_nested(&nested, MatrixOptions::default()).unwrap();
//!
//! let exact = BnbRunner::run(&matrix, 0, &BnbConfig::default()).unwrap();
//! let oracle = BruteForceRunner::run(&matrix, 0).unwrap();
//! assert_eq!(exact.best_cost, oracle.best_cost);
//! ```

pub mod aco;
pub mod error;
pub mod exact;
pub mod matrix;
pub mod tour;

pub use error::{Result, TspError};
pub use matrix::DistanceMatrix;
pub use tour::{evaluate, Solution, Tour};
