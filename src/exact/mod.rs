//! Exact solvers.
//!
//! Both solvers return the minimum-cost closed tour from a fixed start
//! node, or the not-found sentinel when no closed tour exists.
//!
//! # Key Types
//!
//! - [`BruteForceRunner`]: enumerates every permutation of the non-start
//!   nodes in lexicographic order; the reference oracle for small N
//! - [`BnbRunner`]: depth-first branch-and-bound pruned by [`LowerBound`],
//!   with optional limits, cancellation and a parallel root split
//! - [`SharedIncumbent`]: best-so-far tour shared across workers
//!
//! # References
//!
//! - Little et al. (1963), *An Algorithm for the Traveling Salesman Problem*
//! - Lawler & Wood (1966), *Branch-and-Bound Methods: A Survey*

mod bound;
mod brute_force;
mod config;
mod incumbent;
mod runner;
mod stats;

pub use bound::{lower_bound, LowerBound, PartialTour};
pub use brute_force::{BruteForceConfig, BruteForceResult, BruteForceRunner};
pub use config::BnbConfig;
pub use incumbent::SharedIncumbent;
pub use runner::{BnbResult, BnbRunner, SearchStatus, StopReason};
pub use stats::BnbStatistics;
