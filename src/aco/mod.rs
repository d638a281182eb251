//! Ant Colony Optimization.
//!
//! A population of ants builds tours from the start node, choosing each
//! next node with probability proportional to pheromone times inverse
//! distance. Short tours reinforce their edges, so later ants are drawn
//! towards them, while evaporation forgets stale trails. The result is a
//! best-effort tour with no optimality guarantee; use
//! [`exact`](crate::exact) when one is needed.
//!
//! # Key Types
//!
//! - [`AcoConfig`]: colony parameters (no defaults for the five core ones)
//! - [`AcoRunner`]: executes the iteration loop
//! - [`AcoResult`]: best tour, history and final pheromone levels
//! - [`PheromoneMatrix`]: trail levels owned by one run
//!
//! # References
//!
//! - Dorigo, Maniezzo & Colorni (1996), *Ant System: Optimization by a
//!   Colony of Cooperating Agents*
//! - Dorigo & Stützle (2004), *Ant Colony Optimization*

mod config;
mod pheromone;
mod runner;

pub use config::AcoConfig;
pub use pheromone::PheromoneMatrix;
pub use runner::{AcoResult, AcoRunner};
