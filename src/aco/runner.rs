//! ACO execution loop.

use super::config::AcoConfig;
use super::pheromone::PheromoneMatrix;
use crate::error::Result;
use crate::matrix::DistanceMatrix;
use crate::tour::{evaluate, Solution, Tour};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Distances below this are clamped before inverting.
const MIN_DISTANCE: f64 = 1e-10;

/// Result of an ACO run.
///
/// The best tour is a heuristic result with no optimality guarantee.
#[derive(Debug, Clone)]
pub struct AcoResult {
    /// Best tour across all iterations, `None` if no finite tour was built.
    pub best: Option<Tour>,

    /// Cost of `best`, `+inf` if none.
    pub best_cost: f64,

    /// Iterations completed.
    pub iterations: usize,

    /// Tours constructed and evaluated.
    pub evaluations: usize,

    /// Best cost after each completed iteration.
    pub cost_history: Vec<f64>,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Pheromone levels after the last iteration.
    pub pheromone: PheromoneMatrix,
}

impl AcoResult {
    pub fn is_found(&self) -> bool {
        self.best.is_some()
    }
}

impl From<AcoResult> for Solution {
    fn from(result: AcoResult) -> Self {
        Solution {
            tour: result.best,
            cost: result.best_cost,
        }
    }
}

/// Executes the Ant Colony Optimizer (Ant System variant).
///
/// Each iteration:
///
/// 1. every ant builds a tour from `start`, choosing the next unvisited
///    node with probability proportional to `tau^alpha * (1/d)^beta`;
/// 2. each tour is evaluated as a closed loop;
/// 3. all pheromone evaporates by `evaporation_rate`;
/// 4. each tour deposits `Q / cost` on both directions of its edges;
/// 5. the run's best is updated.
///
/// # Usage
///
/// ```
/// use u_tsp::aco::{AcoConfig, AcoRunner};
/// use u_tsp::matrix::{DistanceMatrix, MatrixOptions};
///
/// let matrix = DistanceMatrix::from_rows(
///     &["A", "B", "C", "D"],
///     &[
///         vec![0.0, 2.0, 2.0, 5.0],
///         vec![2.0, 0.0, 3.0, 4.0],
///         vec![2.0, 3.0, 0.0, 1.0],
///         vec![5.0, 4.0, 1.0, 0.0],
///     ],
///     MatrixOptions::default(),
/// )
/// .unwrap();
///
/// let config = AcoConfig::new(10, 50, 0.1, 1.0, 2.0).with_seed(42);
/// let result = AcoRunner::run(&matrix, 0, &config).unwrap();
/// assert!(result.best_cost >= 9.0);
/// ```
pub struct AcoRunner;

impl AcoRunner {
    /// Runs the colony from `start`.
    pub fn run(matrix: &DistanceMatrix, start: usize, config: &AcoConfig) -> Result<AcoResult> {
        Self::run_with_cancel(matrix, start, config, None)
    }

    /// Runs the colony with an optional cancellation token.
    ///
    /// The token is checked before each iteration; a cancelled run returns
    /// the best tour of the iterations already completed.
    pub fn run_with_cancel(
        matrix: &DistanceMatrix,
        start: usize,
        config: &AcoConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AcoResult> {
        config.validate()?;
        matrix.check_node(start)?;

        let n = matrix.node_count();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let mut pheromone = PheromoneMatrix::new(n, config.initial_pheromone);
        let mut best = Solution::none();
        let mut cost_history = Vec::with_capacity(config.iteration_count);
        let mut evaluations = 0usize;
        let mut iterations = 0usize;
        let mut cancelled = false;

        log::info!(
            "aco: start n={n} start={} ants={} iterations={} rho={} alpha={} beta={}",
            matrix.name(start),
            config.ant_count,
            config.iteration_count,
            config.evaporation_rate,
            config.alpha,
            config.beta
        );

        let colony = Colony {
            matrix,
            start,
            alpha: config.alpha,
            beta: config.beta,
        };

        for iteration in 0..config.iteration_count {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            // Seeds are drawn in ant order so the result does not depend on
            // how construction is scheduled.
            let seeds: Vec<u64> = (0..config.ant_count).map(|_| rng.random()).collect();
            let tours = colony.construct_all(&pheromone, &seeds, config.parallel);
            evaluations += tours.len();

            pheromone.evaporate(config.evaporation_rate);
            for (nodes, cost) in &tours {
                if cost.is_finite() && *cost > 0.0 {
                    pheromone.deposit_tour(nodes, config.deposit_constant / cost);
                }
            }

            let iteration_best = tours
                .iter()
                .map(|(_, cost)| *cost)
                .fold(f64::INFINITY, f64::min);
            for (nodes, cost) in &tours {
                best.offer(nodes, *cost);
            }

            iterations += 1;
            cost_history.push(best.cost);
            log::debug!("aco: iteration={iteration} iter_best={iteration_best} best={}", best.cost);
        }

        if cancelled {
            log::warn!("aco: cancelled after iterations={iterations}");
        }
        log::info!(
            "aco: done iterations={iterations} evaluations={evaluations} best={}",
            best.cost
        );

        Ok(AcoResult {
            best: best.tour,
            best_cost: best.cost,
            iterations,
            evaluations,
            cost_history,
            cancelled,
            pheromone,
        })
    }
}

/// Read-only inputs shared by the ants of one run.
struct Colony<'a> {
    matrix: &'a DistanceMatrix,
    start: usize,
    alpha: f64,
    beta: f64,
}

impl Colony<'_> {
    #[cfg(feature = "parallel")]
    fn construct_all(
        &self,
        pheromone: &PheromoneMatrix,
        seeds: &[u64],
        parallel: bool,
    ) -> Vec<(Vec<usize>, f64)> {
        use rayon::prelude::*;

        if parallel {
            seeds
                .par_iter()
                .map(|&seed| self.construct(pheromone, seed))
                .collect()
        } else {
            seeds
                .iter()
                .map(|&seed| self.construct(pheromone, seed))
                .collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn construct_all(
        &self,
        pheromone: &PheromoneMatrix,
        seeds: &[u64],
        _parallel: bool,
    ) -> Vec<(Vec<usize>, f64)> {
        seeds
            .iter()
            .map(|&seed| self.construct(pheromone, seed))
            .collect()
    }

    /// Builds one closed tour and its cost.
    fn construct(&self, pheromone: &PheromoneMatrix, seed: u64) -> (Vec<usize>, f64) {
        let n = self.matrix.node_count();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut visited = vec![false; n];
        let mut path = Vec::with_capacity(n);
        path.push(self.start);
        visited[self.start] = true;

        let mut candidates = Vec::with_capacity(n);
        let mut cumulative = Vec::with_capacity(n);
        while path.len() < n {
            let current = path[path.len() - 1];
            candidates.clear();
            candidates.extend((0..n).filter(|&j| !visited[j]));
            let next = self.select_next(pheromone, current, &candidates, &mut cumulative, &mut rng);
            path.push(next);
            visited[next] = true;
        }

        let cost = evaluate(self.matrix, &path, true);
        (path, cost)
    }

    /// Inversion sampling over `tau^alpha * eta^beta`; uniform over the
    /// candidates when every weight is zero or the sum is not finite.
    fn select_next(
        &self,
        pheromone: &PheromoneMatrix,
        current: usize,
        candidates: &[usize],
        cumulative: &mut Vec<f64>,
        rng: &mut StdRng,
    ) -> usize {
        cumulative.clear();
        let mut total = 0.0;
        for &j in candidates {
            total += self.weight(pheromone, current, j);
            cumulative.push(total);
        }

        if total <= 0.0 || !total.is_finite() {
            return candidates[rng.random_range(0..candidates.len())];
        }

        let r = rng.random::<f64>() * total;
        let mut idx = cumulative.partition_point(|&c| c <= r);
        if idx == candidates.len() {
            // r rounded up to `total`: the first index reaching it is the
            // last candidate with non-zero weight.
            idx = cumulative.partition_point(|&c| c < total);
        }
        candidates[idx]
    }

    #[inline]
    fn weight(&self, pheromone: &PheromoneMatrix, from: usize, to: usize) -> f64 {
        let distance = self.matrix.cost(from, to);
        if !distance.is_finite() {
            return 0.0;
        }
        let eta = 1.0 / distance.max(MIN_DISTANCE);
        pheromone.get(from, to).powf(self.alpha) * eta.powf(self.beta)
    }
}
