//! Depth-first branch-and-bound.
//!
//! # Algorithm
//!
//! 1. Start from the partial tour `[start]` with cost 0 and an incumbent
//!    cost of `+inf`.
//! 2. At a complete path, close the loop (a missing closing edge fails the
//!    branch) and install the tour if it beats the incumbent.
//! 3. Otherwise compute the [`LowerBound`]; if it reaches the incumbent
//!    the whole subtree is discarded.
//! 4. Extend by every unvisited node reachable from the last node, in
//!    index order, skipping children whose accumulated cost already
//!    reaches the incumbent.
//!
//! Pruning is sound because the bound is admissible. Exhausting the tree
//! without an incumbent means no closed tour exists from `start`.

use super::bound::{LowerBound, PartialTour};
use super::config::BnbConfig;
use super::incumbent::SharedIncumbent;
use super::stats::BnbStatistics;
use crate::error::Result;
use crate::matrix::DistanceMatrix;
use crate::tour::{Solution, Tour};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Outcome of a branch-and-bound run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    /// The tree was exhausted; the tour is optimal.
    Optimal,
    /// The tree was exhausted without finding any closed tour.
    Infeasible,
    /// Stopped by a limit; a tour was found but may not be optimal.
    Feasible,
    /// Stopped by a limit before any tour was found.
    Unknown,
}

/// Why a run stopped before exhausting the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    TimeLimit,
    NodeLimit,
    Cancelled,
}

/// Result of a branch-and-bound run.
#[derive(Debug, Clone)]
pub struct BnbResult {
    /// The best tour found, `None` if no closed tour was found.
    pub best: Option<Tour>,

    /// Cost of `best`, `+inf` if none.
    pub best_cost: f64,

    pub status: SearchStatus,

    /// Set when a limit or cancellation ended the search early.
    pub stop_reason: Option<StopReason>,

    pub stats: BnbStatistics,
}

impl BnbResult {
    pub fn is_found(&self) -> bool {
        self.best.is_some()
    }

    /// Whether the returned cost is proven optimal.
    pub fn is_optimal(&self) -> bool {
        self.status == SearchStatus::Optimal
    }
}

impl From<BnbResult> for Solution {
    fn from(result: BnbResult) -> Self {
        Solution {
            tour: result.best,
            cost: result.best_cost,
        }
    }
}

/// Executes the exact branch-and-bound search.
///
/// # Usage
///
/// ```
/// use u_tsp::exact::{BnbConfig, BnbRunner, SearchStatus};
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
/// let result = BnbRunner::run(&matrix, 0, &BnbConfig::default()).unwrap();
/// assert_eq!(result.status, SearchStatus::Optimal);
/// assert_eq!(result.best_cost, 9.0);
/// ```
pub struct BnbRunner;

impl BnbRunner {
    /// Runs the search from `start`.
    pub fn run(matrix: &DistanceMatrix, start: usize, config: &BnbConfig) -> Result<BnbResult> {
        Self::run_with_cancel(matrix, start, config, None)
    }

    /// Runs the search with an optional cancellation token.
    ///
    /// If `cancel` is set to `true`, the search stops at the next check
    /// and returns the best tour found so far.
    pub fn run_with_cancel(
        matrix: &DistanceMatrix,
        start: usize,
        config: &BnbConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<BnbResult> {
        config.validate()?;
        matrix.check_node(start)?;

        let started = Instant::now();
        let n = matrix.node_count();
        let bound = LowerBound::new(matrix);
        let incumbent = SharedIncumbent::new();
        let control = SearchControl {
            deadline: config
                .time_limit_ms
                .map(|ms| started + Duration::from_millis(ms)),
            node_limit: config.node_limit,
            check_interval: config.check_interval,
            nodes: AtomicU64::new(0),
            reason: OnceLock::new(),
            cancel,
        };

        let root = PartialTour::new(start, n);
        let root_lower_bound = bound.bound(matrix, &root);

        log::info!(
            "bnb: start n={n} start={} root_lb={root_lower_bound} parallel={}",
            matrix.name(start),
            config.parallel
        );

        let search = Search {
            matrix,
            bound: &bound,
            incumbent: &incumbent,
            control: &control,
            start,
            root_lower_bound,
        };

        let mut stats = if config.parallel && n > 2 {
            explore_parallel(&search, root)
        } else {
            let mut stats = BnbStatistics::default();
            search.expand(root, &mut stats);
            stats
        };
        stats.root_lower_bound = root_lower_bound;
        stats.time_total = started.elapsed();

        let stop_reason = control.reason.get().copied();
        let best = incumbent.into_solution();
        let status = match (stop_reason, best.is_found()) {
            (None, true) => SearchStatus::Optimal,
            (None, false) => SearchStatus::Infeasible,
            (Some(_), true) => SearchStatus::Feasible,
            (Some(_), false) => SearchStatus::Unknown,
        };

        if let Some(reason) = stop_reason {
            log::warn!("bnb: stopped early reason={reason:?} best={}", best.cost);
        }
        log::info!("bnb: done status={status:?} best={} {stats}", best.cost);

        Ok(BnbResult {
            best: best.tour,
            best_cost: best.cost,
            status,
            stop_reason,
            stats,
        })
    }
}

/// Read-only state shared by every search worker.
struct Search<'a> {
    matrix: &'a DistanceMatrix,
    bound: &'a LowerBound,
    incumbent: &'a SharedIncumbent,
    control: &'a SearchControl,
    start: usize,
    root_lower_bound: f64,
}

impl Search<'_> {
    fn expand(&self, frame: PartialTour, stats: &mut BnbStatistics) {
        if self.control.should_stop() {
            return;
        }
        stats.on_node_explored(frame.len());

        if frame.is_complete() {
            self.close(&frame, stats);
            return;
        }

        if self.bound.bound(self.matrix, &frame) >= self.incumbent.upper_bound() {
            stats.on_pruning_bound();
            return;
        }

        let last = frame.last();
        for (node, &edge) in self.matrix.row(last).iter().enumerate() {
            if frame.is_visited(node) || !edge.is_finite() {
                continue;
            }
            if frame.cost() + edge < self.incumbent.upper_bound() {
                self.expand(frame.extend(node, edge), stats);
            } else {
                stats.on_pruning_cost();
            }
        }
    }

    fn close(&self, frame: &PartialTour, stats: &mut BnbStatistics) {
        let closing = if frame.len() == 1 {
            0.0
        } else {
            self.matrix.cost(frame.last(), self.start)
        };
        if !closing.is_finite() {
            stats.on_dead_end();
            return;
        }

        let total = frame.cost() + closing;
        debug_assert!(
            LowerBound::verify_completion(self.root_lower_bound, total).is_ok(),
            "root bound {} exceeds tour cost {total}",
            self.root_lower_bound
        );
        if self.incumbent.try_install(frame.path(), total) {
            stats.on_solution_found();
            log::debug!("bnb: incumbent cost={total} depth={}", frame.len());
        }
    }
}

/// Stop conditions shared across workers.
struct SearchControl {
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    check_interval: u64,
    nodes: AtomicU64,
    reason: OnceLock<StopReason>,
    cancel: Option<Arc<AtomicBool>>,
}

impl SearchControl {
    fn should_stop(&self) -> bool {
        if self.reason.get().is_some() {
            return true;
        }

        let count = self.nodes.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(limit) = self.node_limit {
            if count > limit {
                return self.stop(StopReason::NodeLimit);
            }
        }

        if count == 1 || count % self.check_interval == 0 {
            if let Some(ref flag) = self.cancel {
                if flag.load(Ordering::Relaxed) {
                    return self.stop(StopReason::Cancelled);
                }
            }
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return self.stop(StopReason::TimeLimit);
                }
            }
        }

        false
    }

    fn stop(&self, reason: StopReason) -> bool {
        // First writer wins; later reasons are dropped.
        let _ = self.reason.set(reason);
        true
    }
}

#[cfg(feature = "parallel")]
fn explore_parallel(search: &Search<'_>, root: PartialTour) -> BnbStatistics {
    use rayon::prelude::*;

    let mut stats = BnbStatistics::default();
    if search.control.should_stop() {
        return stats;
    }
    stats.on_node_explored(root.len());

    let last = root.last();
    let children: Vec<PartialTour> = search
        .matrix
        .row(last)
        .iter()
        .enumerate()
        .filter(|&(node, edge)| !root.is_visited(node) && edge.is_finite())
        .map(|(node, &edge)| root.extend(node, edge))
        .collect();

    log::debug!("bnb: exploring {} root subtrees in parallel", children.len());

    let worker_stats: Vec<BnbStatistics> = children
        .into_par_iter()
        .map(|child| {
            let mut local = BnbStatistics::default();
            search.expand(child, &mut local);
            local
        })
        .collect();

    for local in &worker_stats {
        stats.merge(local);
    }
    stats
}

#[cfg(not(feature = "parallel"))]
fn explore_parallel(search: &Search<'_>, root: PartialTour) -> BnbStatistics {
    log::debug!("bnb: parallel requested without the `parallel` feature; running sequentially");
    let mut stats = BnbStatistics::default();
    search.expand(root, &mut stats);
    stats
}
