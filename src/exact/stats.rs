//! Branch-and-bound search statistics.

use std::time::Duration;

/// Counters collected during a branch-and-bound run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbStatistics {
    /// Search nodes (partial tours) visited.
    pub nodes_explored: u64,
    /// Subtrees discarded because their lower bound reached the incumbent.
    pub prunings_bound: u64,
    /// Children skipped because their accumulated cost reached the incumbent.
    pub prunings_cost: u64,
    /// Complete paths whose closing edge back to the start is missing.
    pub dead_ends: u64,
    /// Improving tours installed as the incumbent.
    pub solutions_found: u64,
    /// Longest partial tour reached.
    pub max_depth: u64,
    /// Lower bound at the root; the optimality gap is measured against it.
    pub root_lower_bound: f64,
    /// Wall-clock time of the whole run.
    pub time_total: Duration,
}

impl Default for BnbStatistics {
    fn default() -> Self {
        Self {
            nodes_explored: 0,
            prunings_bound: 0,
            prunings_cost: 0,
            dead_ends: 0,
            solutions_found: 0,
            max_depth: 0,
            root_lower_bound: 0.0,
            time_total: Duration::ZERO,
        }
    }
}

impl BnbStatistics {
    #[inline]
    pub fn on_node_explored(&mut self, depth: usize) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
        self.max_depth = self.max_depth.max(depth as u64);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_cost(&mut self) {
        self.prunings_cost = self.prunings_cost.saturating_add(1);
    }

    #[inline]
    pub fn on_dead_end(&mut self) {
        self.dead_ends = self.dead_ends.saturating_add(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    /// Adds the counters of a worker that explored a separate subtree.
    pub fn merge(&mut self, other: &BnbStatistics) {
        self.nodes_explored = self.nodes_explored.saturating_add(other.nodes_explored);
        self.prunings_bound = self.prunings_bound.saturating_add(other.prunings_bound);
        self.prunings_cost = self.prunings_cost.saturating_add(other.prunings_cost);
        self.dead_ends = self.dead_ends.saturating_add(other.dead_ends);
        self.solutions_found = self.solutions_found.saturating_add(other.solutions_found);
        self.max_depth = self.max_depth.max(other.max_depth);
    }

    /// Relative gap between `best_cost` and the root lower bound.
    pub fn root_gap(&self, best_cost: f64) -> Option<f64> {
        if best_cost.is_finite() && best_cost > 0.0 && self.root_lower_bound.is_finite() {
            Some((best_cost - self.root_lower_bound) / best_cost)
        } else {
            None
        }
    }
}

impl std::fmt::Display for BnbStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "nodes={} pruned_bound={} pruned_cost={} dead_ends={} solutions={} max_depth={} root_lb={} time={:.3}s",
            self.nodes_explored,
            self.prunings_bound,
            self.prunings_cost,
            self.dead_ends,
            self.solutions_found,
            self.max_depth,
            self.root_lower_bound,
            self.time_total.as_secs_f64()
        )
    }
}
