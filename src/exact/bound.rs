//! Admissible lower bound on the cost of completing a partial tour.
//!
//! The bound is the sum of three terms, each a lower bound on a disjoint
//! set of edges of any completion:
//!
//! 1. the cost already committed by the partial path;
//! 2. the cheapest edge from the last node to an unvisited node (or the
//!    closing edge back to the start when nothing is left);
//! 3. for every unvisited node, its cheapest outgoing edge to any other
//!    node. Ignoring that these edges must chain into one path keeps the
//!    bound O(N) per call after an O(N^2) precomputation.

use crate::error::{Result, TspError};
use crate::matrix::DistanceMatrix;

/// A path from the start node that has not been closed yet.
///
/// Each search frame owns its own copy; extending produces a new frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialTour {
    path: Vec<usize>,
    visited: Vec<bool>,
    cost: f64,
}

impl PartialTour {
    /// The root frame: only `start`, cost 0.
    ///
    /// # Panics
    ///
    /// Panics if `start >= node_count`. Use [`from_path`](Self::from_path)
    /// to validate indices against a matrix.
    pub fn new(start: usize, node_count: usize) -> Self {
        let mut visited = vec![false; node_count];
        visited[start] = true;
        let mut path = Vec::with_capacity(node_count);
        path.push(start);
        Self {
            path,
            visited,
            cost: 0.0,
        }
    }

    /// Builds a frame from an explicit path, summing its edge costs.
    pub fn from_path(matrix: &DistanceMatrix, path: &[usize]) -> Result<Self> {
        let first = *path
            .first()
            .ok_or_else(|| TspError::invalid_input("partial tour must contain the start node"))?;
        matrix.check_node(first)?;
        let mut frame = Self::new(first, matrix.node_count());
        for &node in &path[1..] {
            matrix.check_node(node)?;
            if frame.visited[node] {
                return Err(TspError::invalid_input(format!(
                    "partial tour visits '{}' twice",
                    matrix.name(node)
                )));
            }
            let edge = matrix.cost(frame.last(), node);
            frame = frame.extend(node, edge);
        }
        Ok(frame)
    }

    /// A child frame with `node` appended over an edge costing `edge_cost`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is out of range for the frame's node count.
    pub fn extend(&self, node: usize, edge_cost: f64) -> Self {
        let mut child = self.clone();
        child.path.push(node);
        child.visited[node] = true;
        child.cost += edge_cost;
        child
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Accumulated cost of the committed edges.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn start(&self) -> usize {
        self.path[0]
    }

    pub fn last(&self) -> usize {
        self.path[self.path.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn is_visited(&self, node: usize) -> bool {
        self.visited[node]
    }

    /// Whether every node has been visited.
    pub fn is_complete(&self) -> bool {
        self.path.len() == self.visited.len()
    }
}

/// Lower bound with each node's cheapest outgoing edge precomputed.
#[derive(Debug, Clone)]
pub struct LowerBound {
    cheapest_out: Vec<f64>,
}

impl LowerBound {
    pub fn new(matrix: &DistanceMatrix) -> Self {
        let n = matrix.node_count();
        let cheapest_out = (0..n)
            .map(|i| {
                matrix
                    .row(i)
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, &c)| c)
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        Self { cheapest_out }
    }

    /// Cheapest outgoing edge of `node`, `+inf` if it is isolated.
    pub fn cheapest_out(&self, node: usize) -> f64 {
        self.cheapest_out[node]
    }

    /// Lower bound on the closed-tour cost of any completion of `partial`.
    pub fn bound(&self, matrix: &DistanceMatrix, partial: &PartialTour) -> f64 {
        let n = matrix.node_count();
        let last = partial.last();

        let mut min_out = f64::INFINITY;
        let mut min_incoming = 0.0;
        let mut any_unvisited = false;
        for node in 0..n {
            if partial.is_visited(node) {
                continue;
            }
            any_unvisited = true;
            min_out = min_out.min(matrix.cost(last, node));
            min_incoming += self.cheapest_out[node];
        }

        if !any_unvisited {
            min_out = if n == 1 {
                0.0
            } else {
                matrix.cost(last, partial.start())
            };
        }

        partial.cost() + min_out + min_incoming
    }

    /// Returns [`TspError::BoundViolation`] if `bound` exceeds the cost of
    /// a completion it was supposed to underestimate.
    ///
    /// A violation means the bound is wrong, not that the instance is bad.
    pub fn verify_completion(bound: f64, completion_cost: f64) -> Result<()> {
        let slack = 1e-9 * completion_cost.abs().max(1.0);
        if bound <= completion_cost + slack || completion_cost.is_infinite() {
            Ok(())
        } else {
            Err(TspError::BoundViolation {
                bound,
                actual: completion_cost,
            })
        }
    }
}

/// One-shot lower bound for `path` with committed cost `accumulated`.
///
/// Same value as [`LowerBound::bound`] without the precomputation; O(N^2).
///
/// # Panics
///
/// Panics if any node in `path` is out of range for `matrix`.
pub fn lower_bound(matrix: &DistanceMatrix, path: &[usize], accumulated: f64) -> f64 {
    let n = matrix.node_count();
    let (Some(&start), Some(&last)) = (path.first(), path.last()) else {
        return accumulated;
    };
    let mut visited = vec![false; n];
    for &node in path {
        visited[node] = true;
    }

    let unvisited: Vec<usize> = (0..n).filter(|&i| !visited[i]).collect();

    let min_out = if unvisited.is_empty() {
        if n == 1 {
            0.0
        } else {
            matrix.cost(last, start)
        }
    } else {
        unvisited
            .iter()
            .map(|&u| matrix.cost(last, u))
            .fold(f64::INFINITY, f64::min)
    };

    let min_incoming: f64 = unvisited
        .iter()
        .map(|&u| {
            (0..n)
                .filter(|&j| j != u)
                .map(|j| matrix.cost(u, j))
                .fold(f64::INFINITY, f64::min)
        })
        .sum();

    accumulated + min_out + min_incoming
}
