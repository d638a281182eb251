//! Tours, tour evaluation, and the best-so-far record every solver keeps.
//!
//! Infeasibility is a cost, not an error: [`evaluate`] returns `+inf` as
//! soon as a required edge is missing, so solvers compare candidates
//! uniformly without branching on feasibility.

use crate::error::{Result, TspError};
use crate::matrix::DistanceMatrix;

/// Sums `cost(path[i], path[i + 1])`, plus the return edge when
/// `close_loop` is set.
///
/// Returns `+inf` the moment any required edge is missing. Paths with
/// fewer than two nodes cost `0`.
///
/// # Examples
///
/// ```
/// use u_tsp::matrix::{DistanceMatrix, MatrixOptions};
/// use u_tsp::tour::evaluate;
///
/// let m = DistanceMatrix::from_rows(
///     &["A", "B", "C"],
///     &[vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 3.0], vec![2.0, 3.0, 0.0]],
///     MatrixOptions::default(),
/// )
/// .unwrap();
///
/// assert_eq!(evaluate(&m, &[0, 1, 2], false), 4.0);
/// assert_eq!(evaluate(&m, &[0, 1, 2], true), 6.0);
/// ```
pub fn evaluate(matrix: &DistanceMatrix, path: &[usize], close_loop: bool) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for w in path.windows(2) {
        let cost = matrix.cost(w[0], w[1]);
        if !cost.is_finite() {
            return f64::INFINITY;
        }
        total += cost;
    }

    if close_loop {
        let cost = matrix.cost(path[path.len() - 1], path[0]);
        if !cost.is_finite() {
            return f64::INFINITY;
        }
        total += cost;
    }

    total
}

/// An ordering of every node, implicitly closed back to its first node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tour {
    nodes: Vec<usize>,
}

impl Tour {
    pub fn new(nodes: Vec<usize>) -> Self {
        Self { nodes }
    }

    /// Visiting order, without the closing return to the start.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn start(&self) -> Option<usize> {
        self.nodes.first().copied()
    }

    /// Closed-loop cost of this tour.
    pub fn cost(&self, matrix: &DistanceMatrix) -> f64 {
        evaluate(matrix, &self.nodes, true)
    }

    /// Visiting order followed by the start node again.
    pub fn closed(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().copied().chain(self.nodes.first().copied())
    }

    /// Names along the closed tour: start, intermediate nodes, start.
    pub fn names<'a>(&self, matrix: &'a DistanceMatrix) -> Vec<&'a str> {
        self.closed().map(|i| matrix.name(i)).collect()
    }

    /// The same cycle started from `start`, or `None` if `start` is not on it.
    pub fn rotated_to(&self, start: usize) -> Option<Tour> {
        let pos = self.nodes.iter().position(|&n| n == start)?;
        let mut nodes = self.nodes[pos..].to_vec();
        nodes.extend_from_slice(&self.nodes[..pos]);
        Some(Tour { nodes })
    }

    /// The mirror cycle from the same start node.
    pub fn reversed(&self) -> Tour {
        let mut nodes = self.nodes.clone();
        if nodes.len() > 1 {
            nodes[1..].reverse();
        }
        Tour { nodes }
    }

    /// Checks that the tour visits every node of `matrix` exactly once.
    pub fn validate(&self, matrix: &DistanceMatrix) -> Result<()> {
        let n = matrix.node_count();
        if self.nodes.len() != n {
            return Err(TspError::invalid_input(format!(
                "tour has {} nodes, expected {n}",
                self.nodes.len()
            )));
        }
        let mut seen = vec![false; n];
        for &node in &self.nodes {
            matrix.check_node(node)?;
            if seen[node] {
                return Err(TspError::invalid_input(format!(
                    "tour visits '{}' twice",
                    matrix.name(node)
                )));
            }
            seen[node] = true;
        }
        Ok(())
    }
}

/// Best (tour, cost) seen so far by one solver run.
///
/// Starts as the "no solution" sentinel (`tour = None`, `cost = +inf`) and
/// only ever moves to strictly cheaper tours, so the first of several
/// equal-cost tours offered wins.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// The best tour, `None` if no finite tour was found.
    pub tour: Option<Tour>,

    /// Cost of `tour`, `+inf` if none.
    pub cost: f64,
}

impl Default for Solution {
    fn default() -> Self {
        Self::none()
    }
}

impl Solution {
    /// The "no solution" sentinel.
    pub fn none() -> Self {
        Self {
            tour: None,
            cost: f64::INFINITY,
        }
    }

    /// Whether a finite tour was recorded.
    pub fn is_found(&self) -> bool {
        self.tour.is_some() && self.cost.is_finite()
    }

    /// Records `nodes` if `cost` is strictly below the current best.
    pub fn offer(&mut self, nodes: &[usize], cost: f64) -> bool {
        if cost < self.cost {
            self.cost = cost;
            match self.tour {
                Some(ref mut tour) => {
                    tour.nodes.clear();
                    tour.nodes.extend_from_slice(nodes);
                }
                None => self.tour = Some(Tour::new(nodes.to_vec())),
            }
            true
        } else {
            false
        }
    }

    /// Closed route as owned names, `None` for the sentinel.
    pub fn route(&self, matrix: &DistanceMatrix) -> Option<Vec<String>> {
        self.tour
            .as_ref()
            .map(|t| t.names(matrix).into_iter().map(str::to_string).collect())
    }

    /// Converts the sentinel into [`TspError::Infeasible`].
    pub fn into_found(self, matrix: &DistanceMatrix, start: usize) -> Result<(Tour, f64)> {
        match self.tour {
            Some(tour) if self.cost.is_finite() => Ok((tour, self.cost)),
            _ => Err(TspError::Infeasible {
                start: matrix.name(start).to_string(),
            }),
        }
    }
}
