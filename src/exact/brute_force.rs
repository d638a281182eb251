//! Exhaustive enumeration, the ground truth for small instances.

use crate::error::Result;
use crate::matrix::DistanceMatrix;
use crate::tour::{evaluate, Solution, Tour};

/// Configuration for [`BruteForceRunner`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BruteForceConfig {
    /// Skip the mirror image of each permutation on a symmetric matrix.
    ///
    /// The skipped permutation is always the lexicographically larger of
    /// the pair, so the returned tour is the same as without pruning.
    /// Ignored when the matrix is not symmetric.
    pub prune_reflections: bool,
}

impl BruteForceConfig {
    pub fn with_prune_reflections(mut self, prune: bool) -> Self {
        self.prune_reflections = prune;
        self
    }
}

/// Result of a brute-force run.
#[derive(Debug, Clone)]
pub struct BruteForceResult {
    /// First optimal tour in lexicographic permutation order, `None` if
    /// every tour uses a missing edge.
    pub best: Option<Tour>,

    /// Cost of `best`, `+inf` if none.
    pub best_cost: f64,

    /// Number of closed tours evaluated.
    pub permutations_evaluated: u64,
}

impl BruteForceResult {
    pub fn is_found(&self) -> bool {
        self.best.is_some()
    }
}

impl From<BruteForceResult> for Solution {
    fn from(result: BruteForceResult) -> Self {
        Solution {
            tour: result.best,
            cost: result.best_cost,
        }
    }
}

/// Enumerates every permutation of the non-start nodes.
///
/// Fixing the start node removes rotations; reflections are evaluated
/// unless [`BruteForceConfig::prune_reflections`] is set. Θ((N-1)!) time,
/// meant as an oracle for N up to about 10.
pub struct BruteForceRunner;

impl BruteForceRunner {
    /// Runs with the default configuration.
    pub fn run(matrix: &DistanceMatrix, start: usize) -> Result<BruteForceResult> {
        Self::run_with_config(matrix, start, &BruteForceConfig::default())
    }

    pub fn run_with_config(
        matrix: &DistanceMatrix,
        start: usize,
        config: &BruteForceConfig,
    ) -> Result<BruteForceResult> {
        matrix.check_node(start)?;

        let n = matrix.node_count();
        let prune = config.prune_reflections && matrix.is_symmetric();
        if config.prune_reflections && !prune {
            log::debug!("brute_force: reflection pruning ignored on asymmetric matrix");
        }

        // Ascending order is the lexicographically first permutation.
        let mut rest: Vec<usize> = (0..n).filter(|&i| i != start).collect();
        let mut path = Vec::with_capacity(n);
        let mut best = Solution::none();
        let mut evaluated = 0u64;

        loop {
            let mirrored = prune && rest.len() > 1 && rest[0] > rest[rest.len() - 1];
            if !mirrored {
                path.clear();
                path.push(start);
                path.extend_from_slice(&rest);
                let cost = evaluate(matrix, &path, true);
                evaluated += 1;
                best.offer(&path, cost);
            }
            if !next_permutation(&mut rest) {
                break;
            }
        }

        log::info!(
            "brute_force: done n={n} start={} evaluated={evaluated} best={}",
            matrix.name(start),
            best.cost
        );

        Ok(BruteForceResult {
            best: best.tour,
            best_cost: best.cost,
            permutations_evaluated: evaluated,
        })
    }
}

/// Rearranges `v` into the next permutation in lexicographic order.
/// Returns `false` (leaving `v` untouched) when `v` is the last one.
fn next_permutation(v: &mut [usize]) -> bool {
    if v.len() < 2 {
        return false;
    }
    let mut i = v.len() - 1;
    while i > 0 && v[i - 1] >= v[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = v.len() - 1;
    while v[j] <= v[i - 1] {
        j -= 1;
    }
    v.swap(i - 1, j);
    v[i..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::MatrixOptions;
    use crate::TspError;

    fn square() -> DistanceMatrix {
        DistanceMatrix::from_rows(
            &["A", "B", "C", "D"],
            &[
                vec![0.0, 2.0, 2.0, 5.0],
                vec![2.0, 0.0, 3.0, 4.0],
                vec![2.0, 3.0, 0.0, 1.0],
                vec![5.0, 4.0, 1.0, 0.0],
            ],
            MatrixOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_next_permutation_order() {
        let mut v = vec![1, 2, 3];
        let mut seen = vec![v.clone()];
        while next_permutation(&mut v) {
            seen.push(v.clone());
        }
        assert_eq!(
            seen,
            vec![
                vec![1, 2, 3],
                vec![1, 3, 2],
                vec![2, 1, 3],
                vec![2, 3, 1],
                vec![3, 1, 2],
                vec![3, 2, 1],
            ]
        );
        assert_eq!(v, vec![3, 2, 1]);
    }

    #[test]
    fn test_square_optimum_and_tie_break() {
        let m = square();
        let result = BruteForceRunner::run(&m, 0).unwrap();

        assert_eq!(result.best_cost, 9.0);
        assert_eq!(result.permutations_evaluated, 6);
        // A,B,D,C precedes its mirror A,C,D,B in permutation order.
        assert_eq!(result.best.unwrap().nodes(), &[0, 1, 3, 2]);
    }

    #[test]
    fn test_prune_reflections_keeps_tie_break() {
        let m = square();
        let config = BruteForceConfig::default().with_prune_reflections(true);
        let result = BruteForceRunner::run_with_config(&m, 0, &config).unwrap();

        assert_eq!(result.best_cost, 9.0);
        assert_eq!(result.permutations_evaluated, 3);
        assert_eq!(result.best.unwrap().nodes(), &[0, 1, 3, 2]);
    }

    #[test]
    fn test_other_start_node() {
        let m = square();
        let result = BruteForceRunner::run(&m, 2).unwrap();
        assert_eq!(result.best_cost, 9.0);
        assert_eq!(result.best.unwrap().start(), Some(2));
    }

    #[test]
    fn test_avoids_missing_edge() {
        // Without A-C the only finite tours use A-B and A-D.
        let m = DistanceMatrix::from_rows(
            &["A", "B", "C", "D"],
            &[
                vec![0.0, 2.0, f64::INFINITY, 5.0],
                vec![2.0, 0.0, 3.0, 4.0],
                vec![f64::INFINITY, 3.0, 0.0, 1.0],
                vec![5.0, 4.0, 1.0, 0.0],
            ],
            MatrixOptions::default(),
        )
        .unwrap();
        let result = BruteForceRunner::run(&m, 0).unwrap();

        assert_eq!(result.best_cost, 11.0);
        assert_eq!(result.best.unwrap().nodes(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_infeasible_sentinel() {
        // D only connects to C: no Hamiltonian cycle.
        let m = DistanceMatrix::from_rows(
            &["A", "B", "C", "D"],
            &[
                vec![0.0, 1.0, 1.0, f64::INFINITY],
                vec![1.0, 0.0, 1.0, f64::INFINITY],
                vec![1.0, 1.0, 0.0, 1.0],
                vec![f64::INFINITY, f64::INFINITY, 1.0, 0.0],
            ],
            MatrixOptions::default(),
        )
        .unwrap();
        let result = BruteForceRunner::run(&m, 0).unwrap();

        assert!(!result.is_found());
        assert!(result.best_cost.is_infinite());
        let solution: Solution = result.into();
        assert!(matches!(
            solution.into_found(&m, 0),
            Err(TspError::Infeasible { .. })
        ));
    }

    #[test]
    fn test_degenerate_sizes() {
        let one = DistanceMatrix::from_rows(&["A"], &[vec![0.0]], MatrixOptions::default()).unwrap();
        let result = BruteForceRunner::run(&one, 0).unwrap();
        assert_eq!(result.best_cost, 0.0);
        assert_eq!(result.best.unwrap().nodes(), &[0]);

        let two = DistanceMatrix::from_rows(
            &["A", "B"],
            &[vec![0.0, 7.0], vec![7.0, 0.0]],
            MatrixOptions::default(),
        )
        .unwrap();
        let result = BruteForceRunner::run(&two, 1).unwrap();
        assert_eq!(result.best_cost, 14.0);
        assert_eq!(result.best.unwrap().nodes(), &[1, 0]);
    }

    #[test]
    fn test_bad_start() {
        let m = square();
        assert!(matches!(
            BruteForceRunner::run(&m, 4),
            Err(TspError::NodeOutOfRange { index: 4, count: 4 })
        ));
    }
}
