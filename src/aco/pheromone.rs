//! Pheromone trail levels.

/// Dense `N x N` table of pheromone levels.
///
/// Levels start uniform, decay multiplicatively on [`evaporate`] and grow
/// on [`deposit_tour`], which reinforces both directions of every edge.
///
/// [`evaporate`]: PheromoneMatrix::evaporate
/// [`deposit_tour`]: PheromoneMatrix::deposit_tour
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    n: usize,
    levels: Vec<f64>,
}

impl PheromoneMatrix {
    /// Every entry set to `initial`.
    pub fn new(node_count: usize, initial: f64) -> Self {
        Self {
            n: node_count,
            levels: vec![initial; node_count * node_count],
        }
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.levels[from * self.n + to]
    }

    /// Multiplies every entry by `1 - rate`.
    pub fn evaporate(&mut self, rate: f64) {
        let keep = 1.0 - rate;
        for level in &mut self.levels {
            *level *= keep;
        }
    }

    /// Adds `amount` to both directions of every edge of the closed tour.
    pub fn deposit_tour(&mut self, nodes: &[usize], amount: f64) {
        if nodes.len() < 2 {
            return;
        }
        let closing = (nodes[nodes.len() - 1], nodes[0]);
        for (i, j) in nodes.windows(2).map(|w| (w[0], w[1])).chain(Some(closing)) {
            self.levels[i * self.n + j] += amount;
            self.levels[j * self.n + i] += amount;
        }
    }

    /// Sum of all levels.
    pub fn total(&self) -> f64 {
        self.levels.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_start() {
        let p = PheromoneMatrix::new(3, 0.5);
        assert_eq!(p.node_count(), 3);
        assert!((p.get(0, 2) - 0.5).abs() < 1e-10);
        assert!((p.total() - 4.5).abs() < 1e-10);
    }

    #[test]
    fn test_evaporate() {
        let mut p = PheromoneMatrix::new(2, 1.0);
        p.evaporate(0.25);
        assert!((p.get(0, 1) - 0.75).abs() < 1e-10);
        p.evaporate(0.0);
        assert!((p.get(1, 0) - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_deposit_is_symmetric_and_closes_loop() {
        let mut p = PheromoneMatrix::new(4, 0.0);
        p.deposit_tour(&[0, 2, 3, 1], 0.5);

        for (i, j) in [(0, 2), (2, 3), (3, 1), (1, 0)] {
            assert!((p.get(i, j) - 0.5).abs() < 1e-10, "edge {i}->{j}");
            assert!((p.get(j, i) - 0.5).abs() < 1e-10, "edge {j}->{i}");
        }
        assert_eq!(p.get(0, 3), 0.0);
        assert_eq!(p.get(2, 1), 0.0);
    }

    #[test]
    fn test_deposit_ignores_single_node() {
        let mut p = PheromoneMatrix::new(1, 1.0);
        p.deposit_tour(&[0], 10.0);
        assert!((p.get(0, 0) - 1.0).abs() < 1e-10);
    }
}
