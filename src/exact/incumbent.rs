//! Best-so-far tour shared by branch-and-bound workers.
//!
//! The cost upper bound lives in an `AtomicU64` (the bits of an `f64`) so
//! pruning checks never lock. The tour itself sits behind a `Mutex` and is
//! the source of truth: installation re-checks the cost under the lock, so
//! two workers can never both believe they hold the best tour. A stale
//! atomic read can only be higher than the true best, which weakens
//! pruning but never discards a better tour.

use crate::tour::Solution;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
pub struct SharedIncumbent {
    upper_bound: AtomicU64,
    best: Mutex<Solution>,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedIncumbent {
    /// No tour installed; the upper bound is `+inf`.
    pub fn new() -> Self {
        Self {
            upper_bound: AtomicU64::new(f64::INFINITY.to_bits()),
            best: Mutex::new(Solution::none()),
        }
    }

    /// Cost of the best installed tour, `+inf` if none. Lock-free.
    #[inline]
    pub fn upper_bound(&self) -> f64 {
        f64::from_bits(self.upper_bound.load(Ordering::Relaxed))
    }

    /// Installs `path` if `cost` is strictly below the current best.
    pub fn try_install(&self, path: &[usize], cost: f64) -> bool {
        if cost >= self.upper_bound() {
            return false;
        }
        let mut best = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        if best.offer(path, cost) {
            self.upper_bound.store(cost.to_bits(), Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// A copy of the current best.
    pub fn snapshot(&self) -> Solution {
        self.best
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn into_solution(self) -> Solution {
        self.best.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_starts_empty() {
        let inc = SharedIncumbent::new();
        assert!(inc.upper_bound().is_infinite());
        assert!(!inc.snapshot().is_found());
        assert!(!inc.try_install(&[0, 1], f64::INFINITY));
    }

    #[test]
    fn test_installs_only_strict_improvements() {
        let inc = SharedIncumbent::new();
        assert!(inc.try_install(&[0, 1, 2], 12.0));
        assert!(!inc.try_install(&[0, 2, 1], 12.0));
        assert!(!inc.try_install(&[0, 2, 1], 15.0));
        assert!(inc.try_install(&[0, 2, 1], 10.0));

        assert_eq!(inc.upper_bound(), 10.0);
        let best = inc.into_solution();
        assert_eq!(best.cost, 10.0);
        assert_eq!(best.tour.unwrap().nodes(), &[0, 2, 1]);
    }

    #[test]
    fn test_concurrent_installs_keep_minimum() {
        let inc = Arc::new(SharedIncumbent::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let inc = Arc::clone(&inc);
                std::thread::spawn(move || {
                    for k in 0..200 {
                        let cost = 1000.0 - (t * 200 + k) as f64 * 0.5;
                        inc.try_install(&[t, k], cost);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let snapshot = inc.snapshot();
        assert_eq!(inc.upper_bound(), snapshot.cost);
        assert_eq!(snapshot.cost, 1000.0 - 1599.0 * 0.5);
        assert_eq!(snapshot.tour.unwrap().nodes(), &[7, 199]);
    }
}
