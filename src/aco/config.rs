//! ACO configuration.

use crate::error::{Result, TspError};

/// Configuration for the Ant Colony Optimizer.
///
/// The five colony parameters have no defaults and must be given to
/// [`AcoConfig::new`]. The remaining fields have builder methods.
///
/// # Examples
///
/// ```
/// use u_tsp::aco::AcoConfig;
///
/// let config = AcoConfig::new(10, 100, 0.1, 1.0, 2.0)
///     .with_deposit_constant(100.0)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcoConfig {
    /// Tours constructed per iteration.
    pub ant_count: usize,

    /// Number of iterations. There is no convergence-based stop.
    pub iteration_count: usize,

    /// Fraction of pheromone removed each iteration, in `[0, 1)`.
    pub evaporation_rate: f64,

    /// Pheromone exponent.
    pub alpha: f64,

    /// Exponent of the inverse-distance heuristic.
    pub beta: f64,

    /// Deposit numerator `Q`: each tour adds `Q / cost` to its edges.
    pub deposit_constant: f64,

    /// Uniform starting pheromone level.
    pub initial_pheromone: f64,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,

    /// Construct the ants of one iteration in parallel with rayon.
    ///
    /// Needs the `parallel` feature; ignored otherwise. Each ant gets its
    /// own seed drawn from the run RNG, so results do not depend on it.
    pub parallel: bool,
}

impl AcoConfig {
    pub fn new(
        ant_count: usize,
        iteration_count: usize,
        evaporation_rate: f64,
        alpha: f64,
        beta: f64,
    ) -> Self {
        Self {
            ant_count,
            iteration_count,
            evaporation_rate,
            alpha,
            beta,
            deposit_constant: 1.0,
            initial_pheromone: 1.0,
            seed: None,
            parallel: false,
        }
    }

    /// 10 ants, 100 iterations, evaporation 0.1, alpha 1, beta 2.
    ///
    /// The colony used for the six-county Kenya route.
    pub fn reference() -> Self {
        Self::new(10, 100, 0.1, 1.0, 2.0)
    }

    pub fn with_deposit_constant(mut self, q: f64) -> Self {
        self.deposit_constant = q;
        self
    }

    pub fn with_initial_pheromone(mut self, tau0: f64) -> Self {
        self.initial_pheromone = tau0;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.ant_count == 0 {
            return Err(TspError::invalid_config("ant_count must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.evaporation_rate) {
            return Err(TspError::invalid_config(format!(
                "evaporation_rate must be in [0, 1), got {}",
                self.evaporation_rate
            )));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(TspError::invalid_config(format!(
                "alpha must be finite and non-negative, got {}",
                self.alpha
            )));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(TspError::invalid_config(format!(
                "beta must be finite and non-negative, got {}",
                self.beta
            )));
        }
        if !self.deposit_constant.is_finite() || self.deposit_constant <= 0.0 {
            return Err(TspError::invalid_config(format!(
                "deposit_constant must be positive, got {}",
                self.deposit_constant
            )));
        }
        if !self.initial_pheromone.is_finite() || self.initial_pheromone <= 0.0 {
            return Err(TspError::invalid_config(format!(
                "initial_pheromone must be positive, got {}",
                self.initial_pheromone
            )));
        }
        Ok(())
    }
}
