//! Branch-and-bound configuration.

use crate::error::{Result, TspError};

/// Configuration for [`BnbRunner`](super::BnbRunner).
///
/// The search is exact but worst-case factorial, so it accepts optional
/// wall-clock and node limits. A run stopped by a limit reports the best
/// tour found so far with status
/// [`SearchStatus::Feasible`](super::SearchStatus::Feasible).
///
/// # Examples
///
/// ```
/// use u_tsp::exact::BnbConfig;
///
/// let config = BnbConfig::default()
///     .with_time_limit_ms(5_000)
///     .with_node_limit(10_000_000)
///     .with_parallel(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbConfig {
    /// Optional wall-clock limit in milliseconds. `None` disables it.
    pub time_limit_ms: Option<u64>,

    /// Optional cap on the number of search nodes explored.
    pub node_limit: Option<u64>,

    /// Explore the subtrees below the root in parallel with rayon.
    ///
    /// Needs the `parallel` feature; ignored otherwise. Parallel runs find
    /// the same optimal cost, but among equal-cost tours the one returned
    /// may differ from a sequential run.
    pub parallel: bool,

    /// How many nodes pass between clock and cancellation checks.
    pub check_interval: u64,
}

impl Default for BnbConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: None,
            node_limit: None,
            parallel: false,
            check_interval: 1024,
        }
    }
}

impl BnbConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_check_interval(mut self, nodes: u64) -> Self {
        self.check_interval = nodes;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.check_interval == 0 {
            return Err(TspError::invalid_config("check_interval must be positive"));
        }
        Ok(())
    }
}
