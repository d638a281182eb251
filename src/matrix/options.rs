//! Matrix construction options.

use crate::error::{Result, TspError};

/// How to reconcile the two directions of an edge when both are given.
///
/// Routing services report drive distances per direction, and one-way
/// streets make them differ slightly. The solvers in this crate target the
/// symmetric problem, so the policy has to be chosen explicitly rather
/// than silently picking one direction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SymmetryPolicy {
    /// Reject the matrix when `|cost(a,b) - cost(b,a)| > tolerance`.
    Strict {
        /// Absolute tolerance in kilometres.
        tolerance: f64,
    },

    /// Keep the shorter direction for both and log a warning.
    Shorter,

    /// Keep each direction as given. A direction that is absent still
    /// falls back to the reverse entry.
    Directed,
}

impl Default for SymmetryPolicy {
    fn default() -> Self {
        SymmetryPolicy::Strict { tolerance: 1e-9 }
    }
}

/// Options applied when a [`DistanceMatrix`](super::DistanceMatrix) is built.
///
/// # Examples
///
/// ```
/// use u_tsp::matrix::{MatrixOptions, SymmetryPolicy};
///
/// let options = MatrixOptions::default()
///     .with_symmetry(SymmetryPolicy::Shorter)
///     .with_require_complete(true);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixOptions {
    /// Symmetry reconciliation policy.
    pub symmetry: SymmetryPolicy,

    /// Fail construction with `MissingEdge` if any pair has no entry in
    /// either direction. When `false`, missing edges become `+inf`.
    pub require_complete: bool,
}

impl MatrixOptions {
    pub fn with_symmetry(mut self, symmetry: SymmetryPolicy) -> Self {
        self.symmetry = symmetry;
        self
    }

    pub fn with_require_complete(mut self, require: bool) -> Self {
        self.require_complete = require;
        self
    }

    /// Validates the options.
    pub fn validate(&self) -> Result<()> {
        if let SymmetryPolicy::Strict { tolerance } = self.symmetry {
            if !(tolerance >= 0.0 && tolerance.is_finite()) {
                return Err(TspError::invalid_config(format!(
                    "symmetry tolerance must be finite and non-negative, got {tolerance}"
                )));
            }
        }
        Ok(())
    }
}
