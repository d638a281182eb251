//! Error types shared by the matrix loader and all solvers.
//!
//! Infeasibility is *not* an error on the solver path: runners return a
//! "no solution" [`Solution`](crate::tour::Solution) with infinite cost.
//! [`TspError::Infeasible`] only appears when a caller explicitly asks to
//! turn that sentinel into an error.

use thiserror::Error as ThisError;

/// Errors produced by `u-tsp`.
#[derive(Debug, ThisError)]
pub enum TspError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed delimited table, such as a row wider or narrower than its header.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[cfg(feature = "cli")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The requested edge has no entry in either direction.
    #[error("no edge between '{from}' and '{to}'")]
    MissingEdge { from: String, to: String },

    /// Both directions of an edge were given and disagree beyond tolerance.
    #[error("asymmetric edge '{from}' <-> '{to}': {forward} vs {backward}")]
    Asymmetry {
        from: String,
        to: String,
        forward: f64,
        backward: f64,
    },

    /// No closed tour through every node exists from `start`.
    #[error("no closed tour visits every node starting from '{start}'")]
    Infeasible { start: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A lower bound exceeded the true cost of one of its completions.
    #[error("lower bound {bound} exceeds completion cost {actual}")]
    BoundViolation { bound: f64, actual: f64 },

    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("node index {index} out of range for {count} nodes")]
    NodeOutOfRange { index: usize, count: usize },

    #[error("duplicate node name '{0}'")]
    DuplicateNode(String),

    #[error("invalid distance {value} for '{from}' -> '{to}'")]
    InvalidDistance { from: String, to: String, value: f64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, TspError>;

impl TspError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
