//! Utility types for trait definitions.
use std::time::Duration;

/// Errors raised while configuring or evaluating a fast Gauss transform.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FgtError {
    /// Bad bandwidth, tolerance or point data, detected when the transform is built.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The grid boxes are too large relative to the bandwidth for the truncation order
    /// search to converge.
    #[error("Degenerate grid: radius ratio {ratio} does not admit a convergent truncation order")]
    DegenerateGridError {
        /// Half box side over bandwidth, maximised over all axes.
        ratio: f64,
    },

    /// Density estimates were requested before the transform was evaluated.
    #[error("Density estimates have not been computed, call `evaluate` first")]
    NotComputed,

    /// Failure to run some business logic
    #[error("Failed: {0}")]
    Failed(String),
}

/// Stages of the fast Gauss transform that can be timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorType {
    /// Grid geometry and truncation order selection.
    Grid,

    /// Binning of query and reference points into grid boxes.
    Assign,

    /// Far-field moments of reference boxes.
    P2M,

    /// Sweep over all box pairs within the interaction radius (P2P, P2L, M2P, M2L).
    Interactions,

    /// Evaluation of accumulated local expansions at query points.
    L2P,

    /// Division of raw sums by the kernel normalisation constant.
    Normalise,
}

/// Wall time spent in a single stage.
#[derive(Debug, Clone, Copy)]
pub struct OperatorTime {
    /// The stage being timed.
    pub operator: OperatorType,

    /// Elapsed time in microseconds.
    pub time: u64,
}

impl OperatorTime {
    /// Record an already measured duration.
    pub fn from_duration(operator: OperatorType, duration: Duration) -> Self {
        Self {
            operator,
            time: duration.as_micros() as u64,
        }
    }
}
