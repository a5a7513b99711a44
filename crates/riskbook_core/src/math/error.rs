//! Error types for numerical routines.

use thiserror::Error;

/// Interpolator construction errors.
///
/// Evaluation never fails once an interpolator is built: targets outside the
/// data range are answered by flat extrapolation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    /// Not enough data points.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Points supplied
        got: usize,
        /// Points required
        need: usize,
    },

    /// Inconsistent or non-finite input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Linear algebra errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinalgError {
    /// Matrix is not positive definite (Cholesky pivot failed).
    #[error("Matrix is not positive definite: pivot {pivot} = {value}")]
    NotPositiveDefinite {
        /// Row of the failing pivot
        pivot: usize,
        /// Pivot value before the square root
        value: f64,
    },

    /// Dimensions do not agree.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        got: usize,
    },

    /// Eigen-decomposition did not converge.
    #[error("Eigen-decomposition did not converge after {sweeps} sweeps")]
    NoConvergence {
        /// Jacobi sweeps performed
        sweeps: usize,
    },
}
