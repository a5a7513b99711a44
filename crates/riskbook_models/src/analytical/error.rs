//! Error types for analytical and lattice pricing.
//!
//! This module provides:
//! - `AnalyticalError`: Errors specific to the pricing routines

use thiserror::Error;

/// Pricing routine errors.
///
/// # Examples
/// ```
/// use riskbook_models::analytical::AnalyticalError;
///
/// let err = AnalyticalError::InvalidVolatility { volatility: -0.2 };
/// assert!(format!("{}", err).contains("volatility"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Invalid volatility (non-positive).
    #[error("Invalid volatility: σ = {volatility}")]
    InvalidVolatility {
        /// The invalid volatility value
        volatility: f64,
    },

    /// Invalid spot price (non-positive).
    #[error("Invalid spot price: S = {spot}")]
    InvalidSpot {
        /// The invalid spot price value
        spot: f64,
    },

    /// Invalid strike (non-positive).
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// The invalid strike value
        strike: f64,
    },

    /// Lattice with no steps.
    #[error("Lattice needs at least {min} steps, got {steps}")]
    InvalidSteps {
        /// Requested step count
        steps: usize,
        /// Smallest usable step count
        min: usize,
    },

    /// Root finder did not reach its tolerance.
    #[error("Calibration did not converge after {iterations} iterations (residual {residual:e})")]
    NonConvergentCalibration {
        /// Iterations performed
        iterations: usize,
        /// Last absolute pricing error
        residual: f64,
    },

    /// Risk-neutral up probability outside [0, 1]; more steps shrink `h`.
    #[error(
        "Up probability {probability} outside [0, 1] with {steps} steps \
         (h = {step}, carry r - q = {carry}, σ = {volatility}); increase the step count"
    )]
    UnstableLattice {
        /// Computed up probability
        probability: f64,
        /// Lattice steps
        steps: usize,
        /// Step length in years
        step: f64,
        /// Cost of carry `r − q` after flooring the rate
        carry: f64,
        /// Volatility
        volatility: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {message}")]
    NumericalInstability {
        /// Description of the numerical issue
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_convergence_display() {
        let err = AnalyticalError::NonConvergentCalibration {
            iterations: 100,
            residual: 0.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("100 iterations"));
        assert!(msg.contains("5e-1"));
    }

    #[test]
    fn test_unstable_lattice_names_inputs() {
        let err = AnalyticalError::UnstableLattice {
            probability: 1.2,
            steps: 10,
            step: 0.5,
            carry: 0.3,
            volatility: 0.01,
        };
        let msg = err.to_string();
        assert!(msg.contains("10 steps"));
        assert!(msg.contains("h = 0.5"));
        assert!(msg.contains("r - q = 0.3"));
        assert!(msg.contains("σ = 0.01"));
    }

    #[test]
    fn test_steps_display() {
        let err = AnalyticalError::InvalidSteps { steps: 0, min: 2 };
        assert_eq!(err.to_string(), "Lattice needs at least 2 steps, got 0");
    }
}
