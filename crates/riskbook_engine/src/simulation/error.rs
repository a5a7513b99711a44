//! Simulation error types.

use riskbook_core::market::MarketDataError;
use riskbook_core::math::LinalgError;
use thiserror::Error;

use crate::scenarios::ScenarioError;

/// Errors raised while setting up or running a simulation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    /// Correlation or volatility inputs are missing or malformed.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// The covariance matrix could not be factored, even after repair.
    #[error(transparent)]
    Linalg(#[from] LinalgError),

    /// The draws could not be assembled into scenarios.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    /// Factor, volatility and correlation sizes disagree.
    #[error("Simulation inputs disagree: {factors} factors, {volatilities} volatilities, {correlation}x{correlation} correlation")]
    DimensionMismatch {
        /// Number of factor keys
        factors: usize,
        /// Number of volatilities
        volatilities: usize,
        /// Dimension of the correlation matrix
        correlation: usize,
    },

    /// Time steps must be positive and finite.
    #[error("Invalid simulation horizon: {0}")]
    InvalidHorizon(f64),
}
