//! Risk measure error types.

use riskbook_core::market::MarketDataError;
use riskbook_core::math::LinalgError;
use thiserror::Error;

use crate::portfolio::PortfolioError;
use crate::scenarios::ScenarioError;

/// Errors raised while computing risk measures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RiskError {
    /// Revaluation of the portfolio failed.
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    /// A scenario could not be applied.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    /// Credit inputs are missing or malformed.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// A covariance matrix could not be built.
    #[error(transparent)]
    Linalg(#[from] LinalgError),

    /// A quantile of no observations was requested.
    #[error("P&L distribution is empty")]
    EmptyDistribution,

    /// The tail probability is outside `[0, 1]`.
    #[error("Invalid alpha: {0} (expected a value in [0, 1])")]
    InvalidAlpha(f64),

    /// The distribution holds a NaN or infinite P&L.
    #[error("P&L distribution has a non-finite value at index {0}")]
    NonFinite(usize),

    /// Bucket distributions do not all have the same number of scenarios.
    #[error("Bucket '{bucket}' has {got} scenarios, expected {expected}")]
    BucketLength {
        /// Offending bucket
        bucket: String,
        /// Length of the first bucket
        expected: usize,
        /// Length of this bucket
        got: usize,
    },

    /// Marginal VaR needs at least two scenarios for a covariance.
    #[error("Marginal VaR needs at least 2 scenarios, got {0}")]
    TooFewScenarios(usize),

    /// The weighted portfolio variance `wᵀQw` is zero.
    #[error("Portfolio P&L variance is zero for the given weights")]
    ZeroVariance,

    /// Horizons must be positive.
    #[error("Invalid horizon: {0} days")]
    InvalidHorizon(f64),

    /// Equicorrelation outside `[0, 1]`.
    #[error("Invalid asset correlation: {0} (expected a value in [0, 1])")]
    InvalidCorrelation(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_bucket_length() {
        let err = RiskError::BucketLength {
            bucket: "equity".to_string(),
            expected: 100,
            got: 99,
        };
        assert_eq!(format!("{}", err), "Bucket 'equity' has 99 scenarios, expected 100");
    }

    #[test]
    fn test_error_display_invalid_alpha() {
        assert_eq!(
            format!("{}", RiskError::InvalidAlpha(1.5)),
            "Invalid alpha: 1.5 (expected a value in [0, 1])"
        );
    }
}
