//! Portfolio error types.

use riskbook_core::market::MarketDataError;
use riskbook_models::instruments::PricingError;
use thiserror::Error;

/// Errors that can occur during portfolio operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PortfolioError {
    /// An instrument could not be valued; names the instrument and the cause.
    #[error(transparent)]
    Valuation(#[from] PricingError),

    /// Portfolio-level market data, FX rates in practice, is missing.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// No position with this ID.
    #[error("Position not found: {0}")]
    PositionNotFound(String),

    /// A ratio was requested against a total of zero.
    #[error("Total {measure} of portfolio '{portfolio}' is zero")]
    ZeroTotal {
        /// Portfolio identifier
        portfolio: String,
        /// `value` or `exposure`
        measure: &'static str,
    },
}
