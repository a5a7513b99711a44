//! Market data error types.
//!
//! Lookups against a `MarketEnvironment` never default silently: a missing
//! curve, list entry or constant is reported as `MissingRiskFactor` with the
//! category and the full key that was requested.

use crate::math::InterpolationError;
use crate::types::{Currency, DateError};
use thiserror::Error;

use super::key::RiskCategory;

/// Market data operation errors.
///
/// # Examples
///
/// ```
/// use riskbook_core::market::{MarketDataError, RiskCategory};
///
/// let err = MarketDataError::MissingRiskFactor {
///     category: RiskCategory::Curve,
///     key: "RiskFree-Gov-USD".to_string(),
/// };
/// assert_eq!(format!("{}", err), "Missing risk factor: Curves 'RiskFree-Gov-USD'");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Requested key (or row/column within a table) is absent.
    #[error("Missing risk factor: {category} '{key}'")]
    MissingRiskFactor {
        /// Category that was searched
        category: RiskCategory,
        /// Key as requested
        key: String,
    },

    /// Neither direction of an FX pair is quoted.
    #[error("Missing FX rate: {from}{to}")]
    MissingFxRate {
        /// Source currency
        from: Currency,
        /// Target currency
        to: Currency,
    },

    /// A legacy key string could not be decomposed.
    #[error("Invalid risk factor key: '{0}'")]
    InvalidKey(String),

    /// Table, list or curve construction failed.
    #[error("Invalid market data table: {0}")]
    InvalidTable(String),

    /// Interpolator construction failed.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// Date parsing or arithmetic failed.
    #[error("Date error: {0}")]
    Date(#[from] DateError),
}

impl MarketDataError {
    pub(crate) fn missing(category: RiskCategory, key: impl Into<String>) -> Self {
        MarketDataError::MissingRiskFactor {
            category,
            key: key.into(),
        }
    }
}
