//! Instrument error types.
//!
//! `InstrumentError` is what an instrument's pricing code returns;
//! `PricingError` is what leaves the [`Priceable`](super::Priceable)
//! contract, tagged with the instrument ID so a failed portfolio run names
//! the position that stopped it.

use riskbook_core::market::{MarketDataError, RiskCategory};
use thiserror::Error;

use crate::analytical::AnalyticalError;
use crate::schedules::ScheduleError;

/// Failure inside an instrument's valuation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InstrumentError {
    /// Required market data is missing or malformed.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// A pricing routine rejected its inputs.
    #[error(transparent)]
    Analytical(#[from] AnalyticalError),

    /// The payment schedule could not be built.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// The instrument's own terms are inconsistent.
    #[error("Invalid instrument definition: {0}")]
    InvalidDefinition(String),
}

/// Valuation failure for a named instrument.
///
/// # Examples
/// ```
/// use riskbook_core::market::{MarketDataError, RiskCategory};
/// use riskbook_models::instruments::{InstrumentError, PricingError};
///
/// let err = PricingError::new(
///     "BOND-7",
///     InstrumentError::MarketData(MarketDataError::MissingRiskFactor {
///         category: RiskCategory::Curve,
///         key: "RiskFree-Gov-USD".to_string(),
///     }),
/// );
/// let msg = err.to_string();
/// assert!(msg.contains("BOND-7"));
/// assert!(msg.contains("RiskFree-Gov-USD"));
/// assert_eq!(err.missing_factor(), Some((RiskCategory::Curve, "RiskFree-Gov-USD")));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Failed to value instrument '{instrument}': {source}")]
pub struct PricingError {
    /// ID of the instrument that failed
    pub instrument: String,
    /// Underlying failure
    pub source: InstrumentError,
}

impl PricingError {
    /// Tags `source` with the instrument ID.
    pub fn new(instrument: impl Into<String>, source: InstrumentError) -> Self {
        Self {
            instrument: instrument.into(),
            source,
        }
    }

    /// Category and key of the missing risk factor, if that is the cause.
    pub fn missing_factor(&self) -> Option<(RiskCategory, &str)> {
        match &self.source {
            InstrumentError::MarketData(MarketDataError::MissingRiskFactor { category, key }) => {
                Some((*category, key.as_str()))
            }
            _ => None,
        }
    }
}
