//! Scenario error types.

use riskbook_core::market::MarketDataError;
use riskbook_core::types::DateError;
use thiserror::Error;

use crate::portfolio::PortfolioError;

/// Errors raised while building or applying scenarios.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScenarioError {
    /// A shifted factor is not in the environment, or a key is malformed.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// Revaluation under a scenario failed.
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    /// Invalid calendar date.
    #[error(transparent)]
    Date(#[from] DateError),

    /// A scenario row has the wrong number of values.
    #[error("Scenario row {row} has {got} values, expected {expected}")]
    RowLength {
        /// Row index
        row: usize,
        /// Number of factor columns
        expected: usize,
        /// Number of values in the row
        got: usize,
    },

    /// Labels or dates do not line up with the scenario rows.
    #[error("Expected {expected} scenario labels, got {got}")]
    LabelCount {
        /// Number of rows
        expected: usize,
        /// Number of labels supplied
        got: usize,
    },

    /// An unrecognised preset name.
    #[error("Unknown preset scenario: {0}")]
    UnknownPreset(String),
}
