//! Portfolio, market data and scenario loading.
//!
//! [`DataLoader`] is the seam between the engine and wherever positions and
//! market data live. [`JsonDataLoader`] reads a directory of JSON and CSV
//! files; see its documentation for the layout.

mod error;
mod json;

pub use error::LoaderError;
pub use json::{JsonDataLoader, HISTORY_FILE, MARKET_FILE, PORTFOLIO_FILE};

use riskbook_core::market::MarketEnvironment;
use riskbook_core::types::{Currency, Date};

use crate::portfolio::Portfolio;
use crate::scenarios::HistoricalScenarios;

/// Source of the inputs to a risk run.
pub trait DataLoader {
    /// Open positions, reported in `currency`.
    fn load_portfolio(&self, currency: Currency) -> Result<Portfolio, LoaderError>;

    /// Market data as of `valuation_date`.
    fn load_market_environment(&self, valuation_date: Date) -> Result<MarketEnvironment, LoaderError>;

    /// Daily historical factor moves, sorted by date.
    fn load_historical_scenarios(&self) -> Result<HistoricalScenarios, LoaderError>;
}
