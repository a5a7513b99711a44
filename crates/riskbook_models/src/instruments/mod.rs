//! Instruments and the valuation contract.
//!
//! Every instrument implements [`Priceable`]: a unit price and exposure in
//! its own currency under a [`MarketEnvironment`](riskbook_core::market::MarketEnvironment),
//! and the names of the market data it reads. [`Product`] wraps the closed
//! set of instrument types so portfolios can hold them by value.
//!
//! | Type | Asset class | Exposure |
//! |------|-------------|----------|
//! | [`CashAccount`] | Cash | 0 |
//! | [`Stock`] | Equity | price |
//! | [`Bond`] | FixedIncome | price |
//! | [`EquityOption`] | Derivative | delta × spot |
//! | [`CreditDefaultSwap`] | Derivative | notional + value |

mod bond;
mod cash;
mod cds;
mod error;
pub mod inputs;
mod option;
mod product;
mod stock;
mod traits;

pub use bond::{Bond, BondStructure, RISK_FACTOR_MEANS, RISK_FACTOR_VOLATILITIES};
pub use cash::CashAccount;
pub use cds::{idiosyncratic_hazard_key, CreditDefaultSwap};
pub use error::{InstrumentError, PricingError};
pub use option::{dividend_yield_key, implied_vol_key, EquityOption, OptionInputs};
pub use product::Product;
pub use stock::Stock;
pub use traits::{AssetClass, Classification, Priceable, RiskFactorSet};
