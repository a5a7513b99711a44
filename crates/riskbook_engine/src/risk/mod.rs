//! Risk measures.
//!
//! All measures work on P&L distributions in the portfolio currency, with
//! losses negative, so VaR and ES at a small `alpha` are negative numbers:
//! - [`var_from_pnl`]: VaR and ES of any distribution
//! - [`pnl_distribution`] / [`pnl_from_environments`]: revaluation over
//!   scenarios, in parallel
//! - [`scenario_var`] and [`backtest_var`]: historical VaR with horizon
//!   scaling, and breach counting
//! - [`marginal_var`]: additive decomposition over buckets
//! - [`simulate_credit`]: migration and default P&L
//! - [`market_risk_capital`], [`counterparty_credit_capital`] and friends:
//!   regulatory and economic capital

mod capital;
mod credit;
mod error;
mod marginal;
mod var;

pub use capital::{
    capital_factor, counterparty_credit_capital, economic_capital, market_risk_capital, regulatory_capital,
    risk_weight, CounterpartyCapital, CAPITAL_RATIO, CDS_PROTECTION_ADD_ON, GOVERNMENT, OPTION_ADD_ON,
};
pub use credit::{simulate_credit, CreditDistribution, CreditVarSettings, MigrationThresholds, DISTRESSED_BUCKET};
pub use error::RiskError;
pub use marginal::{marginal_var, marginal_var_from_portfolio, Bucket, Contribution, MarginalVar};
pub use var::{
    backtest_var, count_breaches, pnl_distribution, pnl_from_environments, scenario_var, var_from_pnl, VarResult,
};
