//! Regulatory and economic capital.
//!
//! VaR inputs are P&L quantiles (losses negative); capital figures come out
//! positive for a loss-making tail.

use std::collections::BTreeMap;

use riskbook_core::market::MarketEnvironment;
use riskbook_models::instruments::{Priceable, Product};
use riskbook_models::ratings::{strip_notch, SP};
use serde::Serialize;

use super::error::RiskError;
use crate::portfolio::{value_as_of_maturity, Portfolio, PortfolioError};

/// Share of risk-weighted assets held as capital.
pub const CAPITAL_RATIO: f64 = 0.08;

/// Add-on for equity options.
pub const OPTION_ADD_ON: f64 = 0.06;

/// Add-on for bought CDS protection.
pub const CDS_PROTECTION_ADD_ON: f64 = 0.075;

/// Industry whose counterparties use the sovereign risk weights.
pub const GOVERNMENT: &str = "Government";

const RISK_WEIGHT_GRADES: [&str; 11] = ["AAA", "AAu", "AA", "A", "BBB+", "BBB", "BB+", "BB", "B", "NR", "N.A."];
const GOVERNMENT_WEIGHTS: [f64; 11] = [0.0, 0.0, 0.2, 0.2, 0.5, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0];
const CORPORATE_WEIGHTS: [f64; 11] = [0.2, 0.2, 0.2, 0.5, 1.0, 1.0, 1.0, 1.0, 1.5, 1.0, 1.0];

/// Standardized-approach risk weight for a counterparty.
///
/// A grade missing from the table is retried without its notch, then
/// weighted as `NR`. Missing ratings weigh as `N.A.`.
///
/// # Examples
/// ```
/// use riskbook_engine::risk::risk_weight;
///
/// assert_eq!(risk_weight(Some("AA"), Some("Government")), 0.2);
/// assert_eq!(risk_weight(Some("AA"), Some("Banks")), 0.2);
/// assert_eq!(risk_weight(Some("B"), None), 1.5);
/// assert_eq!(risk_weight(Some("A-"), None), 0.5);
/// ```
pub fn risk_weight(grade: Option<&str>, industry: Option<&str>) -> f64 {
    let weights = if industry == Some(GOVERNMENT) {
        &GOVERNMENT_WEIGHTS
    } else {
        &CORPORATE_WEIGHTS
    };
    let position = |g: &str| RISK_WEIGHT_GRADES.iter().position(|x| *x == g);
    let column = match grade {
        Some(g) => position(g.trim()).or_else(|| position(strip_notch(g))).or_else(|| position("NR")),
        None => position("N.A."),
    };
    column.map_or(1.0, |j| weights[j])
}

/// Multiplier on market VaR from the number of back-test breaches.
///
/// 3 up to 5 breaches, 4 above 9, linear in between.
pub fn capital_factor(breaches: usize) -> f64 {
    const MIN_BREACHES: f64 = 5.0;
    const MAX_BREACHES: f64 = 9.0;
    let b = breaches as f64;
    if b <= MIN_BREACHES {
        3.0
    } else if b > MAX_BREACHES {
        4.0
    } else {
        3.0 + (b - MIN_BREACHES) / (MAX_BREACHES - MIN_BREACHES)
    }
}

/// `−((market VaR + stressed VaR)·adjustment + credit VaR)`.
pub fn market_risk_capital(market_var: f64, stressed_var: f64, credit_var: f64, adjustment: f64) -> f64 {
    -((market_var + stressed_var) * adjustment + credit_var)
}

/// Market plus counterparty capital.
pub fn regulatory_capital(market_risk_capital: f64, counterparty_capital: f64) -> f64 {
    market_risk_capital + counterparty_capital
}

/// `−(credit VaR − mean credit P&L) + adjustment·(−market VaR)`.
pub fn economic_capital(credit_var: f64, credit_mean: f64, market_var: f64, adjustment: f64) -> f64 {
    -(credit_var - credit_mean) + adjustment * -market_var
}

/// Counterparty credit capital under the standardized approach.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CounterpartyCapital {
    /// Risk-weighted assets per derivative position
    pub rwa: BTreeMap<String, f64>,
    /// `CAPITAL_RATIO` times total RWA
    pub capital: f64,
}

/// Standardized counterparty capital for the derivatives in `portfolio`.
///
/// Options use the rating and industry of their underlying and a 6% add-on;
/// CDS use their own, with a 7.5% add-on when protection is bought.
/// `RWA = units · weight · max(value, 0) · (1 + add-on)`, with value in the
/// portfolio currency.
pub fn counterparty_credit_capital(
    portfolio: &Portfolio,
    env: &MarketEnvironment,
) -> Result<CounterpartyCapital, RiskError> {
    let mut out = CounterpartyCapital::default();
    for (product, units) in portfolio.flat_positions() {
        let (grade, industry, add_on) = match product {
            Product::EquityOption(option) => (
                option.underlying.ratings.get(SP),
                option.underlying.classification.industry.as_deref(),
                OPTION_ADD_ON,
            ),
            Product::CreditDefaultSwap(cds) => (
                cds.ratings.get(SP),
                cds.classification.industry.as_deref(),
                if units > 0.0 { CDS_PROTECTION_ADD_ON } else { 0.0 },
            ),
            _ => continue,
        };
        let value = value_as_of_maturity(product, env).map_err(PortfolioError::from)?;
        let fx = env.fx_rate(product.currency(), portfolio.currency())?;
        let rwa = units * risk_weight(grade, industry) * (value * fx).max(0.0) * (1.0 + add_on);
        tracing::debug!(instrument = product.id(), rwa, "counterparty RWA");
        *out.rwa.entry(product.id().to_string()).or_insert(0.0) += rwa;
        out.capital += CAPITAL_RATIO * rwa;
    }
    tracing::info!(portfolio = portfolio.id(), capital = out.capital, "counterparty capital");
    Ok(out)
}
