//! Portfolios of instruments and nested portfolios.
//!
//! A [`Portfolio`] holds signed unit counts of [`Position`]s keyed by ID.
//! A position is either a single [`Product`] or a whole sub-portfolio, so
//! books can be assembled from desks and desks from strategies. Values and
//! exposures are converted into the portfolio currency with the FX rates of
//! the market environment.
//!
//! Sub-portfolio views, weights and leverage live in [`views`].

mod error;
pub mod views;

pub use error::PortfolioError;
pub use views::Leverage;

use std::borrow::Cow;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use riskbook_core::market::MarketEnvironment;
use riskbook_core::types::Currency;
use riskbook_models::instruments::{Priceable, PricingError, Product, RiskFactorSet};

/// Either a single instrument or a nested portfolio.
#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    /// A single instrument
    Leaf(Product),
    /// A nested portfolio, valued in its own currency first
    SubPortfolio(Portfolio),
}

impl Position {
    /// Identifier of the instrument or portfolio.
    pub fn id(&self) -> &str {
        match self {
            Position::Leaf(p) => p.id(),
            Position::SubPortfolio(p) => p.id(),
        }
    }

    /// Currency the position is valued in before conversion.
    pub fn currency(&self) -> Currency {
        match self {
            Position::Leaf(p) => p.currency(),
            Position::SubPortfolio(p) => p.currency(),
        }
    }
}

impl From<Product> for Position {
    fn from(product: Product) -> Self {
        Position::Leaf(product)
    }
}

impl From<Portfolio> for Position {
    fn from(portfolio: Portfolio) -> Self {
        Position::SubPortfolio(portfolio)
    }
}

/// A position and the signed number of units held.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    /// What is held
    pub position: Position,
    /// Units held; negative for short positions
    pub units: f64,
}

/// Signed holdings valued in a settlement currency.
///
/// # Examples
/// ```
/// use riskbook_core::market::MarketEnvironment;
/// use riskbook_core::types::{Currency, Date};
/// use riskbook_engine::portfolio::Portfolio;
/// use riskbook_models::instruments::Stock;
///
/// let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
/// env.add_constant("MarketPrice-AAPL", 150.0);
/// env.add_constant("FXRates-USDCAD", 1.3);
///
/// let mut us = Portfolio::new("us-equity", Currency::USD);
/// us.add_product(Stock::new("AAPL", Currency::USD), 10.0);
///
/// let mut book = Portfolio::new("book", Currency::CAD);
/// book.add_portfolio(us, 2.0);
///
/// assert!((book.value(&env).unwrap() - 2.0 * 10.0 * 150.0 * 1.3).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    id: String,
    currency: Currency,
    holdings: BTreeMap<String, Holding>,
}

impl Portfolio {
    /// Empty portfolio settled in `currency`.
    pub fn new(id: impl Into<String>, currency: Currency) -> Self {
        Self {
            id: id.into(),
            currency,
            holdings: BTreeMap::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Settlement currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Changes the settlement currency.
    pub fn set_currency(&mut self, currency: Currency) {
        self.currency = currency;
    }

    /// Number of direct holdings.
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// True when nothing is held.
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Direct holdings, sorted by ID.
    pub fn holdings(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.values()
    }

    /// Units held of the direct position `id`.
    pub fn units(&self, id: &str) -> Option<f64> {
        self.holdings.get(id).map(|h| h.units)
    }

    /// Adds `units` of `position`.
    ///
    /// Units accumulate on an existing ID. A holding whose units sum to
    /// exactly zero is removed, and a zero-unit addition of a new ID stores
    /// nothing.
    pub fn add_position(&mut self, position: Position, units: f64) {
        match self.holdings.entry(position.id().to_string()) {
            Entry::Occupied(mut entry) => {
                let total = entry.get().units + units;
                if total == 0.0 {
                    entry.remove();
                } else {
                    entry.get_mut().units = total;
                }
            }
            Entry::Vacant(entry) => {
                if units != 0.0 {
                    entry.insert(Holding { position, units });
                }
            }
        }
    }

    /// Adds `units` of an instrument.
    pub fn add_product(&mut self, product: impl Into<Product>, units: f64) {
        self.add_position(Position::Leaf(product.into()), units);
    }

    /// Adds `units` of a nested portfolio.
    pub fn add_portfolio(&mut self, portfolio: Portfolio, units: f64) {
        self.add_position(Position::SubPortfolio(portfolio), units);
    }

    /// Removes the direct position `id`.
    pub fn remove(&mut self, id: &str) -> Result<Holding, PortfolioError> {
        self.holdings
            .remove(id)
            .ok_or_else(|| PortfolioError::PositionNotFound(id.to_string()))
    }

    /// Every instrument held, directly or through nesting, with units scaled
    /// by the enclosing positions. The same instrument reached through
    /// several paths is merged; merged positions that cancel are dropped.
    pub fn flat_positions(&self) -> Vec<(&Product, f64)> {
        let mut flat = BTreeMap::new();
        self.collect_flat(1.0, &mut flat);
        flat.into_values().filter(|(_, units)| *units != 0.0).collect()
    }

    fn collect_flat<'a>(&'a self, scale: f64, out: &mut BTreeMap<&'a str, (&'a Product, f64)>) {
        for holding in self.holdings.values() {
            let units = holding.units * scale;
            match &holding.position {
                Position::Leaf(product) => {
                    out.entry(product.id()).or_insert((product, 0.0)).1 += units;
                }
                Position::SubPortfolio(inner) => inner.collect_flat(units, out),
            }
        }
    }

    /// Same instruments and units with all nesting removed.
    pub fn flattened(&self) -> Portfolio {
        let mut flat = Portfolio::new(self.id.clone(), self.currency);
        for (product, units) in self.flat_positions() {
            flat.add_product(product.clone(), units);
        }
        flat
    }

    /// Market value in the portfolio currency.
    ///
    /// Instruments past their maturity or expiry are valued as of that date.
    /// Any instrument failure aborts the whole valuation.
    pub fn value(&self, env: &MarketEnvironment) -> Result<f64, PortfolioError> {
        self.holdings.values().try_fold(0.0, |total, holding| {
            let value = match &holding.position {
                Position::Leaf(product) => value_as_of_maturity(product, env)?,
                Position::SubPortfolio(inner) => inner.value(env)?,
            };
            let fx = env.fx_rate(holding.position.currency(), self.currency)?;
            Ok(total + holding.units * value * fx)
        })
    }

    /// Exposure in the portfolio currency.
    pub fn exposure(&self, env: &MarketEnvironment) -> Result<f64, PortfolioError> {
        self.holdings.values().try_fold(0.0, |total, holding| {
            let exposure = match &holding.position {
                Position::Leaf(product) => product.exposure(env)?,
                Position::SubPortfolio(inner) => inner.exposure(env)?,
            };
            let fx = env.fx_rate(holding.position.currency(), self.currency)?;
            Ok(total + holding.units * exposure * fx)
        })
    }

    /// Value of each flat position in the portfolio currency, by instrument ID.
    pub fn position_values(&self, env: &MarketEnvironment) -> Result<BTreeMap<String, f64>, PortfolioError> {
        self.flat_positions()
            .into_iter()
            .map(|(product, units)| {
                let value = value_as_of_maturity(product, env)?;
                let fx = env.fx_rate(product.currency(), self.currency)?;
                Ok((product.id().to_string(), units * value * fx))
            })
            .collect()
    }

    /// Exposure of each flat position in the portfolio currency, by instrument ID.
    pub fn position_exposures(
        &self,
        env: &MarketEnvironment,
    ) -> Result<BTreeMap<String, f64>, PortfolioError> {
        self.flat_positions()
            .into_iter()
            .map(|(product, units)| {
                let exposure = product.exposure(env)?;
                let fx = env.fx_rate(product.currency(), self.currency)?;
                Ok((product.id().to_string(), units * exposure * fx))
            })
            .collect()
    }

    /// Union of the market data read by every instrument held.
    pub fn market_risk_factors(&self) -> RiskFactorSet {
        let mut factors = RiskFactorSet::new();
        for (product, _) in self.flat_positions() {
            factors.extend(&product.market_risk_factors());
        }
        factors
    }

    /// Union of the credit data used by every instrument held.
    pub fn credit_risk_factors(&self) -> RiskFactorSet {
        let mut factors = RiskFactorSet::new();
        for (product, _) in self.flat_positions() {
            factors.extend(&product.credit_risk_factors());
        }
        factors
    }
}

/// Unit value of `product`, frozen at its maturity when that has passed.
///
/// The valuation date is moved on a cheap copy of `env`, so the caller's
/// environment is never touched.
pub fn value_as_of_maturity(product: &Product, env: &MarketEnvironment) -> Result<f64, PricingError> {
    let env: Cow<'_, MarketEnvironment> = match product.maturity() {
        Some(maturity) if maturity < env.valuation_date() => {
            Cow::Owned(env.with_valuation_date(maturity))
        }
        _ => Cow::Borrowed(env),
    };
    product.value(&env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskbook_core::market::{MarketDataError, RiskCategory};
    use riskbook_core::types::Date;
    use riskbook_models::analytical::OptionType;
    use riskbook_models::instruments::{CashAccount, EquityOption, Stock};

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn env() -> MarketEnvironment {
        let mut env = MarketEnvironment::new("base", d(2017, 6, 1));
        env.add_constant("MarketPrice-RY", 80.0);
        env.add_constant("MarketPrice-AAPL", 150.0);
        env.add_constant("FXRates-CADUSD", 0.8);
        env
    }

    #[test]
    fn test_cancelling_positions_are_removed() {
        let mut p = Portfolio::new("book", Currency::CAD);
        p.add_product(Stock::new("RY", Currency::CAD), 100.0);
        p.add_product(Stock::new("RY", Currency::CAD), -40.0);
        assert_eq!(p.units("RY"), Some(60.0));
        p.add_product(Stock::new("RY", Currency::CAD), -60.0);
        assert!(p.is_empty());
        p.add_product(Stock::new("RY", Currency::CAD), 0.0);
        assert!(p.is_empty());
    }

    #[test]
    fn test_inverted_fx_rate() {
        let mut p = Portfolio::new("book", Currency::CAD);
        p.add_product(Stock::new("AAPL", Currency::USD), 2.0);
        assert_relative_eq!(p.value(&env()).unwrap(), 2.0 * 150.0 / 0.8);
    }

    #[test]
    fn test_missing_fx_rate_is_fatal() {
        let mut p = Portfolio::new("book", Currency::EUR);
        p.add_product(Stock::new("RY", Currency::CAD), 1.0);
        assert_eq!(
            p.value(&env()).unwrap_err(),
            PortfolioError::MarketData(MarketDataError::MissingFxRate {
                from: Currency::CAD,
                to: Currency::EUR,
            })
        );
    }

    #[test]
    fn test_flat_positions_scale_and_merge() {
        let mut desk = Portfolio::new("desk", Currency::CAD);
        desk.add_product(Stock::new("RY", Currency::CAD), 10.0);
        desk.add_product(CashAccount::new("CASH", Currency::CAD), 5.0);

        let mut book = Portfolio::new("book", Currency::CAD);
        book.add_portfolio(desk, 3.0);
        book.add_product(Stock::new("RY", Currency::CAD), -30.0);

        let flat = book.flat_positions();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].0.id(), "CASH");
        assert_eq!(flat[0].1, 15.0);
        assert_relative_eq!(book.value(&env()).unwrap(), book.flattened().value(&env()).unwrap());
    }

    #[test]
    fn test_missing_factor_names_instrument() {
        let mut p = Portfolio::new("book", Currency::CAD);
        p.add_product(Stock::new("TD", Currency::CAD), 1.0);
        match p.value(&env()).unwrap_err() {
            PortfolioError::Valuation(e) => {
                assert_eq!(e.instrument, "TD");
                assert_eq!(e.missing_factor(), Some((RiskCategory::Constant, "MarketPrice-TD")));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_expired_option_valued_at_expiry_without_touching_env() {
        let mut env = env();
        env.add_curve("RiskFree-Gov-CAD", riskbook_core::market::Curve::flat(0.01));
        env.add_constant("DividendYields-RY", 0.0);
        env.add_surface(
            "ImpliedVols-CAD-RY",
            riskbook_core::market::Table::new(
                vec!["0.25".into(), "1".into()],
                vec!["0.9".into(), "1.1".into()],
                vec![vec![0.2, 0.2], vec![0.2, 0.2]],
            )
            .unwrap(),
        );
        let option = EquityOption::new(
            "RY-C70",
            Stock::new("RY", Currency::CAD),
            d(2017, 3, 17),
            70.0,
            OptionType::Call,
        );
        let mut p = Portfolio::new("book", Currency::CAD);
        p.add_product(option, 1.0);
        assert_relative_eq!(p.value(&env).unwrap(), 10.0);
        assert_eq!(env.valuation_date(), d(2017, 6, 1));
    }

    #[test]
    fn test_factor_union() {
        let mut p = Portfolio::new("book", Currency::CAD);
        p.add_product(Stock::new("RY", Currency::CAD), 1.0);
        p.add_product(Stock::new("AAPL", Currency::USD), 1.0);
        let factors = p.market_risk_factors();
        assert_eq!(factors.names(RiskCategory::Constant).count(), 2);
        assert!(p.credit_risk_factors().is_empty());
    }
}
