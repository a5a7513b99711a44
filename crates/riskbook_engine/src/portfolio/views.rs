//! Sub-portfolio views, weights and leverage.
//!
//! Views are new, flat portfolios holding the subset of flat positions that
//! match a predicate. They share nothing with the parent.

use std::collections::BTreeMap;

use riskbook_core::market::MarketEnvironment;
use riskbook_core::types::Currency;
use riskbook_models::instruments::{AssetClass, Priceable, Product};
use serde::Serialize;

use super::{Portfolio, PortfolioError};

/// Gross-over-net ratios of the long and short books.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Leverage {
    /// `(long - short) / (long + short)` of exposures
    pub exposure: f64,
    /// `(long - short) / (long + short)` of values
    pub value: f64,
}

impl Portfolio {
    /// Flat positions for which `keep(product, units)` holds.
    pub fn filter(&self, id: impl Into<String>, keep: impl Fn(&Product, f64) -> bool) -> Portfolio {
        let mut view = Portfolio::new(id, self.currency());
        for (product, units) in self.flat_positions() {
            if keep(product, units) {
                view.add_product(product.clone(), units);
            }
        }
        view
    }

    /// Positions of one asset class.
    pub fn by_asset_class(&self, class: AssetClass) -> Portfolio {
        self.filter(format!("{}-{}", self.id(), class), |p, _| p.asset_class() == class)
    }

    /// Positions denominated in `currency`, still settled in this portfolio's currency.
    pub fn by_currency(&self, currency: Currency) -> Portfolio {
        self.filter(format!("{}-{}", self.id(), currency), |p, _| p.currency() == currency)
    }

    /// Positions with positive units.
    pub fn long(&self) -> Portfolio {
        self.filter(format!("{}-long", self.id()), |_, units| units > 0.0)
    }

    /// Positions with negative units.
    pub fn short(&self) -> Portfolio {
        self.filter(format!("{}-short", self.id()), |_, units| units < 0.0)
    }

    /// Share of total exposure carried by each flat position.
    pub fn exposure_weights(&self, env: &MarketEnvironment) -> Result<BTreeMap<String, f64>, PortfolioError> {
        normalise(self.id(), "exposure", self.position_exposures(env)?)
    }

    /// Share of total value carried by each flat position.
    pub fn value_weights(&self, env: &MarketEnvironment) -> Result<BTreeMap<String, f64>, PortfolioError> {
        normalise(self.id(), "value", self.position_values(env)?)
    }

    /// Leverage of exposures and of values, from the long and short views.
    ///
    /// # Examples
    /// ```
    /// use riskbook_core::market::MarketEnvironment;
    /// use riskbook_core::types::{Currency, Date};
    /// use riskbook_engine::portfolio::Portfolio;
    /// use riskbook_models::instruments::Stock;
    ///
    /// let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
    /// env.add_constant("MarketPrice-A", 10.0);
    /// env.add_constant("MarketPrice-B", 10.0);
    ///
    /// let mut book = Portfolio::new("book", Currency::CAD);
    /// book.add_product(Stock::new("A", Currency::CAD), 30.0);
    /// book.add_product(Stock::new("B", Currency::CAD), -10.0);
    ///
    /// // long 300, short -100: (300 + 100) / (300 - 100)
    /// let leverage = book.leverage(&env).unwrap();
    /// assert!((leverage.value - 2.0).abs() < 1e-12);
    /// ```
    pub fn leverage(&self, env: &MarketEnvironment) -> Result<Leverage, PortfolioError> {
        let long = self.long();
        let short = self.short();
        let ratio = |l: f64, s: f64, measure: &'static str| {
            if l + s == 0.0 {
                Err(PortfolioError::ZeroTotal {
                    portfolio: self.id().to_string(),
                    measure,
                })
            } else {
                Ok((l - s) / (l + s))
            }
        };
        Ok(Leverage {
            exposure: ratio(long.exposure(env)?, short.exposure(env)?, "exposure")?,
            value: ratio(long.value(env)?, short.value(env)?, "value")?,
        })
    }
}

fn normalise(
    portfolio: &str,
    measure: &'static str,
    amounts: BTreeMap<String, f64>,
) -> Result<BTreeMap<String, f64>, PortfolioError> {
    let total: f64 = amounts.values().sum();
    if total == 0.0 {
        return Err(PortfolioError::ZeroTotal {
            portfolio: portfolio.to_string(),
            measure,
        });
    }
    Ok(amounts.into_iter().map(|(id, a)| (id, a / total)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskbook_core::types::Date;
    use riskbook_models::instruments::{CashAccount, Stock};

    fn env() -> MarketEnvironment {
        let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
        env.add_constant("MarketPrice-RY", 80.0);
        env.add_constant("MarketPrice-AAPL", 150.0);
        env.add_constant("FXRates-USDCAD", 1.25);
        env
    }

    fn book() -> Portfolio {
        let mut p = Portfolio::new("book", Currency::CAD);
        p.add_product(Stock::new("RY", Currency::CAD), 10.0);
        p.add_product(Stock::new("AAPL", Currency::USD), -2.0);
        p.add_product(CashAccount::new("CASH", Currency::CAD), 1000.0);
        p
    }

    #[test]
    fn test_views_partition_the_book() {
        let env = env();
        let book = book();
        let long = book.long();
        let short = book.short();
        assert_eq!(long.len(), 2);
        assert_eq!(short.len(), 1);
        assert_relative_eq!(
            long.value(&env).unwrap() + short.value(&env).unwrap(),
            book.value(&env).unwrap()
        );
        assert_eq!(book.by_currency(Currency::USD).units("AAPL"), Some(-2.0));
        assert_eq!(book.by_asset_class(AssetClass::Cash).len(), 1);
        assert_eq!(book.by_asset_class(AssetClass::Equity).currency(), Currency::CAD);
    }

    #[test]
    fn test_exposure_weights_sum_to_one() {
        let weights = book().exposure_weights(&env()).unwrap();
        assert_relative_eq!(weights.values().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(weights["CASH"], 0.0);
        assert_relative_eq!(weights["RY"], 800.0 / (800.0 - 375.0));
    }

    #[test]
    fn test_zero_total_is_an_error() {
        let mut p = Portfolio::new("cash-only", Currency::CAD);
        p.add_product(CashAccount::new("CASH", Currency::CAD), 10.0);
        assert!(matches!(
            p.exposure_weights(&env()),
            Err(PortfolioError::ZeroTotal { measure: "exposure", .. })
        ));
    }

    #[test]
    fn test_leverage_of_long_only_book_is_one() {
        let mut p = Portfolio::new("long-only", Currency::CAD);
        p.add_product(Stock::new("RY", Currency::CAD), 10.0);
        let leverage = p.leverage(&env()).unwrap();
        assert_relative_eq!(leverage.exposure, 1.0);
        assert_relative_eq!(leverage.value, 1.0);
    }
}
