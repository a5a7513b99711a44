//! Closed set of instruments the engine can hold.

use riskbook_core::market::MarketEnvironment;
use riskbook_core::types::{Currency, Date};
use serde::{Deserialize, Serialize};

use super::bond::Bond;
use super::cash::CashAccount;
use super::cds::CreditDefaultSwap;
use super::error::PricingError;
use super::option::EquityOption;
use super::stock::Stock;
use super::traits::{AssetClass, Priceable, RiskFactorSet};

/// Any priceable instrument, tagged by `type` in serialised form.
///
/// # Examples
/// ```
/// use riskbook_models::instruments::{AssetClass, Priceable, Product};
///
/// let json = r#"{"type": "Stock", "id": "RY", "currency": "CAD"}"#;
/// let product: Product = serde_json::from_str(json).unwrap();
/// assert_eq!(product.id(), "RY");
/// assert_eq!(product.asset_class(), AssetClass::Equity);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Product {
    /// Cash balance
    Cash(CashAccount),
    /// Listed share
    Stock(Stock),
    /// Bond of any structure
    Bond(Bond),
    /// Vanilla equity option
    EquityOption(EquityOption),
    /// Credit default swap
    CreditDefaultSwap(CreditDefaultSwap),
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Product::Cash($inner) => $body,
            Product::Stock($inner) => $body,
            Product::Bond($inner) => $body,
            Product::EquityOption($inner) => $body,
            Product::CreditDefaultSwap($inner) => $body,
        }
    };
}

impl Priceable for Product {
    fn id(&self) -> &str {
        dispatch!(self, p => p.id())
    }

    fn currency(&self) -> Currency {
        dispatch!(self, p => p.currency())
    }

    fn asset_class(&self) -> AssetClass {
        dispatch!(self, p => p.asset_class())
    }

    fn maturity(&self) -> Option<Date> {
        dispatch!(self, p => p.maturity())
    }

    fn value(&self, env: &MarketEnvironment) -> Result<f64, PricingError> {
        dispatch!(self, p => p.value(env))
    }

    fn exposure(&self, env: &MarketEnvironment) -> Result<f64, PricingError> {
        dispatch!(self, p => p.exposure(env))
    }

    fn market_risk_factors(&self) -> RiskFactorSet {
        dispatch!(self, p => p.market_risk_factors())
    }

    fn credit_risk_factors(&self) -> RiskFactorSet {
        dispatch!(self, p => p.credit_risk_factors())
    }

    fn rating(&self, agency: &str) -> Option<&str> {
        dispatch!(self, p => p.rating(agency))
    }

    fn set_rating(&mut self, agency: &str, grade: &str) -> bool {
        dispatch!(self, p => p.set_rating(agency, grade))
    }
}

impl From<CashAccount> for Product {
    fn from(p: CashAccount) -> Self {
        Product::Cash(p)
    }
}

impl From<Stock> for Product {
    fn from(p: Stock) -> Self {
        Product::Stock(p)
    }
}

impl From<Bond> for Product {
    fn from(p: Bond) -> Self {
        Product::Bond(p)
    }
}

impl From<EquityOption> for Product {
    fn from(p: EquityOption) -> Self {
        Product::EquityOption(p)
    }
}

impl From<CreditDefaultSwap> for Product {
    fn from(p: CreditDefaultSwap) -> Self {
        Product::CreditDefaultSwap(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratings::SP;
    use riskbook_core::market::RiskCategory;

    #[test]
    fn test_cash_has_no_exposure() {
        let env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
        let cash = Product::from(CashAccount::new("CASH-CAD", Currency::CAD));
        assert_eq!(cash.value(&env).unwrap(), 1.0);
        assert_eq!(cash.exposure(&env).unwrap(), 0.0);
        assert!(cash.market_risk_factors().is_empty());
        assert_eq!(cash.maturity(), None);
    }

    #[test]
    fn test_set_rating_only_on_rated_products() {
        let mut cash = Product::from(CashAccount::new("CASH-CAD", Currency::CAD));
        assert!(!cash.set_rating(SP, "AA"));
        assert_eq!(cash.rating(SP), None);

        let mut stock = Product::from(Stock::new("RY", Currency::CAD));
        assert!(stock.set_rating(SP, "AA"));
        assert_eq!(stock.rating(SP), Some("AA"));
    }

    #[test]
    fn test_deserialize_bond_variant() {
        let json = r#"{
            "type": "Bond", "id": "Z1", "currency": "USD",
            "issue_date": "2015-01-01", "maturity_date": "2020-01-01",
            "structure": {"kind": "Zero"}
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.asset_class(), AssetClass::FixedIncome);
        assert!(product
            .market_risk_factors()
            .contains(RiskCategory::Curve, "RiskFree-Gov-USD"));
        assert!(product
            .credit_risk_factors()
            .contains(RiskCategory::Matrix, "CreditTransitionMatrix"));
    }
}
