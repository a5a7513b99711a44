//! Listed equity.

use riskbook_core::market::{MarketEnvironment, RiskCategory};
use riskbook_core::types::Currency;
use serde::{Deserialize, Serialize};

use super::error::{InstrumentError, PricingError};
use super::inputs::market_price_key;
use super::traits::{AssetClass, Classification, Priceable, RiskFactorSet};
use crate::ratings::Ratings;

/// A share priced off the constant `MarketPrice-{id}`.
///
/// # Examples
/// ```
/// use riskbook_core::market::MarketEnvironment;
/// use riskbook_core::types::{Currency, Date};
/// use riskbook_models::instruments::{Priceable, Stock};
///
/// let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
/// env.add_constant("MarketPrice-RY", 81.5);
///
/// let stock = Stock::new("RY", Currency::CAD);
/// assert_eq!(stock.value(&env).unwrap(), 81.5);
/// assert_eq!(stock.exposure(&env).unwrap(), 81.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    /// Identifier, also the market price key suffix
    pub id: String,
    /// Trading currency
    pub currency: Currency,
    /// Issuer name
    #[serde(default)]
    pub company_name: String,
    /// Exchange ticker
    #[serde(default)]
    pub ticker: Option<String>,
    /// CUSIP identifier
    #[serde(default)]
    pub cusip: Option<String>,
    /// Country of incorporation
    #[serde(default)]
    pub country: Option<String>,
    /// Issuer ratings by agency
    #[serde(default)]
    pub ratings: Ratings,
    /// Industry classification
    #[serde(flatten)]
    pub classification: Classification,
}

impl Stock {
    /// Unrated stock with no descriptive fields.
    pub fn new(id: impl Into<String>, currency: Currency) -> Self {
        Self {
            id: id.into(),
            currency,
            company_name: String::new(),
            ticker: None,
            cusip: None,
            country: None,
            ratings: Ratings::default(),
            classification: Classification::default(),
        }
    }

    /// Current market price.
    pub(crate) fn spot(&self, env: &MarketEnvironment) -> Result<f64, InstrumentError> {
        Ok(env.get_constant(&market_price_key(&self.id))?)
    }
}

impl Priceable for Stock {
    fn id(&self) -> &str {
        &self.id
    }

    fn currency(&self) -> Currency {
        self.currency
    }

    fn asset_class(&self) -> AssetClass {
        AssetClass::Equity
    }

    fn value(&self, env: &MarketEnvironment) -> Result<f64, PricingError> {
        self.spot(env).map_err(|e| PricingError::new(&self.id, e))
    }

    fn market_risk_factors(&self) -> RiskFactorSet {
        RiskFactorSet::new().with(RiskCategory::Constant, market_price_key(&self.id))
    }

    fn rating(&self, agency: &str) -> Option<&str> {
        self.ratings.get(agency)
    }

    fn set_rating(&mut self, agency: &str, grade: &str) -> bool {
        self.ratings.set(agency, grade);
        true
    }
}
