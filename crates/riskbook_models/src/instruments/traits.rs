//! The valuation contract shared by every instrument.
//!
//! [`Priceable`] is implemented by each instrument type and by the
//! [`Product`](super::Product) enum, which dispatches on its variant. The
//! engine holds `Product` values rather than trait objects.

use riskbook_core::market::{MarketEnvironment, RiskCategory};
use riskbook_core::types::{Currency, Date};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::error::PricingError;

/// Broad asset class used to build sub-portfolio views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// Cash balances
    Cash,
    /// Listed equity
    Equity,
    /// Bonds of every structure
    FixedIncome,
    /// Options and swaps
    Derivative,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetClass::Cash => "Cash",
            AssetClass::Equity => "Equity",
            AssetClass::FixedIncome => "FixedIncome",
            AssetClass::Derivative => "Derivative",
        };
        f.write_str(name)
    }
}

/// Industry classification carried by issuers and reference entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Industry, e.g. `Government` or `Financials`
    #[serde(default)]
    pub industry: Option<String>,
    /// Sector within the industry
    #[serde(default)]
    pub sector: Option<String>,
    /// Sub-sector within the sector
    #[serde(default)]
    pub subsector: Option<String>,
}

/// Market data entries an instrument reads, by category.
///
/// # Examples
/// ```
/// use riskbook_core::market::RiskCategory;
/// use riskbook_models::instruments::RiskFactorSet;
///
/// let mut factors = RiskFactorSet::new();
/// factors.insert(RiskCategory::Curve, "RiskFree-Gov-CAD");
/// factors.insert(RiskCategory::Constant, "MarketPrice-ABC");
/// factors.insert(RiskCategory::Curve, "RiskFree-Gov-CAD");
///
/// assert_eq!(factors.len(), 2);
/// assert!(factors.contains(RiskCategory::Constant, "MarketPrice-ABC"));
/// assert_eq!(factors.names(RiskCategory::Curve).collect::<Vec<_>>(), vec!["RiskFree-Gov-CAD"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskFactorSet {
    entries: BTreeMap<RiskCategory, BTreeSet<String>>,
}

impl RiskFactorSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a market data name under `category`.
    pub fn insert(&mut self, category: RiskCategory, name: impl Into<String>) {
        self.entries.entry(category).or_default().insert(name.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, category: RiskCategory, name: impl Into<String>) -> Self {
        self.insert(category, name);
        self
    }

    /// Adds every entry of `other`.
    pub fn extend(&mut self, other: &RiskFactorSet) {
        for (category, name) in other.iter() {
            self.insert(category, name);
        }
    }

    /// True when `name` is listed under `category`.
    pub fn contains(&self, category: RiskCategory, name: &str) -> bool {
        self.entries
            .get(&category)
            .is_some_and(|names| names.contains(name))
    }

    /// Names listed under `category`, sorted.
    pub fn names(&self, category: RiskCategory) -> impl Iterator<Item = &str> {
        self.entries
            .get(&category)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    /// Every `(category, name)` pair, sorted by category then name.
    pub fn iter(&self) -> impl Iterator<Item = (RiskCategory, &str)> {
        self.entries
            .iter()
            .flat_map(|(c, names)| names.iter().map(move |n| (*c, n.as_str())))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// True when nothing is listed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Uniform valuation contract.
///
/// `value` and `exposure` are in the instrument's own currency; the
/// portfolio converts them. Ratings are the only state that changes after
/// construction, during credit migration, and only on copies.
pub trait Priceable {
    /// Instrument identifier.
    fn id(&self) -> &str;

    /// Currency of `value` and `exposure`.
    fn currency(&self) -> Currency;

    /// Asset class.
    fn asset_class(&self) -> AssetClass;

    /// Final payment or expiry date, if the instrument has one.
    fn maturity(&self) -> Option<Date> {
        None
    }

    /// Price of one unit under `env`.
    fn value(&self, env: &MarketEnvironment) -> Result<f64, PricingError>;

    /// Exposure of one unit under `env`. Defaults to the value.
    fn exposure(&self, env: &MarketEnvironment) -> Result<f64, PricingError> {
        self.value(env)
    }

    /// Market data the valuation reads.
    fn market_risk_factors(&self) -> RiskFactorSet;

    /// Credit data used by rating migration.
    fn credit_risk_factors(&self) -> RiskFactorSet {
        RiskFactorSet::new()
    }

    /// Grade assigned by `agency`, for rated instruments.
    fn rating(&self, _agency: &str) -> Option<&str> {
        None
    }

    /// Replaces the grade assigned by `agency`. Returns `false` for
    /// instruments that carry no ratings.
    fn set_rating(&mut self, _agency: &str, _grade: &str) -> bool {
        false
    }
}
