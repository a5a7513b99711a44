//! Single-name credit default swaps, held as protection buyer.

use riskbook_core::market::{MarketEnvironment, RiskCategory};
use riskbook_core::types::{Currency, Date, DayCount};
use serde::{Deserialize, Serialize};

use super::error::{InstrumentError, PricingError};
use super::inputs::{
    rating_hazard_rate, recovery_rate, DEFAULT_PROBABILITY, HAZARD_RATES, RECOVERY_RATES,
    TRANSITION_MATRIX,
};
use super::traits::{AssetClass, Classification, Priceable, RiskFactorSet};
use crate::analytical::cds::cds_legs;
use crate::ratings::{Ratings, SP};
use crate::schedules::{Frequency, Schedule};

/// `IdiosyncraticHazardRate-{id}`.
pub fn idiosyncratic_hazard_key(id: &str) -> String {
    format!("IdiosyncraticHazardRate-{}", id)
}

/// Protection bought on `reference_entity` for `notional`.
///
/// The hazard rate is the rating's entry in `HazardRates-Ratings` plus the
/// contract's idiosyncratic hazard, floored at zero. Premiums run backward
/// from maturity at the contract frequency.
///
/// # Examples
/// ```
/// use riskbook_core::market::{Curve, MarketEnvironment, Table};
/// use riskbook_core::types::{Currency, Date};
/// use riskbook_models::instruments::{CreditDefaultSwap, Priceable};
///
/// let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
/// env.add_curve("RiskFree-Gov-USD", Curve::flat(0.02));
/// env.add_constant("IdiosyncraticHazardRate-CDS1", 0.0);
/// env.add_list("RecoveryRates", Table::list(vec!["Senior".into()], vec![0.4]).unwrap());
/// env.add_matrix(
///     "HazardRates-Ratings",
///     Table::new(vec!["BBB".into()], vec!["Hazard".into()], vec![vec![0.02]]).unwrap(),
/// );
///
/// let cds = CreditDefaultSwap::new(
///     "CDS1",
///     Currency::USD,
///     "ACME Corp",
///     Date::from_ymd(2017, 3, 20).unwrap(),
///     Date::from_ymd(2022, 3, 20).unwrap(),
///     1_000_000.0,
///     100.0,
///     "RiskFree-Gov-USD",
/// )
/// .with_rating("BBB");
///
/// // Spread of 100bp against a fair spread near 120bp: protection is in the money.
/// assert!(cds.value(&env).unwrap() > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditDefaultSwap {
    /// Identifier
    pub id: String,
    /// Currency of premiums and protection
    pub currency: Currency,
    /// Name the protection references
    pub reference_entity: String,
    /// Effective date
    pub start_date: Date,
    /// Final premium date
    pub maturity_date: Date,
    /// Notional protected
    pub notional: f64,
    /// Running spread paid, in basis points
    pub contract_spread_bps: f64,
    /// Curve key used for discounting
    pub discount_curve: String,
    /// Premium frequency
    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
    /// Whether accrued premium is paid on default; carried for reporting
    #[serde(default)]
    pub accrued_on_default: bool,
    /// Protection seller
    #[serde(default)]
    pub counterparty: Option<String>,
    /// Day count of the premium leg
    #[serde(default)]
    pub day_count: DayCount,
    /// Seniority of the reference obligation
    #[serde(default)]
    pub tier: Option<String>,
    /// Country of the reference entity
    #[serde(default)]
    pub country: Option<String>,
    /// Reference entity ratings by agency
    #[serde(default)]
    pub ratings: Ratings,
    /// Industry classification of the reference entity
    #[serde(flatten)]
    pub classification: Classification,
}

fn default_frequency() -> Frequency {
    Frequency::Quarterly
}

impl CreditDefaultSwap {
    /// Unrated quarterly-paying contract.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        currency: Currency,
        reference_entity: impl Into<String>,
        start_date: Date,
        maturity_date: Date,
        notional: f64,
        contract_spread_bps: f64,
        discount_curve: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            currency,
            reference_entity: reference_entity.into(),
            start_date,
            maturity_date,
            notional,
            contract_spread_bps,
            discount_curve: discount_curve.into(),
            frequency: default_frequency(),
            accrued_on_default: false,
            counterparty: None,
            day_count: DayCount::default(),
            tier: None,
            country: None,
            ratings: Ratings::default(),
            classification: Classification::default(),
        }
    }

    /// Sets the S&P rating of the reference entity.
    pub fn with_rating(mut self, grade: &str) -> Self {
        self.ratings.set(SP, grade);
        self
    }

    /// Flat hazard rate for the reference entity.
    pub fn hazard_rate(&self, env: &MarketEnvironment) -> Result<f64, InstrumentError> {
        let idiosyncratic = env.get_constant(&idiosyncratic_hazard_key(&self.id))?;
        let by_rating = rating_hazard_rate(env, self.ratings.sp())?;
        Ok((by_rating + idiosyncratic).max(0.0))
    }

    fn price(&self, env: &MarketEnvironment) -> Result<f64, InstrumentError> {
        let valuation = env.valuation_date();
        let schedule = Schedule::premiums(self.maturity_date, self.frequency, valuation, self.day_count)?;
        if schedule.is_empty() {
            return Ok(0.0);
        }
        let curve = env.get_curve(&self.discount_curve)?;
        let hazard = self.hazard_rate(env)?;
        let recovery = recovery_rate(env, self.tier.as_deref())?;

        let legs = cds_legs(
            schedule.times(),
            self.frequency,
            self.contract_spread_bps,
            self.notional,
            recovery,
            hazard,
            curve,
        );
        tracing::trace!(
            id = %self.id,
            premium = legs.premium,
            protection = legs.protection,
            hazard,
            "valued cds legs"
        );
        Ok(legs.value())
    }
}

impl Priceable for CreditDefaultSwap {
    fn id(&self) -> &str {
        &self.id
    }

    fn currency(&self) -> Currency {
        self.currency
    }

    fn asset_class(&self) -> AssetClass {
        AssetClass::Derivative
    }

    fn maturity(&self) -> Option<Date> {
        Some(self.maturity_date)
    }

    fn value(&self, env: &MarketEnvironment) -> Result<f64, PricingError> {
        self.price(env).map_err(|e| PricingError::new(&self.id, e))
    }

    /// Notional plus mark-to-market.
    fn exposure(&self, env: &MarketEnvironment) -> Result<f64, PricingError> {
        Ok(self.notional + self.value(env)?)
    }

    fn market_risk_factors(&self) -> RiskFactorSet {
        RiskFactorSet::new()
            .with(RiskCategory::Curve, self.discount_curve.clone())
            .with(RiskCategory::List, RECOVERY_RATES)
            .with(RiskCategory::Constant, idiosyncratic_hazard_key(&self.id))
            .with(RiskCategory::Matrix, HAZARD_RATES)
    }

    fn credit_risk_factors(&self) -> RiskFactorSet {
        RiskFactorSet::new()
            .with(RiskCategory::List, DEFAULT_PROBABILITY)
            .with(RiskCategory::Matrix, TRANSITION_MATRIX)
    }

    fn rating(&self, agency: &str) -> Option<&str> {
        self.ratings.get(agency)
    }

    fn set_rating(&mut self, agency: &str, grade: &str) -> bool {
        self.ratings.set(agency, grade);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskbook_core::market::{Curve, Table};

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn env(hazard: f64) -> MarketEnvironment {
        let mut env = MarketEnvironment::new("base", d(2017, 6, 1));
        env.add_curve("RiskFree-Gov-USD", Curve::flat(0.02));
        env.add_constant("IdiosyncraticHazardRate-CDS1", 0.0);
        env.add_list(
            RECOVERY_RATES,
            Table::list(labels(&["Senior", "Subordinated"]), vec![0.4, 0.2]).unwrap(),
        );
        env.add_matrix(
            HAZARD_RATES,
            Table::new(labels(&["A", "BBB"]), labels(&["Hazard"]), vec![vec![hazard], vec![hazard * 2.0]])
                .unwrap(),
        );
        env
    }

    fn cds() -> CreditDefaultSwap {
        CreditDefaultSwap::new(
            "CDS1",
            Currency::USD,
            "ACME",
            d(2017, 3, 20),
            d(2022, 3, 20),
            1e6,
            100.0,
            "RiskFree-Gov-USD",
        )
        .with_rating("A")
    }

    #[test]
    fn test_no_default_risk_costs_the_premium() {
        let env = env(0.0);
        let value = cds().value(&env).unwrap();
        assert!(value < 0.0);
        assert_relative_eq!(cds().exposure(&env).unwrap(), 1e6 + value);
    }

    #[test]
    fn test_idiosyncratic_hazard_floored() {
        let mut env = env(0.01);
        env.add_constant("IdiosyncraticHazardRate-CDS1", -0.05);
        assert_eq!(cds().hazard_rate(&env).unwrap(), 0.0);
    }

    #[test]
    fn test_downgrade_raises_value() {
        let env = env(0.01);
        let a = cds().value(&env).unwrap();
        let mut downgraded = cds();
        downgraded.set_rating(SP, "BBB");
        assert!(downgraded.value(&env).unwrap() > a);
    }

    #[test]
    fn test_subordinated_tier_raises_protection() {
        let env = env(0.02);
        let mut senior = cds();
        senior.tier = Some("Senior".to_string());
        let mut junior = cds();
        junior.tier = Some("Subordinated".to_string());
        assert!(junior.value(&env).unwrap() > senior.value(&env).unwrap());
    }

    #[test]
    fn test_untiered_contract_uses_last_recovery_column() {
        let env = env(0.02);
        let mut junior = cds();
        junior.tier = Some("Subordinated".to_string());
        assert_eq!(recovery_rate(&env, None).unwrap(), 0.2);
        assert_relative_eq!(cds().value(&env).unwrap(), junior.value(&env).unwrap());
    }

    #[test]
    fn test_expired_contract() {
        let env = env(0.01).with_valuation_date(d(2023, 1, 1));
        assert_eq!(cds().value(&env).unwrap(), 0.0);
    }

    #[test]
    fn test_missing_recovery_rates() {
        let mut env = MarketEnvironment::new("bare", d(2017, 6, 1));
        env.add_curve("RiskFree-Gov-USD", Curve::flat(0.02));
        env.add_constant("IdiosyncraticHazardRate-CDS1", 0.0);
        env.add_matrix(
            HAZARD_RATES,
            Table::new(labels(&["A"]), labels(&["Hazard"]), vec![vec![0.01]]).unwrap(),
        );
        let err = cds().value(&env).unwrap_err();
        assert_eq!(err.missing_factor(), Some((RiskCategory::List, RECOVERY_RATES)));
    }
}
