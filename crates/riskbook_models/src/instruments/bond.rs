//! Bonds: zero-coupon, fixed-rate, floating-rate and callable.
//!
//! Zero, fixed and floating bonds discount on the issuer's credit curve
//! (risk-free + rating spread + idiosyncratic spread). Callable bonds run a
//! Ho-Lee lattice from the short end of the risk-free curve.

use riskbook_core::market::{MarketEnvironment, RiskCategory, RiskFactorKey};
use riskbook_core::types::{Currency, Date, DayCount};
use serde::{Deserialize, Serialize};

use super::error::{InstrumentError, PricingError};
use super::inputs::{
    credit_discount_curve, credit_spreads_key, idiosyncratic_spread_key, risk_free_key,
    DEFAULT_PROBABILITY, DEFAULT_RISK_FREE, TRANSITION_MATRIX,
};
use super::traits::{AssetClass, Classification, Priceable, RiskFactorSet};
use crate::analytical::bonds::{fixed_coupon_bond, floating_rate_note, zero_coupon_bond};
use crate::analytical::ho_lee::strikes_by_step;
use crate::analytical::{CallExercise, CallProvision, HoLee};
use crate::ratings::{Ratings, SP};
use crate::schedules::{Frequency, Schedule};

/// List of drift estimates, keyed by legacy risk factor name.
pub const RISK_FACTOR_MEANS: &str = "RiskFactorMeans";
/// List of volatility estimates, keyed by legacy risk factor name.
pub const RISK_FACTOR_VOLATILITIES: &str = "RiskFactorVolatilities";

/// Short-rate pillar whose drift and volatility drive the Ho-Lee lattice.
const SHORT_RATE_TENOR: f64 = 0.25;

/// Coupon structure of a bond.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BondStructure {
    /// Fixed coupons at the bond's frequency.
    #[default]
    Fixed,
    /// Face value at maturity only.
    Zero,
    /// Coupons projected off a reference curve plus a spread.
    Floating {
        /// Curve key of the reference index
        reference_curve: String,
        /// Spread over the index in basis points
        #[serde(default)]
        spread_bps: f64,
    },
    /// Fixed coupons with issuer call rights.
    Callable {
        /// Call dates and strikes
        calls: Vec<CallProvision>,
        /// Whether calls bind once or from their date onward
        #[serde(default)]
        exercise: CallExercise,
    },
}

fn default_face() -> f64 {
    100.0
}

fn default_risk_free() -> String {
    DEFAULT_RISK_FREE.to_string()
}

/// A bond position of one unit of face value `face_value`.
///
/// # Examples
/// ```
/// use riskbook_core::market::{Curve, MarketEnvironment};
/// use riskbook_core::types::{Currency, Date};
/// use riskbook_models::instruments::{Bond, Priceable};
/// use riskbook_models::schedules::Frequency;
///
/// let issue = Date::from_ymd(2016, 4, 1).unwrap();
/// let maturity = Date::from_ymd(2018, 4, 1).unwrap();
/// let bond = Bond::fixed("GOC-18", Currency::CAD, issue, maturity, 5.0, Frequency::SemiAnnual)
///     .with_rating("AAA");
///
/// let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 10, 1).unwrap());
/// env.add_curve("RiskFree-Gov-CAD", Curve::flat(0.05));
/// env.add_constant("IdiosyncraticSpread-GOC-18", 0.0);
///
/// let price = bond.value(&env).unwrap();
/// assert!((price - 100.0).abs() < 0.01);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    /// Identifier, also the idiosyncratic spread key suffix
    pub id: String,
    /// Currency of payments
    pub currency: Currency,
    /// Issue (accrual start) date
    pub issue_date: Date,
    /// Final payment date
    pub maturity_date: Date,
    /// Face value
    #[serde(default = "default_face")]
    pub face_value: f64,
    /// Annual coupon in percent of face
    #[serde(default)]
    pub coupon_rate: f64,
    /// Coupon frequency
    #[serde(default)]
    pub frequency: Frequency,
    /// First coupon date; one period after issue when absent
    #[serde(default)]
    pub first_coupon_date: Option<Date>,
    /// Day count for coupon timing
    #[serde(default)]
    pub day_count: DayCount,
    /// Coupon structure
    #[serde(default)]
    pub structure: BondStructure,
    /// Risk-free curve family (`RiskFree-{family}-{ccy}`)
    #[serde(default = "default_risk_free")]
    pub risk_free: String,
    /// Issuer name
    #[serde(default)]
    pub issuer: String,
    /// Seniority tier, used for recovery on default
    #[serde(default)]
    pub tier: Option<String>,
    /// Country of the issuer
    #[serde(default)]
    pub country: Option<String>,
    /// Issuer ratings by agency
    #[serde(default)]
    pub ratings: Ratings,
    /// Industry classification
    #[serde(flatten)]
    pub classification: Classification,
}

impl Bond {
    /// Unrated fixed-coupon bond.
    pub fn fixed(
        id: impl Into<String>,
        currency: Currency,
        issue_date: Date,
        maturity_date: Date,
        coupon_rate: f64,
        frequency: Frequency,
    ) -> Self {
        Self {
            id: id.into(),
            currency,
            issue_date,
            maturity_date,
            face_value: default_face(),
            coupon_rate,
            frequency,
            first_coupon_date: None,
            day_count: DayCount::default(),
            structure: BondStructure::Fixed,
            risk_free: default_risk_free(),
            issuer: String::new(),
            tier: None,
            country: None,
            ratings: Ratings::default(),
            classification: Classification::default(),
        }
    }

    /// Unrated zero-coupon bond.
    pub fn zero(id: impl Into<String>, currency: Currency, issue_date: Date, maturity_date: Date) -> Self {
        Self {
            structure: BondStructure::Zero,
            ..Self::fixed(id, currency, issue_date, maturity_date, 0.0, Frequency::Annual)
        }
    }

    /// Replaces the coupon structure.
    pub fn with_structure(mut self, structure: BondStructure) -> Self {
        self.structure = structure;
        self
    }

    /// Sets the S&P rating.
    pub fn with_rating(mut self, grade: &str) -> Self {
        self.ratings.set(SP, grade);
        self
    }

    /// Sets the face value.
    pub fn with_face_value(mut self, face_value: f64) -> Self {
        self.face_value = face_value;
        self
    }

    /// First coupon date, defaulting to one period after issue.
    pub fn first_coupon(&self) -> Result<Date, InstrumentError> {
        match self.first_coupon_date {
            Some(date) => Ok(date),
            None => Ok(self
                .issue_date
                .add_months(self.frequency.months_between_payments())
                .map_err(crate::schedules::ScheduleError::from)?),
        }
    }

    /// Coupon dates remaining after `valuation`.
    pub fn schedule(&self, valuation: Date) -> Result<Schedule, InstrumentError> {
        Ok(Schedule::coupons(
            self.first_coupon()?,
            self.maturity_date,
            self.frequency,
            valuation,
            self.day_count,
        )?)
    }

    fn coupon_amount(&self) -> f64 {
        self.coupon_rate / 100.0 / self.frequency.per_year() * self.face_value
    }

    fn price(&self, env: &MarketEnvironment) -> Result<f64, InstrumentError> {
        if !(self.face_value.is_finite() && self.face_value >= 0.0) {
            return Err(InstrumentError::InvalidDefinition(format!(
                "face value {} of '{}'",
                self.face_value, self.id
            )));
        }
        let valuation = env.valuation_date();
        match &self.structure {
            BondStructure::Zero => {
                let curve = self.credit_curve(env)?;
                let time = self.day_count.year_fraction(valuation, self.maturity_date);
                Ok(zero_coupon_bond(self.face_value, time, &curve))
            }
            BondStructure::Fixed => {
                let curve = self.credit_curve(env)?;
                let schedule = self.schedule(valuation)?;
                Ok(fixed_coupon_bond(
                    &schedule,
                    self.face_value,
                    self.coupon_rate,
                    self.frequency,
                    &curve,
                ))
            }
            BondStructure::Floating {
                reference_curve,
                spread_bps,
            } => {
                let curve = self.credit_curve(env)?;
                let spread = spread_bps / 1e4;
                let reference = env.get_curve(reference_curve)?.map_values(|v| v + spread);
                let schedule = self.schedule(valuation)?;
                Ok(floating_rate_note(
                    &schedule,
                    self.face_value,
                    self.frequency,
                    &curve,
                    &reference,
                ))
            }
            BondStructure::Callable { calls, exercise } => {
                self.callable_price(env, calls, *exercise)
            }
        }
    }

    fn callable_price(
        &self,
        env: &MarketEnvironment,
        calls: &[CallProvision],
        exercise: CallExercise,
    ) -> Result<f64, InstrumentError> {
        let valuation = env.valuation_date();
        let schedule = self.schedule(valuation)?;
        if schedule.is_empty() {
            return Ok(0.0);
        }

        let curve_key = risk_free_key(&self.risk_free, self.currency);
        let short_rate = env.get_curve(&curve_key)?.first_value();
        let column = RiskFactorKey::curve(curve_key, SHORT_RATE_TENOR).to_string();
        let drift = env.get_list_value(RISK_FACTOR_MEANS, &column)?;
        let volatility = env.get_list_value(RISK_FACTOR_VOLATILITIES, &column)?;

        let period = self.frequency.period_length();
        let step_lengths: Vec<f64> = schedule
            .times()
            .iter()
            .enumerate()
            .map(|(k, &t)| if k == 0 { t } else { period })
            .collect();
        let strikes = strikes_by_step(schedule.dates(), valuation, calls, exercise);

        Ok(HoLee::new(short_rate, drift, volatility).callable_bond(
            &step_lengths,
            self.coupon_amount(),
            self.face_value,
            &strikes,
        )?)
    }

    fn credit_curve(
        &self,
        env: &MarketEnvironment,
    ) -> Result<riskbook_core::market::Curve, InstrumentError> {
        credit_discount_curve(env, self.currency, &self.risk_free, self.ratings.sp(), &self.id)
    }
}

impl Priceable for Bond {
    fn id(&self) -> &str {
        &self.id
    }

    fn currency(&self) -> Currency {
        self.currency
    }

    fn asset_class(&self) -> AssetClass {
        AssetClass::FixedIncome
    }

    fn maturity(&self) -> Option<Date> {
        Some(self.maturity_date)
    }

    fn value(&self, env: &MarketEnvironment) -> Result<f64, PricingError> {
        self.price(env).map_err(|e| PricingError::new(&self.id, e))
    }

    fn market_risk_factors(&self) -> RiskFactorSet {
        let mut factors = RiskFactorSet::new().with(
            RiskCategory::Curve,
            risk_free_key(&self.risk_free, self.currency),
        );
        match &self.structure {
            BondStructure::Callable { .. } => {
                factors.insert(RiskCategory::List, RISK_FACTOR_MEANS);
                factors.insert(RiskCategory::List, RISK_FACTOR_VOLATILITIES);
            }
            other => {
                factors.insert(RiskCategory::Matrix, credit_spreads_key(self.currency));
                factors.insert(RiskCategory::Constant, idiosyncratic_spread_key(&self.id));
                if let BondStructure::Floating {
                    reference_curve, ..
                } = other
                {
                    factors.insert(RiskCategory::Curve, reference_curve.clone());
                }
            }
        }
        factors
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
