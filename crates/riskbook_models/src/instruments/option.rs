//! Equity options on a [`Stock`] underlying.

use riskbook_core::market::{MarketDataError, MarketEnvironment, RiskCategory, Table};
use riskbook_core::math::interpolators::BilinearInterpolator;
use riskbook_core::types::{Currency, Date};
use serde::{Deserialize, Serialize};

use super::error::{InstrumentError, PricingError};
use super::inputs::{market_price_key, risk_free_key, DEFAULT_RISK_FREE};
use super::stock::Stock;
use super::traits::{AssetClass, Priceable, RiskFactorSet};
use crate::analytical::binomial::DEFAULT_STEPS;
use crate::analytical::{BinomialTree, BlackScholes, ExerciseStyle, OptionType};

/// `DividendYields-{underlying}`.
pub fn dividend_yield_key(underlying: &str) -> String {
    format!("DividendYields-{}", underlying)
}

/// `ImpliedVols-{ccy}-{underlying}`.
pub fn implied_vol_key(currency: Currency, underlying: &str) -> String {
    format!("ImpliedVols-{}-{}", currency, underlying)
}

fn default_risk_free() -> String {
    DEFAULT_RISK_FREE.to_string()
}

/// Inputs resolved from the market for one valuation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionInputs {
    /// Underlying price
    pub spot: f64,
    /// Risk-free rate at the short end of the curve
    pub rate: f64,
    /// Continuous dividend yield
    pub dividend: f64,
    /// Implied volatility at (expiry, moneyness)
    pub volatility: f64,
    /// Years to expiry, actual/365
    pub expiry: f64,
}

/// A vanilla call or put on one share.
///
/// Volatility is read off the surface `ImpliedVols-{ccy}-{und}`, whose rows
/// are expiries in years and whose columns are moneyness `K/S`.
///
/// # Examples
/// ```
/// use riskbook_core::market::{Curve, MarketEnvironment, Table};
/// use riskbook_core::types::{Currency, Date};
/// use riskbook_models::analytical::OptionType;
/// use riskbook_models::instruments::{EquityOption, Priceable, Stock};
///
/// let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
/// env.add_constant("MarketPrice-RY", 100.0);
/// env.add_constant("DividendYields-RY", 0.0);
/// env.add_curve("RiskFree-Gov-CAD", Curve::flat(0.02));
/// env.add_surface(
///     "ImpliedVols-CAD-RY",
///     Table::new(
///         vec!["0.5".into(), "2".into()],
///         vec!["0.8".into(), "1.2".into()],
///         vec![vec![0.2, 0.2], vec![0.2, 0.2]],
///     )
///     .unwrap(),
/// );
///
/// let underlying = Stock::new("RY", Currency::CAD);
/// let expiry = Date::from_ymd(2018, 6, 1).unwrap();
/// let call = EquityOption::new("RY-C100", underlying, expiry, 100.0, OptionType::Call);
///
/// let value = call.value(&env).unwrap();
/// assert!(value > 8.0 && value < 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityOption {
    /// Identifier
    pub id: String,
    /// Settlement currency; the surface is looked up in this currency
    pub currency: Currency,
    /// Trade date
    #[serde(default)]
    pub start_date: Option<Date>,
    /// Expiry date
    pub expiration_date: Date,
    /// Underlying share
    pub underlying: Stock,
    /// Strike price
    pub strike: f64,
    /// Call or put
    pub option_type: OptionType,
    /// European or American exercise
    #[serde(default)]
    pub exercise: ExerciseStyle,
    /// Risk-free curve family
    #[serde(default = "default_risk_free")]
    pub risk_free: String,
    /// Country of listing
    #[serde(default)]
    pub country: Option<String>,
}

impl EquityOption {
    /// European option settled in the underlying's currency.
    pub fn new(
        id: impl Into<String>,
        underlying: Stock,
        expiration_date: Date,
        strike: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            id: id.into(),
            currency: underlying.currency,
            start_date: None,
            expiration_date,
            underlying,
            strike,
            option_type,
            exercise: ExerciseStyle::European,
            risk_free: default_risk_free(),
            country: None,
        }
    }

    /// Switches the exercise style.
    pub fn with_exercise(mut self, exercise: ExerciseStyle) -> Self {
        self.exercise = exercise;
        self
    }

    /// Reads spot, rate, dividend yield and volatility from `env`.
    pub fn inputs(&self, env: &MarketEnvironment) -> Result<OptionInputs, InstrumentError> {
        let spot = self.underlying.spot(env)?;
        let rate = env
            .get_curve(&risk_free_key(&self.risk_free, self.currency))?
            .first_value();
        let dividend = env.get_constant(&dividend_yield_key(&self.underlying.id))?;
        let expiry = env.valuation_date().days_until(self.expiration_date) as f64 / 365.0;

        let surface_key = implied_vol_key(self.currency, &self.underlying.id);
        let surface = env.get_surface(&surface_key)?;
        let moneyness = if spot > 0.0 { self.strike / spot } else { 1.0 };
        let volatility = surface_volatility(surface, expiry, moneyness)?;

        Ok(OptionInputs {
            spot,
            rate,
            dividend,
            volatility,
            expiry,
        })
    }

    fn price(&self, env: &MarketEnvironment) -> Result<(f64, f64), InstrumentError> {
        let inputs = self.inputs(env)?;
        if inputs.expiry <= 0.0 {
            return Ok((
                self.option_type.intrinsic(inputs.spot, self.strike),
                expired_delta(self.option_type, inputs.spot, self.strike),
            ));
        }
        match self.exercise {
            ExerciseStyle::European => {
                let model =
                    BlackScholes::new(inputs.spot, inputs.rate, inputs.dividend, inputs.volatility)?;
                Ok((
                    model.price(self.option_type, self.strike, inputs.expiry),
                    model.delta(self.option_type, self.strike, inputs.expiry),
                ))
            }
            ExerciseStyle::American => {
                let result = BinomialTree::new(DEFAULT_STEPS, ExerciseStyle::American)?.price(
                    self.option_type,
                    inputs.spot,
                    self.strike,
                    inputs.rate,
                    inputs.dividend,
                    inputs.volatility,
                    inputs.expiry,
                )?;
                Ok((result.value, result.delta))
            }
        }
    }
}

fn expired_delta(kind: OptionType, spot: f64, strike: f64) -> f64 {
    match kind {
        OptionType::Call if spot > strike => 1.0,
        OptionType::Put if spot < strike => -1.0,
        _ => 0.0,
    }
}

fn surface_volatility(surface: &Table, expiry: f64, moneyness: f64) -> Result<f64, MarketDataError> {
    let expiries = surface.numeric_rows()?;
    let strikes = surface.numeric_columns()?;
    let grid: Vec<Vec<f64>> = (0..surface.n_rows())
        .map(|i| surface.row_at(i).to_vec())
        .collect();
    let interpolator = BilinearInterpolator::new(&expiries, &strikes, grid)?;
    Ok(interpolator.interpolate(expiry, moneyness))
}

impl Priceable for EquityOption {
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
        Some(self.expiration_date)
    }

    fn value(&self, env: &MarketEnvironment) -> Result<f64, PricingError> {
        self.price(env)
            .map(|(value, _)| value)
            .map_err(|e| PricingError::new(&self.id, e))
    }

    /// Delta-equivalent position in the underlying.
    fn exposure(&self, env: &MarketEnvironment) -> Result<f64, PricingError> {
        let spot = self
            .underlying
            .spot(env)
            .map_err(|e| PricingError::new(&self.id, e))?;
        self.price(env)
            .map(|(_, delta)| delta * spot)
            .map_err(|e| PricingError::new(&self.id, e))
    }

    fn market_risk_factors(&self) -> RiskFactorSet {
        RiskFactorSet::new()
            .with(RiskCategory::Curve, risk_free_key(&self.risk_free, self.currency))
            .with(RiskCategory::Constant, market_price_key(&self.underlying.id))
            .with(RiskCategory::Constant, dividend_yield_key(&self.underlying.id))
            .with(
                RiskCategory::Surface,
                implied_vol_key(self.currency, &self.underlying.id),
            )
    }
}
