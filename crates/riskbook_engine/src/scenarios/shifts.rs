//! Scenario definitions and application to a market environment.

use std::fmt;

use riskbook_core::market::{MarketEnvironment, RiskCategory, RiskFactorKey};
use serde::{Deserialize, Serialize};

use super::error::ScenarioError;
use riskbook_models::instruments::RISK_FACTOR_VOLATILITIES;

/// How a scenario delta moves a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShiftMode {
    /// `value + delta`
    #[default]
    Absolute,
    /// `value * (1 + delta)`
    Relative,
}

impl ShiftMode {
    /// Shifted value.
    #[inline]
    pub fn apply(self, value: f64, delta: f64) -> f64 {
        match self {
            ShiftMode::Absolute => value + delta,
            ShiftMode::Relative => value * (1.0 + delta),
        }
    }
}

impl fmt::Display for ShiftMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftMode::Absolute => f.write_str("absolute"),
            ShiftMode::Relative => f.write_str("relative"),
        }
    }
}

/// A named list of factor moves.
///
/// Deltas are applied in order, each to the value left by the previous one,
/// so a key listed twice moves twice.
///
/// # Examples
/// ```
/// use riskbook_core::market::{Curve, MarketEnvironment, RiskFactorKey};
/// use riskbook_core::types::Date;
/// use riskbook_engine::scenarios::{Scenario, ShiftMode};
///
/// let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
/// env.add_curve("RiskFree-Gov-USD", Curve::new(vec![0.25, 1.0], vec![0.01, 0.015]).unwrap());
///
/// let key: RiskFactorKey = "Curves-RiskFree-Gov-USD-0.25".parse().unwrap();
/// let up = Scenario::new("short end +10bp").with_shift(key.clone(), 0.001);
///
/// let shocked = up.apply(&env, ShiftMode::Absolute).unwrap();
/// assert!((shocked.get_value(&key).unwrap() - 0.011).abs() < 1e-15);
/// assert_eq!(env.get_value(&key).unwrap(), 0.01);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Label carried into the shocked environment's ID
    pub name: String,
    /// Factor moves in application order
    pub shifts: Vec<(RiskFactorKey, f64)>,
}

impl Scenario {
    /// Scenario with no moves.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shifts: Vec::new(),
        }
    }

    /// Appends a move.
    pub fn with_shift(mut self, key: RiskFactorKey, delta: f64) -> Self {
        self.shifts.push((key, delta));
        self
    }

    /// Scenario from parallel key and delta sequences.
    pub fn from_pairs(name: impl Into<String>, keys: &[RiskFactorKey], deltas: &[f64]) -> Self {
        Self {
            name: name.into(),
            shifts: keys.iter().cloned().zip(deltas.iter().copied()).collect(),
        }
    }

    /// Number of moves.
    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    /// True when the scenario moves nothing.
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Same keys with every delta negated, in reverse order.
    ///
    /// Applying a scenario and then its negation in absolute mode restores
    /// the original values up to rounding.
    pub fn negated(&self) -> Self {
        Self {
            name: format!("-{}", self.name),
            shifts: self.shifts.iter().rev().map(|(k, d)| (k.clone(), -d)).collect(),
        }
    }

    /// Same keys with every delta multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            name: self.name.clone(),
            shifts: self.shifts.iter().map(|(k, d)| (k.clone(), d * factor)).collect(),
        }
    }

    /// New environment with every move applied.
    ///
    /// `env` is left untouched; the result shares every entry the scenario
    /// does not move. A key missing from `env` is an error.
    pub fn apply(&self, env: &MarketEnvironment, mode: ShiftMode) -> Result<MarketEnvironment, ScenarioError> {
        let mut shocked = env.with_id(self.name.as_str());
        for (key, delta) in &self.shifts {
            let current = shocked.get_value(key)?;
            shocked.set_value(key, mode.apply(current, *delta))?;
        }
        tracing::trace!(scenario = %self.name, moves = self.shifts.len(), %mode, "applied scenario");
        Ok(shocked)
    }
}

/// Keys listed in `RiskFactorVolatilities` whose legacy form starts with
/// `{Category}-{target}`.
pub fn matching_factors(
    env: &MarketEnvironment,
    category: RiskCategory,
    target: &str,
) -> Result<Vec<RiskFactorKey>, ScenarioError> {
    let prefix = format!("{}-{}", category.prefix(), target);
    let volatilities = env.get_list(RISK_FACTOR_VOLATILITIES)?;
    volatilities
        .column_labels()
        .iter()
        .filter(|label| label.starts_with(&prefix))
        .map(|label| label.parse::<RiskFactorKey>().map_err(ScenarioError::from))
        .collect()
}

/// Moves every simulated factor of `category` whose key starts with
/// `{Category}-{target}` by `amount`.
///
/// The candidate factors are the columns of `RiskFactorVolatilities`, the
/// same universe the simulation engine draws. Nothing matching leaves the
/// environment unchanged.
///
/// # Examples
/// ```
/// use riskbook_core::market::{MarketEnvironment, RiskCategory, Table};
/// use riskbook_core::types::Date;
/// use riskbook_engine::scenarios::{shift_market_data, ShiftMode};
///
/// let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
/// env.add_constant("MarketPrice-RY", 80.0);
/// env.add_constant("MarketPrice-TD", 60.0);
/// env.add_constant("FXRates-USDCAD", 1.3);
/// env.add_list(
///     "RiskFactorVolatilities",
///     Table::list(
///         vec!["Constants-MarketPrice-RY".into(), "Constants-MarketPrice-TD".into(), "Constants-FXRates-USDCAD".into()],
///         vec![0.01, 0.012, 0.005],
///     )
///     .unwrap(),
/// );
///
/// let crash = shift_market_data(&env, RiskCategory::Constant, "MarketPrice", -0.5, ShiftMode::Relative).unwrap();
/// assert_eq!(crash.get_constant("MarketPrice-RY").unwrap(), 40.0);
/// assert_eq!(crash.get_constant("MarketPrice-TD").unwrap(), 30.0);
/// assert_eq!(crash.get_constant("FXRates-USDCAD").unwrap(), 1.3);
/// ```
pub fn shift_market_data(
    env: &MarketEnvironment,
    category: RiskCategory,
    target: &str,
    amount: f64,
    mode: ShiftMode,
) -> Result<MarketEnvironment, ScenarioError> {
    let keys = matching_factors(env, category, target)?;
    if keys.is_empty() {
        tracing::debug!(%category, shift_target = target, "no simulated factors match shift");
    }
    let name = format!("{}-{} {:+} {}", category.prefix(), target, amount, mode);
    let scenario = Scenario {
        name,
        shifts: keys.into_iter().map(|k| (k, amount)).collect(),
    };
    scenario.apply(env, mode)
}

/// [`shift_market_data`] on curves.
pub fn shift_curve(
    env: &MarketEnvironment,
    target: &str,
    amount: f64,
    mode: ShiftMode,
) -> Result<MarketEnvironment, ScenarioError> {
    shift_market_data(env, RiskCategory::Curve, target, amount, mode)
}

/// [`shift_market_data`] on lists.
pub fn shift_list(
    env: &MarketEnvironment,
    target: &str,
    amount: f64,
    mode: ShiftMode,
) -> Result<MarketEnvironment, ScenarioError> {
    shift_market_data(env, RiskCategory::List, target, amount, mode)
}

/// [`shift_market_data`] on surfaces.
pub fn shift_surface(
    env: &MarketEnvironment,
    target: &str,
    amount: f64,
    mode: ShiftMode,
) -> Result<MarketEnvironment, ScenarioError> {
    shift_market_data(env, RiskCategory::Surface, target, amount, mode)
}

/// [`shift_market_data`] on matrices.
pub fn shift_matrix(
    env: &MarketEnvironment,
    target: &str,
    amount: f64,
    mode: ShiftMode,
) -> Result<MarketEnvironment, ScenarioError> {
    shift_market_data(env, RiskCategory::Matrix, target, amount, mode)
}

/// [`shift_market_data`] on constants.
pub fn shift_constant(
    env: &MarketEnvironment,
    target: &str,
    amount: f64,
    mode: ShiftMode,
) -> Result<MarketEnvironment, ScenarioError> {
    shift_market_data(env, RiskCategory::Constant, target, amount, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskbook_core::market::{Curve, MarketDataError, Table};
    use riskbook_core::types::Date;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn env() -> MarketEnvironment {
        let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
        env.add_curve(
            "RiskFree-Gov-USD",
            Curve::new(vec![0.25, 1.0, 10.0], vec![0.01, 0.012, 0.02]).unwrap(),
        );
        env.add_curve("RiskFree-Gov-CAD", Curve::new(vec![0.25, 1.0], vec![0.008, 0.01]).unwrap());
        env.add_matrix(
            "CreditSpreads-Ratings-USD",
            Table::new(labels(&["A", "BBB-"]), labels(&["1", "5"]), vec![vec![0.005, 0.007], vec![0.01, 0.014]])
                .unwrap(),
        );
        env.add_constant("MarketPrice-RY", 80.0);
        env.add_list(
            RISK_FACTOR_VOLATILITIES,
            Table::list(
                labels(&[
                    "Curves-RiskFree-Gov-USD-0.25",
                    "Curves-RiskFree-Gov-USD-10",
                    "Curves-RiskFree-Gov-CAD-0.25",
                    "Matrices-CreditSpreads-Ratings-USD-BBB--5",
                    "Constants-MarketPrice-RY",
                ]),
                vec![0.001, 0.001, 0.001, 0.002, 0.015],
            )
            .unwrap(),
        );
        env
    }

    #[test]
    fn test_relative_shift() {
        let key = RiskFactorKey::constant("MarketPrice-RY");
        let env = Scenario::new("s")
            .with_shift(key.clone(), 0.1)
            .apply(&env(), ShiftMode::Relative)
            .unwrap();
        assert_relative_eq!(env.get_value(&key).unwrap(), 88.0);
        assert_eq!(env.id(), "s");
    }

    #[test]
    fn test_repeated_key_compounds() {
        let key = RiskFactorKey::constant("MarketPrice-RY");
        let env = Scenario::new("twice")
            .with_shift(key.clone(), 0.1)
            .with_shift(key.clone(), 0.1)
            .apply(&env(), ShiftMode::Relative)
            .unwrap();
        assert_relative_eq!(env.get_value(&key).unwrap(), 96.8);
    }

    #[test]
    fn test_missing_factor_fails() {
        let err = Scenario::new("s")
            .with_shift(RiskFactorKey::constant("MarketPrice-TD"), 0.1)
            .apply(&env(), ShiftMode::Absolute)
            .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::MarketData(MarketDataError::MissingRiskFactor { .. })
        ));
    }

    #[test]
    fn test_unshifted_entries_stay_shared() {
        let base = env();
        let shocked = shift_curve(&base, "RiskFree-Gov-USD", 0.0001, ShiftMode::Absolute).unwrap();
        assert!(!shocked.shares_data_with(&base));
        assert_eq!(
            shocked.get_curve("RiskFree-Gov-CAD").unwrap(),
            base.get_curve("RiskFree-Gov-CAD").unwrap()
        );
    }

    #[test]
    fn test_curve_shift_touches_only_listed_pillars() {
        let shocked = shift_curve(&env(), "RiskFree-Gov-USD", 0.0001, ShiftMode::Absolute).unwrap();
        let curve = shocked.get_curve("RiskFree-Gov-USD").unwrap();
        assert_relative_eq!(curve.values()[0], 0.0101);
        assert_relative_eq!(curve.values()[1], 0.012);
        assert_relative_eq!(curve.values()[2], 0.0201);
        let cad = shocked.get_curve("RiskFree-Gov-CAD").unwrap();
        assert_relative_eq!(cad.values()[0], 0.008);
    }

    #[test]
    fn test_matrix_shift_with_notched_row() {
        let shocked = shift_matrix(&env(), "CreditSpreads-Ratings", 0.0075, ShiftMode::Absolute).unwrap();
        let m = shocked.get_matrix("CreditSpreads-Ratings-USD").unwrap();
        assert_relative_eq!(m.get("BBB-", "5").unwrap(), 0.0215);
        assert_relative_eq!(m.get("A", "5").unwrap(), 0.007);
    }

    #[test]
    fn test_negated_round_trip() {
        let base = env();
        let s = Scenario::new("s")
            .with_shift("Curves-RiskFree-Gov-USD-10".parse().unwrap(), 0.0025)
            .with_shift(RiskFactorKey::constant("MarketPrice-RY"), -3.0);
        let back = s
            .negated()
            .apply(&s.apply(&base, ShiftMode::Absolute).unwrap(), ShiftMode::Absolute)
            .unwrap();
        for key in base.factor_keys() {
            assert_relative_eq!(back.get_value(&key).unwrap(), base.get_value(&key).unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_no_match_is_identity() {
        let base = env();
        let same = shift_surface(&base, "ImpliedVols", 0.01, ShiftMode::Absolute).unwrap();
        assert!(same.shares_data_with(&base));
    }
}
