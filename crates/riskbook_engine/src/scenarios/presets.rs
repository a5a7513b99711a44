//! Preset stress scenarios.
//!
//! Each preset is a short sequence of [`shift_market_data`] steps applied one
//! after the other:
//!
//! | Preset | Steps |
//! |--------|-------|
//! | Adverse | equity prices −50% relative; rating spreads +75bp; USD risk-free +10bp |
//! | FinancialVulnerability | USDCAD −20% relative; equity prices −5% relative; rating spreads +85bp |

use std::fmt;
use std::str::FromStr;

use riskbook_core::market::{MarketEnvironment, RiskCategory};

use super::error::ScenarioError;
use super::shifts::{shift_market_data, ShiftMode};

/// One step of a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetStep {
    /// Category of the shifted factors
    pub category: RiskCategory,
    /// Key prefix after the category
    pub target: &'static str,
    /// Size of the move
    pub amount: f64,
    /// How the move is applied
    pub mode: ShiftMode,
}

const fn step(category: RiskCategory, target: &'static str, amount: f64, mode: ShiftMode) -> PresetStep {
    PresetStep {
        category,
        target,
        amount,
        mode,
    }
}

const ADVERSE: [PresetStep; 3] = [
    step(RiskCategory::Constant, "MarketPrice", -0.5, ShiftMode::Relative),
    step(RiskCategory::Matrix, "CreditSpreads-Ratings", 0.0075, ShiftMode::Absolute),
    step(RiskCategory::Curve, "RiskFree-Gov-USD", 0.001, ShiftMode::Absolute),
];

const FINANCIAL_VULNERABILITY: [PresetStep; 3] = [
    step(RiskCategory::Constant, "FXRates-USDCAD", -0.2, ShiftMode::Relative),
    step(RiskCategory::Constant, "MarketPrice", -0.05, ShiftMode::Relative),
    step(RiskCategory::Matrix, "CreditSpreads-Ratings", 0.0085, ShiftMode::Absolute),
];

/// Types of preset scenarios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresetScenario {
    /// Equity crash with wider spreads and higher USD rates
    Adverse,
    /// Weaker USD with an equity dip and wider spreads
    FinancialVulnerability,
}

impl PresetScenario {
    /// All presets.
    pub const ALL: [PresetScenario; 2] = [PresetScenario::Adverse, PresetScenario::FinancialVulnerability];

    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            PresetScenario::Adverse => "adverse",
            PresetScenario::FinancialVulnerability => "financial-vulnerability",
        }
    }

    /// Steps in application order.
    pub fn steps(&self) -> &'static [PresetStep] {
        match self {
            PresetScenario::Adverse => &ADVERSE,
            PresetScenario::FinancialVulnerability => &FINANCIAL_VULNERABILITY,
        }
    }

    /// Stressed copy of `env`.
    pub fn apply(&self, env: &MarketEnvironment) -> Result<MarketEnvironment, ScenarioError> {
        let mut stressed = env.with_id(self.name());
        for s in self.steps() {
            stressed = shift_market_data(&stressed, s.category, s.target, s.amount, s.mode)?;
        }
        Ok(stressed.with_id(self.name()))
    }
}

impl fmt::Display for PresetScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PresetScenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetScenario::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScenarioError::UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskbook_core::market::{Curve, Table};
    use riskbook_core::types::Date;
    use riskbook_models::instruments::RISK_FACTOR_VOLATILITIES;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn env() -> MarketEnvironment {
        let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
        env.add_constant("MarketPrice-RY", 80.0);
        env.add_constant("FXRates-USDCAD", 1.3);
        env.add_curve("RiskFree-Gov-USD", Curve::new(vec![1.0], vec![0.015]).unwrap());
        env.add_matrix(
            "CreditSpreads-Ratings-CAD",
            Table::new(labels(&["A"]), labels(&["5"]), vec![vec![0.01]]).unwrap(),
        );
        env.add_list(
            RISK_FACTOR_VOLATILITIES,
            Table::list(
                labels(&[
                    "Constants-MarketPrice-RY",
                    "Constants-FXRates-USDCAD",
                    "Curves-RiskFree-Gov-USD-1",
                    "Matrices-CreditSpreads-Ratings-CAD-A-5",
                ]),
                vec![0.01, 0.005, 0.001, 0.002],
            )
            .unwrap(),
        );
        env
    }

    #[test]
    fn test_adverse() {
        let stressed = PresetScenario::Adverse.apply(&env()).unwrap();
        assert_relative_eq!(stressed.get_constant("MarketPrice-RY").unwrap(), 40.0);
        assert_relative_eq!(stressed.get_constant("FXRates-USDCAD").unwrap(), 1.3);
        assert_relative_eq!(stressed.get_curve("RiskFree-Gov-USD").unwrap().values()[0], 0.016);
        assert_relative_eq!(
            stressed.get_matrix("CreditSpreads-Ratings-CAD").unwrap().get("A", "5").unwrap(),
            0.0175
        );
        assert_eq!(stressed.id(), "adverse");
    }

    #[test]
    fn test_financial_vulnerability() {
        let stressed = PresetScenario::FinancialVulnerability.apply(&env()).unwrap();
        assert_relative_eq!(stressed.get_constant("FXRates-USDCAD").unwrap(), 1.04);
        assert_relative_eq!(stressed.get_constant("MarketPrice-RY").unwrap(), 76.0);
        assert_relative_eq!(stressed.get_curve("RiskFree-Gov-USD").unwrap().values()[0], 0.015);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Adverse".parse::<PresetScenario>().unwrap(), PresetScenario::Adverse);
        assert_eq!(
            "financial-vulnerability".parse::<PresetScenario>().unwrap(),
            PresetScenario::FinancialVulnerability
        );
        assert!("meteor".parse::<PresetScenario>().is_err());
    }
}
