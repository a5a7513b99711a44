//! Bump-and-revalue sensitivities.

use riskbook_core::market::{MarketEnvironment, RiskFactorKey};
use riskbook_models::instruments::RISK_FACTOR_VOLATILITIES;
use serde::Serialize;

use super::error::ScenarioError;
use super::shifts::{shift_curve, Scenario, ShiftMode};
use crate::parallel::ParallelConfig;
use crate::portfolio::Portfolio;

/// One basis point.
pub const BASIS_POINT: f64 = 1e-4;

/// Absolute bump for a factor: 0.01 for equity prices, 1bp otherwise.
pub fn bump_size(key: &RiskFactorKey) -> f64 {
    match key {
        RiskFactorKey::Constant { name } if name.starts_with("MarketPrice") => 0.01,
        _ => BASIS_POINT,
    }
}

/// Portfolio value change for one bumped factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensitivity {
    /// Bumped factor
    pub key: RiskFactorKey,
    /// Absolute bump applied
    pub bump: f64,
    /// Bumped value minus base value, in the portfolio currency
    pub pnl: f64,
}

/// Value change of `portfolio` for a bump of each simulated factor.
///
/// The factors are the columns of `RiskFactorVolatilities`, each bumped
/// alone by [`bump_size`].
pub fn sensitivities(
    portfolio: &Portfolio,
    env: &MarketEnvironment,
    parallel: &ParallelConfig,
) -> Result<Vec<Sensitivity>, ScenarioError> {
    let keys = env
        .get_list(RISK_FACTOR_VOLATILITIES)?
        .column_labels()
        .iter()
        .map(|label| label.parse::<RiskFactorKey>())
        .collect::<Result<Vec<_>, _>>()?;
    let base = portfolio.value(env)?;
    tracing::info!(factors = keys.len(), "computing bump sensitivities");

    parallel.try_map(&keys, |key| {
        let bump = bump_size(key);
        let bumped = Scenario::new(key.to_string())
            .with_shift(key.clone(), bump)
            .apply(env, ShiftMode::Absolute)?;
        Ok(Sensitivity {
            key: key.clone(),
            bump,
            pnl: portfolio.value(&bumped)? - base,
        })
    })
}

/// Rate sensitivity of a fixed-income book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateSensitivity {
    /// Average absolute value change for a ±1bp parallel move
    pub dv01: f64,
    /// Second difference of value over (1bp)²
    pub convexity: f64,
}

/// DV01 and convexity for ±1bp on every simulated `RiskFree-Gov` pillar.
///
/// # Examples
/// ```
/// use riskbook_core::market::{Curve, MarketEnvironment, Table};
/// use riskbook_core::types::{Currency, Date};
/// use riskbook_engine::portfolio::Portfolio;
/// use riskbook_engine::scenarios::dv01_convexity;
/// use riskbook_models::instruments::Bond;
///
/// let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
/// env.add_curve("RiskFree-Gov-CAD", Curve::new(vec![1.0, 10.0], vec![0.02, 0.02]).unwrap());
/// env.add_constant("IdiosyncraticSpread-Z", 0.0);
/// env.add_list(
///     "RiskFactorVolatilities",
///     Table::list(vec!["Curves-RiskFree-Gov-CAD-1".into(), "Curves-RiskFree-Gov-CAD-10".into()], vec![0.001, 0.001])
///         .unwrap(),
/// );
///
/// let zero = Bond::zero("Z", Currency::CAD, Date::from_ymd(2015, 1, 1).unwrap(), Date::from_ymd(2027, 6, 1).unwrap())
///     .with_rating("AAA");
/// let mut book = Portfolio::new("fi", Currency::CAD);
/// book.add_product(zero, 1.0);
///
/// let risk = dv01_convexity(&book, &env).unwrap();
/// assert!(risk.dv01 > 0.0);
/// assert!(risk.convexity > 0.0);
/// ```
pub fn dv01_convexity(portfolio: &Portfolio, env: &MarketEnvironment) -> Result<RateSensitivity, ScenarioError> {
    let up = shift_curve(env, "RiskFree-Gov", BASIS_POINT, ShiftMode::Absolute)?;
    let down = shift_curve(env, "RiskFree-Gov", -BASIS_POINT, ShiftMode::Absolute)?;

    let base = portfolio.value(env)?;
    let v_up = portfolio.value(&up)?;
    let v_down = portfolio.value(&down)?;

    Ok(RateSensitivity {
        dv01: ((v_up - base).abs() + (base - v_down).abs()) / 2.0,
        convexity: (v_up - 2.0 * base + v_down) / (BASIS_POINT * BASIS_POINT),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskbook_core::market::Table;
    use riskbook_core::types::{Currency, Date};
    use riskbook_models::instruments::Stock;

    #[test]
    fn test_bump_sizes() {
        assert_eq!(bump_size(&RiskFactorKey::constant("MarketPrice-RY")), 0.01);
        assert_eq!(bump_size(&RiskFactorKey::constant("FXRates-USDCAD")), 1e-4);
        assert_eq!(bump_size(&RiskFactorKey::curve("RiskFree-Gov-CAD", 1.0)), 1e-4);
        assert_eq!(bump_size(&RiskFactorKey::surface("ImpliedVols-CAD-RY", "1", "1")), 1e-4);
    }

    #[test]
    fn test_stock_and_fx_sensitivities() {
        let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
        env.add_constant("MarketPrice-AAPL", 150.0);
        env.add_constant("FXRates-USDCAD", 1.25);
        env.add_list(
            RISK_FACTOR_VOLATILITIES,
            Table::list(
                vec!["Constants-MarketPrice-AAPL".into(), "Constants-FXRates-USDCAD".into()],
                vec![0.01, 0.005],
            )
            .unwrap(),
        );
        let mut book = Portfolio::new("book", Currency::CAD);
        book.add_product(Stock::new("AAPL", Currency::USD), 100.0);

        let result = sensitivities(&book, &env, &ParallelConfig::sequential()).unwrap();
        assert_eq!(result.len(), 2);
        assert_relative_eq!(result[0].pnl, 100.0 * 0.01 * 1.25, epsilon = 1e-9);
        assert_relative_eq!(result[1].pnl, 100.0 * 150.0 * 1e-4, epsilon = 1e-9);
    }
}
