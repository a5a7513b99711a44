//! Value-at-Risk and Expected Shortfall from P&L distributions.

use riskbook_core::market::MarketEnvironment;
use riskbook_core::types::Date;
use serde::Serialize;

use super::error::RiskError;
use crate::parallel::ParallelConfig;
use crate::portfolio::Portfolio;
use crate::scenarios::{HistoricalScenarios, ScenarioTable, ShiftMode};

/// VaR and ES at one tail probability, both as P&L (losses negative).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarResult {
    /// `alpha` quantile of the P&L
    pub var: f64,
    /// Mean P&L strictly below `var`
    pub es: f64,
}

/// VaR and ES of a P&L distribution.
///
/// VaR is the `alpha` quantile, interpolated linearly between order
/// statistics at rank `alpha·(n−1)`. ES is the mean of observations strictly
/// below VaR, or VaR itself when there are none.
///
/// # Examples
/// ```
/// use riskbook_engine::risk::var_from_pnl;
///
/// let pnl: Vec<f64> = (0..=100).map(|i| i as f64 - 50.0).collect();
/// let result = var_from_pnl(&pnl, 0.05).unwrap();
/// assert!((result.var + 45.0).abs() < 1e-12);
/// assert!((result.es + 48.0).abs() < 1e-12);
/// ```
pub fn var_from_pnl(pnl: &[f64], alpha: f64) -> Result<VarResult, RiskError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(RiskError::InvalidAlpha(alpha));
    }
    if pnl.is_empty() {
        return Err(RiskError::EmptyDistribution);
    }
    if let Some(i) = pnl.iter().position(|x| !x.is_finite()) {
        return Err(RiskError::NonFinite(i));
    }

    let mut sorted = pnl.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = alpha * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let var = sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo]);

    let tail = &sorted[..sorted.partition_point(|x| *x < var)];
    let es = if tail.is_empty() {
        var
    } else {
        tail.iter().sum::<f64>() / tail.len() as f64
    };
    Ok(VarResult { var, es })
}

/// Portfolio P&L under each row of `table`, relative to the base value.
pub fn pnl_distribution(
    portfolio: &Portfolio,
    env: &MarketEnvironment,
    table: &ScenarioTable,
    mode: ShiftMode,
    parallel: &ParallelConfig,
) -> Result<Vec<f64>, RiskError> {
    let base = portfolio.value(env)?;
    tracing::info!(
        portfolio = portfolio.id(),
        scenarios = table.len(),
        %mode,
        "generating P&L distribution"
    );
    parallel.try_map_indices(table.len(), |i| {
        let shocked = table.scenario(i).apply(env, mode)?;
        let pnl = portfolio.value(&shocked)? - base;
        tracing::debug!(scenario = %table.labels()[i], pnl, "revalued");
        Ok::<_, RiskError>(pnl)
    })
}

/// Portfolio P&L under each pre-built environment, relative to `env`.
pub fn pnl_from_environments(
    portfolio: &Portfolio,
    env: &MarketEnvironment,
    scenarios: &[MarketEnvironment],
    parallel: &ParallelConfig,
) -> Result<Vec<f64>, RiskError> {
    let base = portfolio.value(env)?;
    tracing::info!(
        portfolio = portfolio.id(),
        scenarios = scenarios.len(),
        "generating P&L distribution from environments"
    );
    parallel.try_map(scenarios, |shocked| Ok::<_, RiskError>(portfolio.value(shocked)? - base))
}

/// VaR of relative scenarios observed over `scenario_horizon` days,
/// rescaled to `var_horizon` days by `√(var_horizon / scenario_horizon)`.
pub fn scenario_var(
    portfolio: &Portfolio,
    env: &MarketEnvironment,
    table: &ScenarioTable,
    scenario_horizon: f64,
    var_horizon: f64,
    alpha: f64,
    parallel: &ParallelConfig,
) -> Result<VarResult, RiskError> {
    for horizon in [scenario_horizon, var_horizon] {
        if !(horizon.is_finite() && horizon > 0.0) {
            return Err(RiskError::InvalidHorizon(horizon));
        }
    }
    let scaled;
    let table = if scenario_horizon != var_horizon {
        scaled = table.scaled((var_horizon / scenario_horizon).sqrt());
        &scaled
    } else {
        table
    };
    let pnl = pnl_distribution(portfolio, env, table, ShiftMode::Relative, parallel)?;
    let result = var_from_pnl(&pnl, alpha)?;
    tracing::info!(portfolio = portfolio.id(), alpha, var = result.var, es = result.es, "scenario VaR");
    Ok(result)
}

/// Number of P&L observations strictly below `var`.
pub fn count_breaches(pnl: &[f64], var: f64) -> usize {
    pnl.iter().filter(|x| **x < var).count()
}

/// Back-tests `var` against the last `days` historical scenarios on or
/// before `end`, returning the breach count.
pub fn backtest_var(
    portfolio: &Portfolio,
    env: &MarketEnvironment,
    history: &HistoricalScenarios,
    var: f64,
    days: usize,
    end: Date,
    parallel: &ParallelConfig,
) -> Result<usize, RiskError> {
    let window = history.last_n(end, days);
    if window.len() < days {
        tracing::warn!(requested = days, available = window.len(), %end, "short back-test window");
    }
    let pnl = pnl_distribution(portfolio, env, &window, ShiftMode::Relative, parallel)?;
    let breaches = count_breaches(&pnl, var);
    tracing::info!(portfolio = portfolio.id(), days = window.len(), breaches, "VaR back-test");
    Ok(breaches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskbook_core::market::RiskFactorKey;
    use riskbook_core::types::Currency;
    use riskbook_models::instruments::Stock;

    #[test]
    fn test_interpolated_percentile() {
        let result = var_from_pnl(&[4.0, 1.0, 3.0, 2.0], 0.5).unwrap();
        assert_relative_eq!(result.var, 2.5);
        assert_relative_eq!(result.es, 1.5);
    }

    #[test]
    fn test_es_equals_var_when_tail_empty() {
        let result = var_from_pnl(&[-3.0, 1.0, 2.0], 0.0).unwrap();
        assert_eq!(result.var, -3.0);
        assert_eq!(result.es, -3.0);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert_eq!(var_from_pnl(&[], 0.01), Err(RiskError::EmptyDistribution));
        assert_eq!(var_from_pnl(&[1.0], -0.1), Err(RiskError::InvalidAlpha(-0.1)));
        assert_eq!(var_from_pnl(&[1.0, f64::NAN], 0.1), Err(RiskError::NonFinite(1)));
    }

    fn stock_book() -> (Portfolio, MarketEnvironment) {
        let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
        env.add_constant("MarketPrice-RY", 100.0);
        let mut book = Portfolio::new("book", Currency::CAD);
        book.add_product(Stock::new("RY", Currency::CAD), 10.0);
        (book, env)
    }

    fn returns_table(returns: &[f64]) -> ScenarioTable {
        ScenarioTable::new(
            vec![RiskFactorKey::constant("MarketPrice-RY")],
            returns.iter().map(|r| vec![*r]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_pnl_distribution_relative() {
        let (book, env) = stock_book();
        let table = returns_table(&[-0.1, 0.0, 0.05]);
        let pnl = pnl_distribution(&book, &env, &table, ShiftMode::Relative, &ParallelConfig::sequential()).unwrap();
        assert_relative_eq!(pnl[0], -100.0, epsilon = 1e-9);
        assert_relative_eq!(pnl[1], 0.0);
        assert_relative_eq!(pnl[2], 50.0, epsilon = 1e-9);

        let envs = table.environments(&env, ShiftMode::Relative, &ParallelConfig::sequential()).unwrap();
        let from_envs = pnl_from_environments(&book, &env, &envs, &ParallelConfig::sequential()).unwrap();
        assert_eq!(pnl, from_envs);
    }

    #[test]
    fn test_scenario_var_scales_by_root_horizon() {
        let (book, env) = stock_book();
        let table = returns_table(&[-0.01, 0.0, 0.01]);
        let one_day = scenario_var(&book, &env, &table, 1.0, 1.0, 0.0, &ParallelConfig::sequential()).unwrap();
        let ten_day = scenario_var(&book, &env, &table, 1.0, 10.0, 0.0, &ParallelConfig::sequential()).unwrap();
        assert_relative_eq!(one_day.var, -10.0, epsilon = 1e-9);
        assert_relative_eq!(ten_day.var, -10.0 * 10f64.sqrt(), epsilon = 1e-9);
        assert_eq!(
            scenario_var(&book, &env, &table, 0.0, 10.0, 0.01, &ParallelConfig::sequential()),
            Err(RiskError::InvalidHorizon(0.0))
        );
    }

    #[test]
    fn test_backtest_counts_strict_breaches() {
        let (book, env) = stock_book();
        let dates = (1..=4).map(|d| Date::from_ymd(2017, 5, d).unwrap()).collect();
        let history = HistoricalScenarios::new(
            vec![RiskFactorKey::constant("MarketPrice-RY")],
            dates,
            vec![vec![-0.02], vec![-0.01], vec![0.03], vec![-0.05]],
        )
        .unwrap();
        let end = Date::from_ymd(2017, 5, 31).unwrap();
        let breaches = backtest_var(&book, &env, &history, -15.0, 3, end, &ParallelConfig::sequential()).unwrap();
        // last three days: -10, +30, -50
        assert_eq!(breaches, 1);
        assert_eq!(count_breaches(&[-1.0, -2.0, 0.5], -1.0), 1);
    }
}
