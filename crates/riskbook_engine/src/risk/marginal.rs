//! Marginal VaR and additive risk contributions.
//!
//! For buckets with P&L covariance `Q` and weights `w`, the marginal VaR of
//! bucket `i` is `(Q·w)_i / (wᵀ·Q·w) × VaR` and its risk contribution is
//! `w_i` times that. The contributions sum to the VaR of the summed
//! distribution for any weights.

use riskbook_core::market::MarketEnvironment;
use riskbook_core::math::linalg::SquareMatrix;
use riskbook_models::instruments::Priceable;
use serde::Serialize;

use super::error::RiskError;
use super::var::var_from_pnl;
use crate::parallel::ParallelConfig;
use crate::portfolio::{value_as_of_maturity, Portfolio, PortfolioError};
use crate::scenarios::{ScenarioTable, ShiftMode};

/// One sub-portfolio's P&L distribution and its weight in the total.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// Bucket name
    pub name: String,
    /// Weight in the total portfolio
    pub weight: f64,
    /// P&L per scenario, in a scenario order shared by all buckets
    pub pnl: Vec<f64>,
}

impl Bucket {
    /// Creates a bucket.
    pub fn new(name: impl Into<String>, weight: f64, pnl: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            weight,
            pnl,
        }
    }
}

/// Marginal VaR and risk contribution of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    /// Bucket name
    pub name: String,
    /// Weight used
    pub weight: f64,
    /// Marginal VaR
    pub marginal_var: f64,
    /// `weight × marginal_var`
    pub risk_contribution: f64,
}

/// Decomposition of a total VaR over buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginalVar {
    /// VaR of the summed distribution
    pub var: f64,
    /// Per-bucket figures, in input order
    pub contributions: Vec<Contribution>,
}

impl MarginalVar {
    /// Sum of risk contributions; equals `var` up to rounding.
    pub fn total_contribution(&self) -> f64 {
        self.contributions.iter().map(|c| c.risk_contribution).sum()
    }

    /// Contribution of the named bucket.
    pub fn get(&self, name: &str) -> Option<&Contribution> {
        self.contributions.iter().find(|c| c.name == name)
    }
}

/// Decomposes the VaR at `alpha` of the summed bucket distributions.
///
/// # Examples
/// ```
/// use riskbook_engine::risk::{marginal_var, Bucket};
///
/// let buckets = vec![
///     Bucket::new("equity", 0.6, vec![-5.0, 1.0, 2.0, -1.0, 3.0]),
///     Bucket::new("rates", 0.4, vec![1.0, -2.0, 0.5, -0.5, 1.0]),
/// ];
/// let mvar = marginal_var(&buckets, 0.2).unwrap();
/// assert!((mvar.total_contribution() - mvar.var).abs() < 1e-9);
/// ```
pub fn marginal_var(buckets: &[Bucket], alpha: f64) -> Result<MarginalVar, RiskError> {
    let first = buckets.first().ok_or(RiskError::EmptyDistribution)?;
    let n = first.pnl.len();
    for bucket in buckets {
        if bucket.pnl.len() != n {
            return Err(RiskError::BucketLength {
                bucket: bucket.name.clone(),
                expected: n,
                got: bucket.pnl.len(),
            });
        }
    }
    if n < 2 {
        return Err(RiskError::TooFewScenarios(n));
    }

    let total: Vec<f64> = (0..n).map(|s| buckets.iter().map(|b| b.pnl[s]).sum()).collect();
    let var = var_from_pnl(&total, alpha)?.var;

    let q = covariance(buckets)?;
    let weights: Vec<f64> = buckets.iter().map(|b| b.weight).collect();
    let qw = q.mul_vec(&weights);
    let variance = q.quadratic_form(&weights);
    if variance == 0.0 || !variance.is_finite() {
        return Err(RiskError::ZeroVariance);
    }

    let contributions = buckets
        .iter()
        .zip(&qw)
        .map(|(bucket, qw_i)| {
            let marginal_var = qw_i / variance * var;
            Contribution {
                name: bucket.name.clone(),
                weight: bucket.weight,
                marginal_var,
                risk_contribution: bucket.weight * marginal_var,
            }
        })
        .collect();
    Ok(MarginalVar { var, contributions })
}

/// Sample covariance (divisor `n − 1`) of the bucket distributions.
fn covariance(buckets: &[Bucket]) -> Result<SquareMatrix, RiskError> {
    let m = buckets.len();
    let n = buckets[0].pnl.len() as f64;
    let means: Vec<f64> = buckets.iter().map(|b| b.pnl.iter().sum::<f64>() / n).collect();

    let mut data = vec![0.0; m * m];
    for i in 0..m {
        for j in i..m {
            let c = buckets[i]
                .pnl
                .iter()
                .zip(&buckets[j].pnl)
                .map(|(x, y)| (x - means[i]) * (y - means[j]))
                .sum::<f64>()
                / (n - 1.0);
            data[i * m + j] = c;
            data[j * m + i] = c;
        }
    }
    Ok(SquareMatrix::new(data, m)?)
}

/// Marginal VaR with one bucket per flat position.
///
/// Weights are position values over the portfolio value, both in the
/// portfolio currency at `env`. Bucket P&L is the change in position value,
/// FX included, under each scenario.
pub fn marginal_var_from_portfolio(
    portfolio: &Portfolio,
    env: &MarketEnvironment,
    table: &ScenarioTable,
    mode: ShiftMode,
    alpha: f64,
    parallel: &ParallelConfig,
) -> Result<MarginalVar, RiskError> {
    let positions = portfolio.flat_positions();
    let position_value = |env: &MarketEnvironment| -> Result<Vec<f64>, PortfolioError> {
        positions
            .iter()
            .map(|(product, units)| {
                let value = value_as_of_maturity(product, env)?;
                let fx = env.fx_rate(product.currency(), portfolio.currency())?;
                Ok(units * value * fx)
            })
            .collect()
    };

    let base = position_value(env)?;
    let total: f64 = base.iter().sum();
    if total == 0.0 {
        return Err(PortfolioError::ZeroTotal {
            portfolio: portfolio.id().to_string(),
            measure: "value",
        }
        .into());
    }
    tracing::info!(
        portfolio = portfolio.id(),
        positions = positions.len(),
        scenarios = table.len(),
        "computing marginal VaR by position"
    );

    let per_scenario: Vec<Vec<f64>> = parallel.try_map_indices(table.len(), |i| {
        let shocked = table.scenario(i).apply(env, mode)?;
        let values = position_value(&shocked)?;
        Ok::<_, RiskError>(values.iter().zip(&base).map(|(new, old)| new - old).collect())
    })?;

    let buckets: Vec<Bucket> = positions
        .iter()
        .enumerate()
        .map(|(k, (product, _))| Bucket {
            name: product.id().to_string(),
            weight: base[k] / total,
            pnl: per_scenario.iter().map(|row| row[k]).collect(),
        })
        .collect();
    marginal_var(&buckets, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskbook_core::market::RiskFactorKey;
    use riskbook_core::types::{Currency, Date};
    use riskbook_models::instruments::Stock;

    #[test]
    fn test_single_bucket_takes_all_var() {
        let buckets = vec![Bucket::new("only", 1.0, vec![-3.0, -1.0, 0.0, 2.0])];
        let mvar = marginal_var(&buckets, 0.0).unwrap();
        assert_relative_eq!(mvar.var, -3.0);
        assert_relative_eq!(mvar.contributions[0].marginal_var, -3.0);
        assert_relative_eq!(mvar.contributions[0].risk_contribution, -3.0);
    }

    #[test]
    fn test_mismatched_lengths() {
        let buckets = vec![Bucket::new("a", 0.5, vec![1.0, 2.0]), Bucket::new("b", 0.5, vec![1.0])];
        assert_eq!(
            marginal_var(&buckets, 0.1),
            Err(RiskError::BucketLength {
                bucket: "b".to_string(),
                expected: 2,
                got: 1
            })
        );
        assert_eq!(marginal_var(&[], 0.1), Err(RiskError::EmptyDistribution));
        assert_eq!(
            marginal_var(&[Bucket::new("a", 1.0, vec![1.0])], 0.1),
            Err(RiskError::TooFewScenarios(1))
        );
    }

    #[test]
    fn test_constant_buckets_have_zero_variance() {
        let buckets = vec![Bucket::new("flat", 1.0, vec![1.0, 1.0, 1.0])];
        assert_eq!(marginal_var(&buckets, 0.1), Err(RiskError::ZeroVariance));
    }

    #[test]
    fn test_portfolio_buckets_by_position() {
        let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
        env.add_constant("MarketPrice-RY", 100.0);
        env.add_constant("MarketPrice-TD", 50.0);
        let mut book = Portfolio::new("book", Currency::CAD);
        book.add_product(Stock::new("RY", Currency::CAD), 3.0);
        book.add_product(Stock::new("TD", Currency::CAD), 4.0);

        let table = ScenarioTable::new(
            vec![RiskFactorKey::constant("MarketPrice-RY"), RiskFactorKey::constant("MarketPrice-TD")],
            vec![
                vec![-0.02, 0.01],
                vec![0.01, -0.03],
                vec![0.03, 0.02],
                vec![-0.01, -0.01],
            ],
        )
        .unwrap();
        let mvar =
            marginal_var_from_portfolio(&book, &env, &table, ShiftMode::Relative, 0.25, &ParallelConfig::sequential())
                .unwrap();
        assert_relative_eq!(mvar.get("RY").unwrap().weight, 0.6, epsilon = 1e-12);
        assert_relative_eq!(mvar.get("TD").unwrap().weight, 0.4, epsilon = 1e-12);
        assert_relative_eq!(mvar.total_contribution(), mvar.var, epsilon = 1e-9);
    }
}
