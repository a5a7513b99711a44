//! Credit VaR by correlated rating migration.
//!
//! Every bond and CDS in the book is an obligor. Each path draws one
//! standard normal per obligor from a one-factor model with asset
//! correlation `ρ`, maps it through the obligor's row of the transition
//! matrix to a new rating, and books:
//! - a migration loss `(old − new value)·units·fx` for names that survive
//! - a default loss for names that land in `D`: `face·(1 − R)·units·fx` for
//!   bonds, `−notional·units·fx` for CDS (protection pays out)
//!
//! Ratings are changed only on per-path clones of the instruments.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use riskbook_core::market::{MarketDataError, MarketEnvironment, Table};
use riskbook_core::math::distributions::norm_inv;
use riskbook_core::types::Currency;
use riskbook_models::instruments::inputs::{rating_row, recovery_rate, TRANSITION_MATRIX};
use riskbook_models::instruments::{Priceable, PricingError, Product};
use riskbook_models::ratings::{DEFAULT_GRADE, SP};
use serde::{Deserialize, Serialize};

use super::error::RiskError;
use super::var::{var_from_pnl, VarResult};
use crate::parallel::ParallelConfig;
use crate::portfolio::{value_as_of_maturity, Portfolio, PortfolioError};

/// Transition matrix row used for unrated and deeply distressed names.
pub const DISTRESSED_BUCKET: &str = "CCC/C";

/// Grade assumed for an obligor without an S&P rating.
const UNRATED: &str = "NR";

/// Credit simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditVarSettings {
    /// Number of paths
    pub num_sims: usize,
    /// Pairwise asset correlation
    pub rho: f64,
    /// Seed of path 0; path `i` uses `seed + i`
    pub seed: u64,
}

impl Default for CreditVarSettings {
    fn default() -> Self {
        Self {
            num_sims: 10_000,
            rho: 0.2,
            seed: 42,
        }
    }
}

/// Migration thresholds per current rating.
///
/// For a row with new-rating probabilities `p_0..p_k` (best first, `D`
/// last), the threshold of column `j` is `Φ⁻¹(p_j + … + p_k)` and the best
/// column's is `+∞`, so thresholds fall from the best column to `D`. A draw
/// `z` migrates to the worst column whose threshold exceeds it.
///
/// # Examples
/// ```
/// use riskbook_core::market::Table;
/// use riskbook_engine::risk::MigrationThresholds;
///
/// let labels = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
/// let matrix = Table::new(
///     labels(&["A", "B"]),
///     labels(&["A", "B", "D"]),
///     vec![vec![0.90, 0.08, 0.02], vec![0.10, 0.80, 0.10]],
/// )
/// .unwrap();
/// let thresholds = MigrationThresholds::from_table(&matrix).unwrap();
/// assert_eq!(thresholds.migrate(0, 0.0), "A");
/// assert_eq!(thresholds.migrate(0, -1.5), "B");
/// assert_eq!(thresholds.migrate(0, -3.0), "D");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationThresholds {
    matrix: Table,
    thresholds: Vec<Vec<f64>>,
}

impl MigrationThresholds {
    /// Thresholds from a transition matrix.
    pub fn from_table(matrix: &Table) -> Result<Self, RiskError> {
        if matrix.n_cols() == 0 || matrix.n_rows() == 0 {
            return Err(MarketDataError::InvalidTable(format!("'{}' is empty", TRANSITION_MATRIX)).into());
        }
        let thresholds = (0..matrix.n_rows())
            .map(|i| {
                let row = matrix.row_at(i);
                let mut out = vec![f64::INFINITY; row.len()];
                let mut cumulative = 0.0;
                for j in (1..row.len()).rev() {
                    cumulative += row[j];
                    out[j] = norm_inv(cumulative.min(1.0));
                }
                out
            })
            .collect();
        Ok(Self {
            matrix: matrix.clone(),
            thresholds,
        })
    }

    /// Thresholds from `CreditTransitionMatrix`.
    pub fn from_environment(env: &MarketEnvironment) -> Result<Self, RiskError> {
        Self::from_table(env.get_matrix(TRANSITION_MATRIX)?)
    }

    /// New-rating labels, best first.
    pub fn grades(&self) -> &[String] {
        self.matrix.column_labels()
    }

    /// Row for a current grade.
    ///
    /// Unknown grades fall back to the notch-stripped grade, then to
    /// [`DISTRESSED_BUCKET`] for `NR`, `CCC`, `CC` and `C`, then to the worst row.
    pub fn row_for(&self, grade: &str) -> Result<usize, RiskError> {
        Ok(rating_row(&self.matrix, TRANSITION_MATRIX, grade, Some(DISTRESSED_BUCKET))?)
    }

    /// Thresholds of one row, indexed like [`grades`](Self::grades).
    pub fn thresholds(&self, row: usize) -> &[f64] {
        &self.thresholds[row]
    }

    /// New grade for a draw `z` from row `row`.
    pub fn migrate(&self, row: usize, z: f64) -> &str {
        let thresholds = &self.thresholds[row];
        let column = (0..thresholds.len()).rev().find(|&j| z < thresholds[j]).unwrap_or(0);
        &self.grades()[column]
    }
}

/// Three parallel P&L distributions from one credit simulation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CreditDistribution {
    /// Migration plus default P&L
    pub total: Vec<f64>,
    /// P&L from rating changes of surviving names
    pub migration: Vec<f64>,
    /// P&L from defaults
    pub default: Vec<f64>,
}

impl CreditDistribution {
    /// Number of paths.
    pub fn len(&self) -> usize {
        self.total.len()
    }

    /// Whether no path was simulated.
    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    /// VaR and ES of the total P&L.
    pub fn var(&self, alpha: f64) -> Result<VarResult, RiskError> {
        var_from_pnl(&self.total, alpha)
    }

    /// Mean total P&L.
    pub fn mean(&self) -> Result<f64, RiskError> {
        if self.total.is_empty() {
            return Err(RiskError::EmptyDistribution);
        }
        Ok(self.total.iter().sum::<f64>() / self.total.len() as f64)
    }
}

struct Obligor<'a> {
    product: &'a Product,
    grade: String,
    row: usize,
    units: f64,
    fx: f64,
    base_value: f64,
    default_loss: f64,
}

impl<'a> Obligor<'a> {
    fn new(
        product: &'a Product,
        units: f64,
        env: &MarketEnvironment,
        currency: Currency,
        thresholds: &MigrationThresholds,
    ) -> Result<Option<Self>, RiskError> {
        let loss_per_unit = match product {
            Product::Bond(bond) => {
                let recovery = recovery_rate(env, bond.tier.as_deref())
                    .map_err(|e| PortfolioError::from(PricingError::new(product.id(), e)))?;
                bond.face_value * (1.0 - recovery)
            }
            Product::CreditDefaultSwap(cds) => -cds.notional,
            _ => return Ok(None),
        };
        let fx = env.fx_rate(product.currency(), currency)?;
        let grade = product.rating(SP).unwrap_or(UNRATED).to_string();
        let row = thresholds.row_for(&grade)?;
        let base_value = value_as_of_maturity(product, env).map_err(PortfolioError::from)?;
        Ok(Some(Self {
            product,
            grade,
            row,
            units,
            fx,
            base_value,
            default_loss: loss_per_unit * units * fx,
        }))
    }
}

/// Simulates migration and default P&L of the bonds and CDS in `portfolio`.
pub fn simulate_credit(
    portfolio: &Portfolio,
    env: &MarketEnvironment,
    settings: &CreditVarSettings,
    parallel: &ParallelConfig,
) -> Result<CreditDistribution, RiskError> {
    if !(0.0..=1.0).contains(&settings.rho) {
        return Err(RiskError::InvalidCorrelation(settings.rho));
    }
    let thresholds = MigrationThresholds::from_environment(env)?;

    let mut obligors = Vec::new();
    for (product, units) in portfolio.flat_positions() {
        if let Some(obligor) = Obligor::new(product, units, env, portfolio.currency(), &thresholds)? {
            obligors.push(obligor);
        }
    }
    tracing::info!(
        portfolio = portfolio.id(),
        obligors = obligors.len(),
        paths = settings.num_sims,
        rho = settings.rho,
        "simulating credit migration"
    );

    let systematic = settings.rho.sqrt();
    let idiosyncratic = (1.0 - settings.rho).sqrt();

    let paths: Vec<(f64, f64)> = parallel.try_map_indices(settings.num_sims, |path| {
        let mut rng = StdRng::seed_from_u64(settings.seed.wrapping_add(path as u64));
        let market: f64 = rng.sample(StandardNormal);
        let mut migration_loss = 0.0;
        let mut default_loss = 0.0;

        for obligor in &obligors {
            let eps: f64 = rng.sample(StandardNormal);
            let z = systematic * market + idiosyncratic * eps;
            let grade = thresholds.migrate(obligor.row, z);
            if grade == DEFAULT_GRADE {
                default_loss += obligor.default_loss;
            } else if grade != obligor.grade {
                let mut migrated = obligor.product.clone();
                migrated.set_rating(SP, grade);
                let value = value_as_of_maturity(&migrated, env).map_err(PortfolioError::from)?;
                migration_loss += (obligor.base_value - value) * obligor.units * obligor.fx;
            }
        }
        tracing::debug!(path, migration_loss, default_loss, "credit path");
        Ok::<_, RiskError>((migration_loss, default_loss))
    })?;

    let mut out = CreditDistribution {
        total: Vec::with_capacity(paths.len()),
        migration: Vec::with_capacity(paths.len()),
        default: Vec::with_capacity(paths.len()),
    };
    for (migration_loss, default_loss) in paths {
        out.total.push(-(migration_loss + default_loss));
        out.migration.push(-migration_loss);
        out.default.push(-default_loss);
    }
    Ok(out)
}
