//! Correlated normal draws over named factors.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use riskbook_core::market::{MarketDataError, MarketEnvironment, RiskCategory, RiskFactorKey};
use riskbook_core::math::linalg::{CholeskyFactor, SquareMatrix};
use riskbook_models::instruments::RISK_FACTOR_VOLATILITIES;

use super::error::SimulationError;
use crate::parallel::ParallelConfig;
use crate::scenarios::ScenarioTable;

/// Matrix of factor correlations; rows and columns are legacy factor keys.
pub const CORRELATION_MATRIX: &str = "RiskFactorCorrelationMatrix";

/// How many paths to draw and over which horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Number of paths
    pub num_sims: usize,
    /// Simulation step in years
    pub sim_dt: f64,
    /// Horizon the volatilities are quoted over, in years; defaults to `sim_dt`
    pub vol_dt: Option<f64>,
    /// Seed of path 0; path `i` uses `seed + i`
    pub seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            num_sims: 10_000,
            sim_dt: 1.0 / 252.0,
            vol_dt: None,
            seed: 42,
        }
    }
}

impl SimulationSettings {
    /// `√(sim_dt / vol_dt)`.
    pub fn scaling_factor(&self) -> Result<f64, SimulationError> {
        let vol_dt = self.vol_dt.unwrap_or(self.sim_dt);
        for dt in [self.sim_dt, vol_dt] {
            if !(dt.is_finite() && dt > 0.0) {
                return Err(SimulationError::InvalidHorizon(dt));
            }
        }
        Ok((self.sim_dt / vol_dt).sqrt())
    }
}

/// Factored covariance of a set of named factors.
///
/// # Examples
/// ```
/// use riskbook_core::market::RiskFactorKey;
/// use riskbook_core::math::linalg::SquareMatrix;
/// use riskbook_engine::parallel::ParallelConfig;
/// use riskbook_engine::simulation::{SimulationEngine, SimulationSettings};
///
/// let keys = vec![RiskFactorKey::constant("MarketPrice-RY"), RiskFactorKey::constant("MarketPrice-TD")];
/// let correlation = SquareMatrix::equicorrelation(2, 0.8);
/// let engine = SimulationEngine::new(keys, &correlation, &[0.01, 0.02]).unwrap();
///
/// let settings = SimulationSettings { num_sims: 500, ..Default::default() };
/// let table = engine.simulate(&settings, &ParallelConfig::default()).unwrap();
/// assert_eq!(table.len(), 500);
/// assert_eq!(table.keys().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    keys: Vec<RiskFactorKey>,
    factor: CholeskyFactor,
    repaired: bool,
}

impl SimulationEngine {
    /// Engine for `keys` with the given correlations and volatilities.
    pub fn new(
        keys: Vec<RiskFactorKey>,
        correlation: &SquareMatrix,
        volatilities: &[f64],
    ) -> Result<Self, SimulationError> {
        if correlation.dim() != keys.len() || volatilities.len() != keys.len() {
            return Err(SimulationError::DimensionMismatch {
                factors: keys.len(),
                volatilities: volatilities.len(),
                correlation: correlation.dim(),
            });
        }
        let covariance = correlation.scaled_by(volatilities)?;
        let (factor, repaired) = covariance.cholesky_with_repair()?;
        Ok(Self {
            keys,
            factor,
            repaired,
        })
    }

    /// Engine from `RiskFactorCorrelationMatrix` and `RiskFactorVolatilities`.
    ///
    /// Factors are the correlation matrix columns, whose rows are taken in
    /// the same order. Each factor's volatility is looked up by column label.
    pub fn from_environment(env: &MarketEnvironment) -> Result<Self, SimulationError> {
        let matrix = env.get_matrix(CORRELATION_MATRIX)?;
        let volatilities = env.get_list(RISK_FACTOR_VOLATILITIES)?;
        let n = matrix.n_cols();
        if matrix.n_rows() != n {
            return Err(MarketDataError::InvalidTable(format!(
                "'{}' is {}x{}, expected square",
                CORRELATION_MATRIX,
                matrix.n_rows(),
                n
            ))
            .into());
        }

        let keys = matrix
            .column_labels()
            .iter()
            .map(|label| label.parse::<RiskFactorKey>())
            .collect::<Result<Vec<_>, _>>()?;
        let vols = matrix
            .column_labels()
            .iter()
            .map(|label| {
                volatilities
                    .list_value(label)
                    .ok_or_else(|| MarketDataError::MissingRiskFactor {
                        category: RiskCategory::List,
                        key: format!("{}-{}", RISK_FACTOR_VOLATILITIES, label),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let rows: Vec<Vec<f64>> = (0..n).map(|i| matrix.row_at(i).to_vec()).collect();
        let correlation = SquareMatrix::from_rows(&rows)?;

        Self::new(keys, &correlation, &vols)
    }

    /// Simulated factors, in column order.
    pub fn keys(&self) -> &[RiskFactorKey] {
        &self.keys
    }

    /// Lower Cholesky factor of the covariance actually used.
    pub fn factor(&self) -> &CholeskyFactor {
        &self.factor
    }

    /// Whether the covariance had to be repaired.
    pub fn repaired(&self) -> bool {
        self.repaired
    }

    /// One correlated draw per path, scaled to the simulation horizon.
    pub fn simulate(
        &self,
        settings: &SimulationSettings,
        parallel: &ParallelConfig,
    ) -> Result<ScenarioTable, SimulationError> {
        let scale = settings.scaling_factor()?;
        let n = self.keys.len();
        tracing::info!(
            paths = settings.num_sims,
            factors = n,
            scale,
            repaired = self.repaired,
            "simulating market scenarios"
        );

        let rows: Vec<Vec<f64>> = parallel.try_map_indices(settings.num_sims, |path| {
            let mut rng = StdRng::seed_from_u64(settings.seed.wrapping_add(path as u64));
            let z: Vec<f64> = (0..n).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();
            Ok::<_, SimulationError>(self.factor.transform(&z).into_iter().map(|x| x * scale).collect())
        })?;
        Ok(ScenarioTable::new(self.keys.clone(), rows)?)
    }
}
