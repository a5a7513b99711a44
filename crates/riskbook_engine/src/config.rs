//! Run configuration.
//!
//! Loaded from a TOML file, then overridden by `RISKBOOK_*` environment
//! variables. Every section is optional; missing fields take the defaults
//! below.
//!
//! ```toml
//! base_currency = "CAD"
//!
//! [market]
//! num_sims = 10000
//! sim_dt = 0.003968253968253968
//! alpha = 0.01
//! scenario_horizon = 1.0
//! var_horizon = 10.0
//! backtest_days = 252
//! seed = 42
//!
//! [credit]
//! num_sims = 10000
//! rho = 0.2
//! stressed_rho = 0.9
//! alpha = 0.001
//! seed = 42
//!
//! [capital]
//! adjustment_factor = 3.0
//!
//! [parallel]
//! batch_size = 64
//! parallel_threshold = 100
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use riskbook_core::types::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parallel::ParallelConfig;
use crate::risk::{capital_factor, CreditVarSettings};
use crate::simulation::SimulationSettings;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An override variable holds an unparsable value.
    #[error("Invalid value for {var}: '{value}'")]
    Env {
        /// Variable name
        var: String,
        /// Raw value
        value: String,
    },

    /// One or more settings are out of range.
    #[error("Invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Market risk settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketRiskConfig {
    /// Monte Carlo paths
    pub num_sims: usize,
    /// Simulation step in years
    pub sim_dt: f64,
    /// Horizon the volatilities are quoted over, in years
    pub vol_dt: Option<f64>,
    /// VaR tail probability
    pub alpha: f64,
    /// Horizon of one historical scenario, in days
    pub scenario_horizon: f64,
    /// VaR horizon, in days
    pub var_horizon: f64,
    /// Back-test window, in days
    pub backtest_days: usize,
    /// Seed of the first path
    pub seed: u64,
}

impl Default for MarketRiskConfig {
    fn default() -> Self {
        Self {
            num_sims: 10_000,
            sim_dt: 1.0 / 252.0,
            vol_dt: None,
            alpha: 0.01,
            scenario_horizon: 1.0,
            var_horizon: 10.0,
            backtest_days: 252,
            seed: 42,
        }
    }
}

/// Credit risk settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditRiskConfig {
    /// Monte Carlo paths
    pub num_sims: usize,
    /// Asset correlation
    pub rho: f64,
    /// Asset correlation for the stressed run
    pub stressed_rho: f64,
    /// Credit VaR tail probability
    pub alpha: f64,
    /// Seed of the first path
    pub seed: u64,
}

impl Default for CreditRiskConfig {
    fn default() -> Self {
        Self {
            num_sims: 10_000,
            rho: 0.2,
            stressed_rho: 0.9,
            alpha: 0.001,
            seed: 42,
        }
    }
}

/// Capital settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalConfig {
    /// Fixed market VaR multiplier; derived from back-test breaches if absent
    pub adjustment_factor: Option<f64>,
    /// Breach count to use instead of the back-test result
    pub breaches: Option<usize>,
}

impl CapitalConfig {
    /// Multiplier to apply, given the breaches a back-test observed.
    pub fn adjustment(&self, observed_breaches: usize) -> f64 {
        self.adjustment_factor
            .unwrap_or_else(|| capital_factor(self.breaches.unwrap_or(observed_breaches)))
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Reporting currency of the portfolio
    pub base_currency: Currency,
    /// Market risk section
    pub market: MarketRiskConfig,
    /// Credit risk section
    pub credit: CreditRiskConfig,
    /// Capital section
    pub capital: CapitalConfig,
    /// Parallel execution
    pub parallel: ParallelConfig,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            base_currency: Currency::CAD,
            market: MarketRiskConfig::default(),
            credit: CreditRiskConfig::default(),
            capital: CapitalConfig::default(),
            parallel: ParallelConfig::default(),
        }
    }
}

impl RiskConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Applies `RISKBOOK_*` environment variables.
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Applies overrides from `lookup`, keyed by variable name.
    ///
    /// Recognised: `RISKBOOK_BASE_CURRENCY`, `RISKBOOK_MARKET_NUM_SIMS`,
    /// `RISKBOOK_MARKET_ALPHA`, `RISKBOOK_MARKET_SEED`, `RISKBOOK_VAR_HORIZON`,
    /// `RISKBOOK_BACKTEST_DAYS`, `RISKBOOK_CREDIT_NUM_SIMS`, `RISKBOOK_CREDIT_RHO`,
    /// `RISKBOOK_CREDIT_ALPHA`, `RISKBOOK_CREDIT_SEED`,
    /// `RISKBOOK_ADJUSTMENT_FACTOR`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        override_from(&lookup, "RISKBOOK_BASE_CURRENCY", &mut self.base_currency)?;
        override_from(&lookup, "RISKBOOK_MARKET_NUM_SIMS", &mut self.market.num_sims)?;
        override_from(&lookup, "RISKBOOK_MARKET_ALPHA", &mut self.market.alpha)?;
        override_from(&lookup, "RISKBOOK_MARKET_SEED", &mut self.market.seed)?;
        override_from(&lookup, "RISKBOOK_VAR_HORIZON", &mut self.market.var_horizon)?;
        override_from(&lookup, "RISKBOOK_BACKTEST_DAYS", &mut self.market.backtest_days)?;
        override_from(&lookup, "RISKBOOK_CREDIT_NUM_SIMS", &mut self.credit.num_sims)?;
        override_from(&lookup, "RISKBOOK_CREDIT_RHO", &mut self.credit.rho)?;
        override_from(&lookup, "RISKBOOK_CREDIT_ALPHA", &mut self.credit.alpha)?;
        override_from(&lookup, "RISKBOOK_CREDIT_SEED", &mut self.credit.seed)?;
        if let Some(raw) = lookup("RISKBOOK_ADJUSTMENT_FACTOR") {
            let factor = parse_var("RISKBOOK_ADJUSTMENT_FACTOR", &raw)?;
            self.capital.adjustment_factor = Some(factor);
        }
        Ok(self)
    }

    /// Checks every setting, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        let m = &self.market;
        if m.num_sims == 0 {
            problems.push("market.num_sims must be positive".to_string());
        }
        if !(m.sim_dt > 0.0 && m.sim_dt.is_finite()) {
            problems.push(format!("market.sim_dt must be positive, got {}", m.sim_dt));
        }
        if let Some(vol_dt) = m.vol_dt {
            if !(vol_dt > 0.0 && vol_dt.is_finite()) {
                problems.push(format!("market.vol_dt must be positive, got {}", vol_dt));
            }
        }
        check_probability(&mut problems, "market.alpha", m.alpha);
        for (name, horizon) in [("market.scenario_horizon", m.scenario_horizon), ("market.var_horizon", m.var_horizon)] {
            if !(horizon > 0.0 && horizon.is_finite()) {
                problems.push(format!("{} must be positive, got {}", name, horizon));
            }
        }

        let c = &self.credit;
        if c.num_sims == 0 {
            problems.push("credit.num_sims must be positive".to_string());
        }
        check_probability(&mut problems, "credit.rho", c.rho);
        check_probability(&mut problems, "credit.stressed_rho", c.stressed_rho);
        check_probability(&mut problems, "credit.alpha", c.alpha);

        if let Some(factor) = self.capital.adjustment_factor {
            if !(factor > 0.0 && factor.is_finite()) {
                problems.push(format!("capital.adjustment_factor must be positive, got {}", factor));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }

    /// Monte Carlo settings for market scenarios.
    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            num_sims: self.market.num_sims,
            sim_dt: self.market.sim_dt,
            vol_dt: self.market.vol_dt,
            seed: self.market.seed,
        }
    }

    /// Credit simulation settings at the normal or stressed correlation.
    pub fn credit_settings(&self, stressed: bool) -> CreditVarSettings {
        CreditVarSettings {
            num_sims: self.credit.num_sims,
            rho: if stressed { self.credit.stressed_rho } else { self.credit.rho },
            seed: self.credit.seed,
        }
    }
}

fn check_probability(problems: &mut Vec<String>, name: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        problems.push(format!("{} must be in [0, 1], got {}", name, value));
    }
}

fn parse_var<T: FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Env {
        var: var.to_string(),
        value: raw.to_string(),
    })
}

fn override_from<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(raw) = lookup(var) {
        *target = parse_var(var, &raw)?;
    }
    Ok(())
}
