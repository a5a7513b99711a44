//! Inputs shared by every command.

use std::path::Path;

use anyhow::{Context, Result};
use riskbook_core::market::MarketEnvironment;
use riskbook_core::types::Date;
use riskbook_engine::config::RiskConfig;
use riskbook_engine::loader::{DataLoader, JsonDataLoader};
use riskbook_engine::portfolio::Portfolio;
use riskbook_engine::scenarios::HistoricalScenarios;
use tracing::{info, warn};

/// Validated configuration plus the loaded portfolio and market data.
pub struct RunContext {
    pub config: RiskConfig,
    pub loader: JsonDataLoader,
    pub valuation_date: Date,
    pub portfolio: Portfolio,
    pub env: MarketEnvironment,
}

impl RunContext {
    /// Reads the config (defaults if the file is absent), applies
    /// `RISKBOOK_*` overrides, then loads the portfolio and market data.
    ///
    /// Without an explicit `date` the valuation date of `market.json` is used.
    pub fn load(config_path: &Path, data_dir: &Path, date: Option<&str>) -> Result<Self> {
        let config = if config_path.exists() {
            RiskConfig::from_file(config_path)
                .with_context(|| format!("loading config {}", config_path.display()))?
        } else {
            warn!(path = %config_path.display(), "config file not found, using defaults");
            RiskConfig::default()
        };
        let config = config.with_env_override()?;
        config.validate()?;

        let loader = JsonDataLoader::new(data_dir);
        let valuation_date = match date {
            Some(raw) => Date::parse(raw).with_context(|| format!("parsing --date '{}'", raw))?,
            None => loader.market_date()?,
        };
        info!(data_dir = %data_dir.display(), date = %valuation_date, "loading inputs");

        let portfolio = loader.load_portfolio(config.base_currency)?;
        let env = loader.load_market_environment(valuation_date)?;

        Ok(Self {
            config,
            loader,
            valuation_date,
            portfolio,
            env,
        })
    }

    /// Historical scenarios from the data directory.
    pub fn history(&self) -> Result<HistoricalScenarios> {
        Ok(self.loader.load_historical_scenarios()?)
    }
}
