//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

use anyhow::Result;
use riskbook_engine::scenarios::ScenarioTable;
use riskbook_engine::simulation::SimulationEngine;
use tracing::info;

use crate::context::RunContext;

pub mod capital;
pub mod credit;
pub mod stress;
pub mod value;
pub mod var;

/// Correlated one-step factor moves from the environment's correlation
/// matrix and volatilities.
fn monte_carlo_scenarios(ctx: &RunContext) -> Result<ScenarioTable> {
    let engine = SimulationEngine::from_environment(&ctx.env)?;
    if engine.repaired() {
        info!("correlation matrix was repaired to be positive semi-definite");
    }
    Ok(engine.simulate(&ctx.config.simulation_settings(), &ctx.config.parallel)?)
}

/// Every historical move observed on or before the valuation date.
fn historical_scenarios(ctx: &RunContext) -> Result<ScenarioTable> {
    let history = ctx.history()?;
    Ok(history.last_n(ctx.valuation_date, history.len()))
}

/// Square-root-of-time factor from the scenario to the VaR horizon.
fn horizon_scale(ctx: &RunContext) -> f64 {
    (ctx.config.market.var_horizon / ctx.config.market.scenario_horizon).sqrt()
}
