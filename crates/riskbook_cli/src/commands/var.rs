//! VaR command implementation
//!
//! Market VaR and ES at the configured horizon from simulated or historical
//! relative moves, with optional marginal VaR and back-test.

use anyhow::Result;
use clap::ValueEnum;
use riskbook_engine::risk::{backtest_var, marginal_var_from_portfolio, scenario_var, Contribution};
use riskbook_engine::scenarios::{ScenarioTable, ShiftMode};
use serde::Serialize;
use tracing::info;

use super::{historical_scenarios, horizon_scale, monte_carlo_scenarios};
use crate::context::RunContext;
use crate::output::{print_json, OutputFormat, Report};

/// Where the scenarios come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// Correlated normal draws
    MonteCarlo,
    /// Observed daily moves
    Historical,
}

impl Method {
    fn name(self) -> &'static str {
        match self {
            Method::MonteCarlo => "monte-carlo",
            Method::Historical => "historical",
        }
    }
}

#[derive(Serialize)]
struct Backtest {
    days: usize,
    daily_var: f64,
    breaches: usize,
    adjustment: f64,
}

#[derive(Serialize)]
struct VarReport {
    method: &'static str,
    scenarios: usize,
    alpha: f64,
    horizon_days: f64,
    var: f64,
    es: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    contributions: Option<Vec<Contribution>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backtest: Option<Backtest>,
}

fn scenarios(ctx: &RunContext, method: Method) -> Result<ScenarioTable> {
    match method {
        Method::MonteCarlo => monte_carlo_scenarios(ctx),
        Method::Historical => historical_scenarios(ctx),
    }
}

/// Run the var command
pub fn run(ctx: &RunContext, method: Method, marginal: bool, backtest: bool, format: OutputFormat) -> Result<()> {
    let market = &ctx.config.market;
    let parallel = &ctx.config.parallel;
    info!(method = method.name(), alpha = market.alpha, horizon = market.var_horizon, "Computing VaR...");

    let table = scenarios(ctx, method)?;
    let result = scenario_var(
        &ctx.portfolio,
        &ctx.env,
        &table,
        market.scenario_horizon,
        market.var_horizon,
        market.alpha,
        parallel,
    )?;

    let contributions = if marginal {
        let scaled = table.scaled(horizon_scale(ctx));
        let mvar =
            marginal_var_from_portfolio(&ctx.portfolio, &ctx.env, &scaled, ShiftMode::Relative, market.alpha, parallel)?;
        Some(mvar.contributions)
    } else {
        None
    };

    let backtest = if backtest {
        let daily = scenario_var(
            &ctx.portfolio,
            &ctx.env,
            &table,
            market.scenario_horizon,
            market.scenario_horizon,
            market.alpha,
            parallel,
        )?;
        let history = ctx.history()?;
        let breaches = backtest_var(
            &ctx.portfolio,
            &ctx.env,
            &history,
            daily.var,
            market.backtest_days,
            ctx.valuation_date,
            parallel,
        )?;
        Some(Backtest {
            days: market.backtest_days,
            daily_var: daily.var,
            breaches,
            adjustment: ctx.config.capital.adjustment(breaches),
        })
    } else {
        None
    };

    let report = VarReport {
        method: method.name(),
        scenarios: table.len(),
        alpha: market.alpha,
        horizon_days: market.var_horizon,
        var: result.var,
        es: result.es,
        contributions,
        backtest,
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            println!(
                "\n{} VaR, {} scenarios, alpha {}, {}-day horizon",
                report.method, report.scenarios, report.alpha, report.horizon_days
            );
            let mut summary = Report::new(&["Measure", "Amount"]);
            summary.amount("VaR", report.var).amount("Expected shortfall", report.es);
            if let Some(bt) = &report.backtest {
                summary
                    .amount("Daily VaR", bt.daily_var)
                    .row(vec![format!("Breaches ({} days)", bt.days), bt.breaches.to_string()])
                    .row(vec!["Capital multiplier".into(), format!("{:.2}", bt.adjustment)]);
            }
            summary.print();

            if let Some(contributions) = &report.contributions {
                let mut table = Report::new(&["Position", "Weight", "Marginal VaR", "Contribution"]);
                for c in contributions {
                    table.row(vec![
                        c.name.clone(),
                        format!("{:.4}", c.weight),
                        format!("{:.2}", c.marginal_var),
                        format!("{:.2}", c.risk_contribution),
                    ]);
                }
                table.print();
            }
        }
    }

    info!("VaR complete");
    Ok(())
}
