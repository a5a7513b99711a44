//! Capital command implementation
//!
//! Market VaR from simulation, stressed VaR from the housing-crisis window,
//! credit VaR at the configured correlation, the back-test multiplier and
//! standardized counterparty capital, combined into regulatory and economic
//! capital.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use riskbook_engine::risk::{
    backtest_var, counterparty_credit_capital, economic_capital, market_risk_capital, regulatory_capital,
    scenario_var, simulate_credit,
};
use riskbook_engine::scenarios::CrisisWindow;
use serde::Serialize;
use tracing::info;

use super::monte_carlo_scenarios;
use crate::context::RunContext;
use crate::output::{print_json, OutputFormat, Report};

#[derive(Serialize)]
struct CapitalReport {
    market_var: f64,
    stressed_var: f64,
    credit_var: f64,
    credit_mean: f64,
    breaches: usize,
    adjustment: f64,
    market_risk_capital: f64,
    counterparty_capital: f64,
    counterparty_rwa: BTreeMap<String, f64>,
    regulatory_capital: f64,
    economic_capital: f64,
}

/// Run the capital command
pub fn run(ctx: &RunContext, format: OutputFormat) -> Result<()> {
    info!("Computing capital...");
    let market = &ctx.config.market;
    let parallel = &ctx.config.parallel;
    let (portfolio, env) = (&ctx.portfolio, &ctx.env);

    let simulated = monte_carlo_scenarios(ctx)?;
    let market_var = scenario_var(
        portfolio,
        env,
        &simulated,
        market.scenario_horizon,
        market.var_horizon,
        market.alpha,
        parallel,
    )?
    .var;

    let history = ctx.history()?;
    let stressed = history.crisis(CrisisWindow::Housing)?;
    if stressed.is_empty() {
        bail!("no historical scenarios in the {} window", CrisisWindow::Housing.name());
    }
    let stressed_var = scenario_var(
        portfolio,
        env,
        &stressed,
        market.scenario_horizon,
        market.var_horizon,
        market.alpha,
        parallel,
    )?
    .var;

    let daily_var = scenario_var(
        portfolio,
        env,
        &simulated,
        market.scenario_horizon,
        market.scenario_horizon,
        market.alpha,
        parallel,
    )?
    .var;
    let breaches = backtest_var(
        portfolio,
        env,
        &history,
        daily_var,
        market.backtest_days,
        ctx.valuation_date,
        parallel,
    )?;
    let adjustment = ctx.config.capital.adjustment(breaches);

    let credit = simulate_credit(portfolio, env, &ctx.config.credit_settings(false), parallel)?;
    let credit_var = credit.var(ctx.config.credit.alpha)?.var;
    let credit_mean = credit.mean()?;

    let counterparty = counterparty_credit_capital(portfolio, env)?;
    let mrc = market_risk_capital(market_var, stressed_var, credit_var, adjustment);

    let report = CapitalReport {
        market_var,
        stressed_var,
        credit_var,
        credit_mean,
        breaches,
        adjustment,
        market_risk_capital: mrc,
        counterparty_capital: counterparty.capital,
        counterparty_rwa: counterparty.rwa,
        regulatory_capital: regulatory_capital(mrc, counterparty.capital),
        economic_capital: economic_capital(credit_var, credit_mean, market_var, adjustment),
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            let mut table = Report::new(&["Measure", "Amount"]);
            table
                .amount("Market VaR", report.market_var)
                .amount("Stressed VaR", report.stressed_var)
                .amount("Credit VaR", report.credit_var)
                .row(vec!["Back-test breaches".into(), report.breaches.to_string()])
                .row(vec!["Multiplier".into(), format!("{:.2}", report.adjustment)])
                .amount("Market risk capital", report.market_risk_capital)
                .amount("Counterparty capital", report.counterparty_capital)
                .amount("Regulatory capital", report.regulatory_capital)
                .amount("Economic capital", report.economic_capital);
            table.print();

            if !report.counterparty_rwa.is_empty() {
                let mut rwa = Report::new(&["Derivative", "RWA"]);
                for (id, amount) in &report.counterparty_rwa {
                    rwa.amount(id.clone(), *amount);
                }
                rwa.print();
            }
        }
    }

    info!("Capital complete");
    Ok(())
}
