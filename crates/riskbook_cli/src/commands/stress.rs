//! Stress command implementation
//!
//! Revalues the portfolio under the preset stress scenarios and, on request,
//! under every historical move inside the crisis windows.

use anyhow::Result;
use riskbook_engine::risk::{pnl_distribution, var_from_pnl};
use riskbook_engine::scenarios::{CrisisWindow, PresetScenario, ShiftMode};
use serde::Serialize;
use tracing::{info, warn};

use crate::context::RunContext;
use crate::output::{print_json, OutputFormat, Report};

#[derive(Serialize)]
struct PresetResult {
    scenario: &'static str,
    value: f64,
    pnl: f64,
}

#[derive(Serialize)]
struct CrisisResult {
    window: &'static str,
    days: usize,
    worst_pnl: f64,
    var: f64,
}

#[derive(Serialize)]
struct StressReport {
    base_value: f64,
    presets: Vec<PresetResult>,
    crises: Vec<CrisisResult>,
}

/// Run the stress command
pub fn run(ctx: &RunContext, preset: Option<&str>, crisis: bool, format: OutputFormat) -> Result<()> {
    info!("Running stress scenarios...");
    let base_value = ctx.portfolio.value(&ctx.env)?;

    let selected: Vec<PresetScenario> = match preset {
        Some(name) => vec![name.parse()?],
        None => PresetScenario::ALL.to_vec(),
    };
    let mut presets = Vec::with_capacity(selected.len());
    for scenario in selected {
        let shocked = scenario.apply(&ctx.env)?;
        let value = ctx.portfolio.value(&shocked)?;
        presets.push(PresetResult {
            scenario: scenario.name(),
            value,
            pnl: value - base_value,
        });
    }

    let mut crises = Vec::new();
    if crisis {
        let history = ctx.history()?;
        for window in CrisisWindow::ALL {
            let table = history.crisis(window)?;
            if table.is_empty() {
                warn!(window = window.name(), "no historical scenarios in window");
                continue;
            }
            let pnl = pnl_distribution(&ctx.portfolio, &ctx.env, &table, ShiftMode::Relative, &ctx.config.parallel)?;
            crises.push(CrisisResult {
                window: window.name(),
                days: pnl.len(),
                worst_pnl: pnl.iter().copied().fold(f64::INFINITY, f64::min),
                var: var_from_pnl(&pnl, ctx.config.market.alpha)?.var,
            });
        }
    }

    let report = StressReport {
        base_value,
        presets,
        crises,
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            println!("\nBase value {:.2}", report.base_value);
            let mut table = Report::new(&["Scenario", "Value", "P&L"]);
            for p in &report.presets {
                table.row(vec![
                    p.scenario.to_string(),
                    format!("{:.2}", p.value),
                    format!("{:.2}", p.pnl),
                ]);
            }
            table.print();

            if !report.crises.is_empty() {
                let mut table = Report::new(&["Crisis window", "Days", "Worst P&L", "VaR"]);
                for c in &report.crises {
                    table.row(vec![
                        c.window.to_string(),
                        c.days.to_string(),
                        format!("{:.2}", c.worst_pnl),
                        format!("{:.2}", c.var),
                    ]);
                }
                table.print();
            }
        }
    }

    info!("Stress run complete");
    Ok(())
}
