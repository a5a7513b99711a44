//! Value command implementation
//!
//! Values the portfolio in the base currency and breaks it down by asset
//! class and position.

use std::collections::BTreeMap;

use anyhow::Result;
use riskbook_engine::portfolio::Leverage;
use riskbook_engine::scenarios::{dv01_convexity, sensitivities, RateSensitivity, Sensitivity};
use riskbook_models::instruments::AssetClass;
use serde::Serialize;
use tracing::info;

use crate::context::RunContext;
use crate::output::{print_json, OutputFormat, Report};

const ASSET_CLASSES: [AssetClass; 4] = [
    AssetClass::Cash,
    AssetClass::Equity,
    AssetClass::FixedIncome,
    AssetClass::Derivative,
];

#[derive(Serialize)]
struct ValueReport {
    portfolio: String,
    currency: String,
    valuation_date: String,
    value: f64,
    exposure: f64,
    leverage: Leverage,
    by_asset_class: BTreeMap<String, f64>,
    positions: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rates: Option<RateSensitivity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sensitivities: Vec<Sensitivity>,
}

/// Run the value command
pub fn run(ctx: &RunContext, with_sensitivities: bool, format: OutputFormat) -> Result<()> {
    info!("Valuing portfolio...");
    let portfolio = &ctx.portfolio;
    let env = &ctx.env;

    let mut by_asset_class = BTreeMap::new();
    for class in ASSET_CLASSES {
        let view = portfolio.by_asset_class(class);
        if !view.is_empty() {
            by_asset_class.insert(class.to_string(), view.value(env)?);
        }
    }

    let (rates, bumps) = if with_sensitivities {
        (
            Some(dv01_convexity(portfolio, env)?),
            sensitivities(portfolio, env, &ctx.config.parallel)?,
        )
    } else {
        (None, Vec::new())
    };

    let report = ValueReport {
        portfolio: portfolio.id().to_string(),
        currency: portfolio.currency().to_string(),
        valuation_date: ctx.valuation_date.to_string(),
        value: portfolio.value(env)?,
        exposure: portfolio.exposure(env)?,
        leverage: portfolio.leverage(env)?,
        by_asset_class,
        positions: portfolio.position_values(env)?,
        rates,
        sensitivities: bumps,
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            println!(
                "\nPortfolio {} ({}) as of {}",
                report.portfolio, report.currency, report.valuation_date
            );
            let mut summary = Report::new(&["Measure", "Amount"]);
            summary
                .amount("Value", report.value)
                .amount("Exposure", report.exposure)
                .row(vec!["Leverage (value)".into(), format!("{:.4}", report.leverage.value)])
                .row(vec!["Leverage (exposure)".into(), format!("{:.4}", report.leverage.exposure)]);
            for (class, value) in &report.by_asset_class {
                summary.amount(format!("  {}", class), *value);
            }
            summary.print();

            let mut positions = Report::new(&["Position", "Value"]);
            for (id, value) in &report.positions {
                positions.amount(id.clone(), *value);
            }
            positions.print();

            if let Some(rates) = &report.rates {
                let mut table = Report::new(&["Rates", "Amount"]);
                table.amount("DV01", rates.dv01).amount("Convexity", rates.convexity);
                table.print();
            }
            if !report.sensitivities.is_empty() {
                let mut table = Report::new(&["Factor", "Bump", "P&L"]);
                for s in &report.sensitivities {
                    table.row(vec![s.key.to_string(), format!("{}", s.bump), format!("{:.2}", s.pnl)]);
                }
                table.print();
            }
        }
    }

    info!("Valuation complete");
    Ok(())
}
