//! Credit VaR command implementation

use anyhow::Result;
use riskbook_engine::risk::{simulate_credit, var_from_pnl};
use serde::Serialize;
use tracing::info;

use crate::context::RunContext;
use crate::output::{print_json, OutputFormat, Report};

#[derive(Serialize)]
struct CreditReport {
    simulations: usize,
    rho: f64,
    alpha: f64,
    var: f64,
    es: f64,
    mean: f64,
    migration_var: f64,
    default_var: f64,
}

/// Run the credit-var command
pub fn run(ctx: &RunContext, stressed: bool, format: OutputFormat) -> Result<()> {
    let settings = ctx.config.credit_settings(stressed);
    let alpha = ctx.config.credit.alpha;
    info!(rho = settings.rho, stressed, "Simulating credit migrations...");

    let dist = simulate_credit(&ctx.portfolio, &ctx.env, &settings, &ctx.config.parallel)?;
    let total = dist.var(alpha)?;
    let report = CreditReport {
        simulations: dist.len(),
        rho: settings.rho,
        alpha,
        var: total.var,
        es: total.es,
        mean: dist.mean()?,
        migration_var: var_from_pnl(&dist.migration, alpha)?.var,
        default_var: var_from_pnl(&dist.default, alpha)?.var,
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            println!(
                "\nCredit VaR, {} paths, rho {}, alpha {}",
                report.simulations, report.rho, report.alpha
            );
            let mut table = Report::new(&["Measure", "Amount"]);
            table
                .amount("Credit VaR", report.var)
                .amount("Expected shortfall", report.es)
                .amount("Mean P&L", report.mean)
                .amount("Migration VaR", report.migration_var)
                .amount("Default VaR", report.default_var);
            table.print();
        }
    }

    info!("Credit VaR complete");
    Ok(())
}
