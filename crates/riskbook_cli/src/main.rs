//! riskbook CLI - Command Line Risk Runs
//!
//! Operational entry point: loads a run configuration and a data directory,
//! then prints valuation, VaR, credit VaR, stress or capital figures.
//!
//! # Commands
//!
//! - `riskbook value` - Portfolio value, exposure, leverage and sensitivities
//! - `riskbook var` - Monte Carlo and historical VaR with marginal VaR
//! - `riskbook credit-var` - Credit migration and default VaR
//! - `riskbook stress` - Preset and crisis-window stress P&L
//! - `riskbook capital` - Regulatory and economic capital
//!
//! # Data directory
//!
//! `portfolio.json`, `market.json` and `historical_scenarios.csv`, as read by
//! `riskbook_engine::loader::JsonDataLoader`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod context;
mod output;

use context::RunContext;
use output::OutputFormat;

/// Portfolio market and credit risk runs
#[derive(Parser)]
#[command(name = "riskbook")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path; defaults apply when it does not exist
    #[arg(short, long, global = true, default_value = "riskbook.toml")]
    config: PathBuf,

    /// Directory holding portfolio, market and scenario files
    #[arg(short, long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Valuation date (YYYY-MM-DD)
    #[arg(long, global = true)]
    date: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value the portfolio and report exposures and sensitivities
    Value {
        /// Include per-factor bump sensitivities
        #[arg(long)]
        sensitivities: bool,
    },

    /// Market VaR and expected shortfall
    Var {
        /// Scenario source
        #[arg(short, long, value_enum, default_value_t = commands::var::Method::MonteCarlo)]
        method: commands::var::Method,

        /// Decompose the VaR by position
        #[arg(long)]
        marginal: bool,

        /// Count back-test breaches over the configured window
        #[arg(long)]
        backtest: bool,
    },

    /// Credit migration and default VaR
    CreditVar {
        /// Use the stressed asset correlation
        #[arg(long)]
        stressed: bool,
    },

    /// P&L under preset and historical crisis scenarios
    Stress {
        /// Preset to run (adverse, financial-vulnerability); all when omitted
        #[arg(short, long)]
        preset: Option<String>,

        /// Also run the dot-com and housing crisis windows
        #[arg(long)]
        crisis: bool,
    },

    /// Regulatory and economic capital
    Capital,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "riskbook=debug" } else { "riskbook=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let ctx = RunContext::load(&cli.config, &cli.data_dir, cli.date.as_deref())?;

    match cli.command {
        Commands::Value { sensitivities } => commands::value::run(&ctx, sensitivities, cli.format),
        Commands::Var {
            method,
            marginal,
            backtest,
        } => commands::var::run(&ctx, method, marginal, backtest, cli.format),
        Commands::CreditVar { stressed } => commands::credit::run(&ctx, stressed, cli.format),
        Commands::Stress { preset, crisis } => commands::stress::run(&ctx, preset.as_deref(), crisis, cli.format),
        Commands::Capital => commands::capital::run(&ctx, cli.format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_var_command() {
        let cli = Cli::try_parse_from([
            "riskbook",
            "--data-dir",
            "book",
            "var",
            "--method",
            "historical",
            "--marginal",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("book"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Var {
                method: commands::var::Method::Historical,
                marginal: true,
                backtest: false
            }
        ));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["riskbook", "credit-var", "--stressed"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("riskbook.toml"));
        assert_eq!(cli.date, None);
        assert!(matches!(cli.command, Commands::CreditVar { stressed: true }));
    }
}
