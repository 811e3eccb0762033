mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use leasing_core::{CalculatorConfig, RangePolicy};

use commands::commission::CommissionArgs;
use commands::offers::OfferStatusArgs;
use commands::pricing::{
    AuditLeaserArgs, CalculateArgs, CoefficientArgs, FinancedAmountArgs, ReverseArgs,
};

/// Leasing offer pricing, margins and commissions
#[derive(Parser)]
#[command(
    name = "lease-calc",
    version,
    about = "Leasing offer pricing, margins and commissions",
    long_about = "Prices IT equipment leasing offers with decimal precision. Looks up \
                  leaser coefficients, compares per-line margins with the global \
                  coefficient, reverse-prices monthly payments, audits rate tables, \
                  computes ambassador commissions and moves offers through their statuses."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Calculator configuration (JSON or YAML): default leaser and range policy
    #[arg(long, global = true)]
    config: Option<String>,

    /// Fail instead of falling back to the first range for out-of-range amounts
    #[arg(long, global = true)]
    strict_ranges: bool,

    /// Increase log verbosity (-v, -vv); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a leaser coefficient for a financed amount
    Coefficient(CoefficientArgs),
    /// Financed amount of a single equipment line
    FinancedAmount(FinancedAmountArgs),
    /// Price a full offer (per-line vs global coefficient)
    Calculate(CalculateArgs),
    /// Financed amount and margin behind a target monthly payment
    Reverse(ReverseArgs),
    /// Check a rate table for gaps, overlaps and bad coefficients
    AuditLeaser(AuditLeaserArgs),
    /// Ambassador commission for a financed amount
    Commission(CommissionArgs),
    /// Move an offer to a new status and record the change
    OfferStatus(OfferStatusArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn load_config(cli: &Cli) -> Result<CalculatorConfig, Box<dyn std::error::Error>> {
    let mut config = match cli.config {
        Some(ref path) => input::file::read_structured::<CalculatorConfig>(path)?,
        None => CalculatorConfig::default(),
    };
    if cli.strict_ranges {
        config = config.with_range_policy(RangePolicy::Strict);
    }
    config.validate()?;
    tracing::debug!(
        default_leaser = %config.default_leaser.name,
        policy = ?config.range_policy,
        "configuration loaded"
    );
    Ok(config)
}

fn main() {
    let cli = Cli::parse();
    logging::initialize(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Coefficient(args) => commands::pricing::run_coefficient(args, &config),
        Commands::FinancedAmount(args) => commands::pricing::run_financed_amount(args),
        Commands::Calculate(args) => commands::pricing::run_calculate(args, &config),
        Commands::Reverse(args) => commands::pricing::run_reverse(args, &config),
        Commands::AuditLeaser(args) => commands::pricing::run_audit_leaser(args, &config),
        Commands::Commission(args) => commands::commission::run_commission(args),
        Commands::OfferStatus(args) => commands::offers::run_offer_status(args),
        Commands::Version => {
            println!("lease-calc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
