mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::energy::BalanceArgs;
use commands::metrics::{IrrArgs, NpvArgs};
use commands::tariff::SurchargeArgs;
use commands::viability::EvaluateArgs;

/// Solar/BESS project financial viability calculations
#[derive(Parser)]
#[command(
    name = "sva",
    version,
    about = "Solar/BESS project financial viability calculations",
    long_about = "A CLI for evaluating the financial viability of \
                  distributed-generation solar projects with decimal \
                  precision. Projects multi-year cash flows under a \
                  wire-use fee ramp and derives NPV, IRR, payback, LCOE, \
                  ROI, and profitability index."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full viability analysis for one project
    Evaluate(EvaluateArgs),
    /// Split monthly generation/consumption into the physical energy balance
    Balance(BalanceArgs),
    /// Look up the wire-use fee surcharge for a calendar year
    Surcharge(SurchargeArgs),
    /// Net Present Value of a cash-flow series
    Npv(NpvArgs),
    /// Internal Rate of Return of a cash-flow series
    Irr(IrrArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::viability::run_evaluate(args),
        Commands::Balance(args) => commands::energy::run_balance(args),
        Commands::Surcharge(args) => commands::tariff::run_surcharge(args),
        Commands::Npv(args) => commands::metrics::run_npv(args),
        Commands::Irr(args) => commands::metrics::run_irr(args),
        Commands::Version => {
            println!("sva {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
