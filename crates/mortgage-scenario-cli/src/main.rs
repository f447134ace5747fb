mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::quick::{BuydownArgs, PaymentArgs};
use commands::scenario::{CalculateArgs, ValidateArgs};

/// Deterministic mortgage scenario modeling
#[derive(Parser)]
#[command(
    name = "msc",
    version,
    about = "Deterministic mortgage scenario calculations",
    long_about = "A CLI for modeling mortgage scenarios with decimal precision: \
                  monthly payments, mortgage insurance, closing costs, buydown \
                  schedules, DTI/DSCR qualification, cash to close, and rule-based \
                  validation against configurable loan-program limits."
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
    /// Run the full calculation pipeline over a scenario
    Calculate(CalculateArgs),
    /// Validate a scenario against loan-program rules
    Validate(ValidateArgs),
    /// Quick level-payment calculation
    Payment(PaymentArgs),
    /// Preview a temporary-buydown schedule
    Buydown(BuydownArgs),
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
        Commands::Calculate(args) => commands::scenario::run_calculate(args),
        Commands::Validate(args) => commands::scenario::run_validate(args),
        Commands::Payment(args) => commands::quick::run_payment(args),
        Commands::Buydown(args) => commands::quick::run_buydown(args),
        Commands::Version => {
            println!("msc {}", env!("CARGO_PKG_VERSION"));
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
