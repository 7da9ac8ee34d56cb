mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::bond::{CalculateArgs, PriceArgs, ScheduleArgs};

/// Fixed-coupon bullet bond analytics
#[derive(Parser)]
#[command(
    name = "bondcalc",
    version,
    about = "Fixed-coupon bullet bond analytics",
    long_about = "A CLI for bond analytics with decimal precision. Computes current \
                  yield, yield-to-maturity (bisection or Newton-Raphson), total \
                  interest, premium/discount status, and the periodic cash-flow \
                  schedule."
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
    /// Full bond calculation: yields, totals, and cash-flow schedule
    Calculate(CalculateArgs),
    /// Cash-flow schedule only
    Schedule(ScheduleArgs),
    /// Present value at an explicit annual discount rate
    Price(PriceArgs),
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
        Commands::Calculate(args) => commands::bond::run_calculate(args),
        Commands::Schedule(args) => commands::bond::run_schedule(args),
        Commands::Price(args) => commands::bond::run_price(args),
        Commands::Version => {
            println!("bondcalc {}", env!("CARGO_PKG_VERSION"));
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
