mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::plan::PlanArgs;

/// Plan loan repayment with avalanche and snowball strategies
#[derive(Parser)]
#[command(
    name = "debtplan",
    version,
    about = "Plan loan repayment with avalanche and snowball strategies",
    long_about = "Simulates month-by-month repayment of a set of loans/EMIs with an \
                  extra monthly budget. Compares highest-rate-first (avalanche) and \
                  smallest-balance-first (snowball) against paying EMIs only, and \
                  reports the closure roadmap, interest saved and months saved."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log level for diagnostics on stderr (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full simulation (roadmap, suggestions, baseline, every strategy)
    Simulate(PlanArgs),
    /// Compare baseline, avalanche and snowball side by side
    Compare(PlanArgs),
    /// Summary for export: clamped savings, milestones, affordability
    Report(PlanArgs),
    /// Print a sample inputs file
    Sample,
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
    logging::init_logging(&cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::plan::run_simulate(args),
        Commands::Compare(args) => commands::plan::run_compare(args),
        Commands::Report(args) => commands::plan::run_report(args),
        Commands::Sample => commands::plan::run_sample(),
        Commands::Version => {
            println!("debtplan {}", env!("CARGO_PKG_VERSION"));
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
