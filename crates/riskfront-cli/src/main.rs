mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::compare::CompareArgs;
use commands::estimate::EstimateArgs;
use commands::frontier::FrontierArgs;
use commands::hrp::HrpArgs;

/// Monte Carlo efficient frontier and Hierarchical Risk Parity allocation
#[derive(Parser)]
#[command(
    name = "riskfront",
    version,
    about = "Monte Carlo efficient frontier and Hierarchical Risk Parity allocation",
    long_about = "Estimate annualized returns and covariance from a price history, sample \
                  random long-only portfolios to trace the efficient frontier, and compute \
                  Hierarchical Risk Parity weights for comparison. Set RUST_LOG to change \
                  log verbosity (logs go to stderr)."
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
    /// Annualized mean returns and covariance from prices
    Estimate(EstimateArgs),
    /// Monte Carlo efficient frontier with max-Sharpe and min-volatility picks
    Frontier(FrontierArgs),
    /// Hierarchical Risk Parity weights
    Hrp(HrpArgs),
    /// Frontier and HRP side by side on one price history
    Compare(CompareArgs),
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

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("riskfront=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Estimate(args) => commands::estimate::run_estimate(args),
        Commands::Frontier(args) => commands::frontier::run_frontier(args),
        Commands::Hrp(args) => commands::hrp::run_hrp(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Version => {
            println!("riskfront {}", env!("CARGO_PKG_VERSION"));
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
