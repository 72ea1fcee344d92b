mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::pd::PdArgs;
use commands::scenarios::ScenariosArgs;
use commands::score::ScoreArgs;
use commands::stress::StressArgs;
use commands::validate::ValidateArgs;

/// ESG-integrated credit risk scoring and climate stress testing
#[derive(Parser)]
#[command(
    name = "esgcr",
    version,
    about = "ESG-integrated credit risk scoring and climate stress testing",
    long_about = "A CLI for corporate credit-default risk assessment with decimal \
                  precision. Applies EBA-style and climate-transition stress scenarios \
                  to a firm portfolio, computes weighted ESG risk scorecards with a \
                  stress-capital proxy, and fits a logistic PD model with and without \
                  ESG drivers."
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
    /// List the registered stress scenarios for a variant
    Scenarios(ScenariosArgs),
    /// Apply a stress scenario to a portfolio
    Stress(StressArgs),
    /// Rule-based ESG risk scorecard (optionally under a scenario)
    Score(ScoreArgs),
    /// Fit the logistic PD model and print baseline vs ESG-adjusted PDs
    Pd(PdArgs),
    /// Check a portfolio against the dataset contract
    Validate(ValidateArgs),
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
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args),
        Commands::Stress(args) => commands::stress::run_stress(args),
        Commands::Score(args) => commands::score::run_score(args),
        Commands::Pd(args) => commands::pd::run_pd(args),
        Commands::Validate(args) => commands::validate::run_validate(args),
        Commands::Version => {
            println!("esgcr {}", env!("CARGO_PKG_VERSION"));
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
