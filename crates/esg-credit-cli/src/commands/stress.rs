use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use esg_credit_core::scenario::{self, ScenarioInput};

/// Arguments for scenario stress application
#[derive(Args)]
pub struct StressArgs {
    /// Path to JSON portfolio file
    #[arg(long)]
    pub input: Option<String>,

    /// Use the bundled DAX sample portfolio
    #[arg(long)]
    pub sample: bool,

    /// Scenario family: eba or climate
    #[arg(long, default_value = "eba")]
    pub variant: String,

    /// Scenario name (see the `scenarios` subcommand)
    #[arg(long)]
    pub scenario: String,

    /// Carbon sensitivity in percent (calibrated range 50-300)
    #[arg(long)]
    pub sensitivity: Option<Decimal>,
}

pub fn run_stress(args: StressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let registry = super::registry_for(&args.variant)?;
    let firms = super::load_firms(&args.input, args.sample)?;
    let input = ScenarioInput {
        firms,
        scenario: args.scenario,
        carbon_sensitivity: args.sensitivity,
        thresholds: None,
    };
    let result = scenario::apply_scenario(&registry, &input)?;
    Ok(serde_json::to_value(result)?)
}
