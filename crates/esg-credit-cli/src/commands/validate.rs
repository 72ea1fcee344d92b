use clap::Args;
use serde_json::Value;

use esg_credit_core::config::RiskThresholds;
use esg_credit_core::dataset;

/// Arguments for portfolio validation
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to JSON portfolio file
    #[arg(long)]
    pub input: Option<String>,

    /// Use the bundled DAX sample portfolio
    #[arg(long)]
    pub sample: bool,
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let firms = super::load_firms(&args.input, args.sample)?;
    let report = dataset::validate_portfolio(&firms, &RiskThresholds::default());
    Ok(serde_json::to_value(report)?)
}
