use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use esg_credit_core::model::risk_score::{self, CapitalInput, RiskScoreInput};
use esg_credit_core::scenario::{self, ScenarioInput};

/// Arguments for the rule-based risk scorecard
#[derive(Args)]
pub struct ScoreArgs {
    /// Path to JSON portfolio file
    #[arg(long)]
    pub input: Option<String>,

    /// Use the bundled DAX sample portfolio
    #[arg(long)]
    pub sample: bool,

    /// Apply this scenario before scoring (see the `scenarios` subcommand)
    #[arg(long)]
    pub scenario: Option<String>,

    /// Scenario family used with --scenario: eba or climate
    #[arg(long, default_value = "eba")]
    pub variant: String,

    /// Carbon sensitivity in percent, used with --scenario
    #[arg(long)]
    pub sensitivity: Option<Decimal>,
}

pub fn run_score(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut firms = super::load_firms(&args.input, args.sample)?;

    if let Some(scenario_name) = args.scenario {
        let registry = super::registry_for(&args.variant)?;
        let stressed = scenario::apply_scenario(
            &registry,
            &ScenarioInput {
                firms,
                scenario: scenario_name,
                carbon_sensitivity: args.sensitivity,
                thresholds: None,
            },
        )?;
        firms = stressed.result.firms.into_iter().map(|f| f.firm).collect();
    }

    let scores = risk_score::calculate_risk_scores(&RiskScoreInput {
        firms: firms.clone(),
        weights: None,
        thresholds: None,
    })?;

    let mut value = serde_json::to_value(&scores)?;

    // Attach the stress-capital proxy when every row carries TotalAssets.
    if firms.iter().all(|f| f.total_assets.is_some()) {
        let capital = risk_score::estimate_capital(&CapitalInput {
            scores: scores.result.firms.iter().map(|f| f.risk_score).collect(),
            firms,
            loss_rate: None,
        })?;
        if let Value::Object(map) = &mut value {
            map.insert("capital".into(), serde_json::to_value(capital.result)?);
        }
    }

    Ok(value)
}
