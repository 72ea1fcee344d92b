use clap::Args;
use serde::Serialize;
use serde_json::Value;

use esg_credit_core::scenario::ScenarioDefinition;

/// Arguments for listing scenarios
#[derive(Args)]
pub struct ScenariosArgs {
    /// Scenario family: eba or climate
    #[arg(long, default_value = "eba")]
    pub variant: String,
}

#[derive(Serialize)]
struct ScenarioList {
    variant: String,
    required_columns: Vec<String>,
    scenarios: Vec<ScenarioDefinition>,
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let registry = super::registry_for(&args.variant)?;
    let list = ScenarioList {
        variant: args.variant.to_lowercase(),
        required_columns: registry
            .required_columns()
            .iter()
            .map(|c| c.header().to_string())
            .collect(),
        scenarios: registry.definitions().to_vec(),
    };
    Ok(serde_json::to_value(list)?)
}
