pub mod pd;
pub mod scenarios;
pub mod score;
pub mod stress;
pub mod validate;

use serde::Deserialize;
use serde_json::Value;

use esg_credit_core::dataset;
use esg_credit_core::scenario::ScenarioRegistry;
use esg_credit_core::types::FirmRecord;

use crate::input;

#[derive(Deserialize)]
struct PortfolioFile {
    firms: Vec<FirmRecord>,
}

/// Resolve the portfolio for a command: bundled sample, JSON file, or
/// piped stdin, in that order of precedence.
pub(crate) fn load_firms(
    input_path: &Option<String>,
    sample: bool,
) -> Result<Vec<FirmRecord>, Box<dyn std::error::Error>> {
    if sample {
        return Ok(dataset::dax_sample_portfolio().firms);
    }
    let value = if let Some(path) = input_path {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json>, piped stdin, or --sample required".into());
    };
    firms_from_value(value)
}

/// Accept either a bare JSON array of firm rows or an object with a
/// "firms" field (the portfolio file shape).
fn firms_from_value(value: Value) -> Result<Vec<FirmRecord>, Box<dyn std::error::Error>> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(ref map) if map.contains_key("firms") => {
            let portfolio: PortfolioFile = serde_json::from_value(value)?;
            Ok(portfolio.firms)
        }
        _ => Err("Expected a JSON array of firms or an object with a 'firms' field".into()),
    }
}

pub(crate) fn registry_for(variant: &str) -> Result<ScenarioRegistry, Box<dyn std::error::Error>> {
    match variant.to_lowercase().as_str() {
        "eba" => Ok(ScenarioRegistry::eba_2025()),
        "climate" => Ok(ScenarioRegistry::climate_transition()),
        other => Err(format!("Unknown variant '{}'. Available variants: eba, climate", other).into()),
    }
}
