use napi::Result as NapiResult;
use napi_derive::napi;

use esg_credit_core::config::RiskThresholds;
use esg_credit_core::dataset;
use esg_credit_core::model::pd_model::{PdModel, PdModelConfig};
use esg_credit_core::model::risk_score;
use esg_credit_core::scenario::{self, ScenarioRegistry};
use esg_credit_core::types::FirmRecord;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn registry_for(variant: &str) -> NapiResult<ScenarioRegistry> {
    match variant.to_lowercase().as_str() {
        "eba" => Ok(ScenarioRegistry::eba_2025()),
        "climate" => Ok(ScenarioRegistry::climate_transition()),
        other => Err(to_napi_error(format!(
            "Unknown variant '{}'. Available variants: eba, climate",
            other
        ))),
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn list_scenarios(variant: String) -> NapiResult<String> {
    let registry = registry_for(&variant)?;
    serde_json::to_string(registry.definitions()).map_err(to_napi_error)
}

#[napi]
pub fn apply_scenario(variant: String, input_json: String) -> NapiResult<String> {
    let registry = registry_for(&variant)?;
    let input: scenario::ScenarioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = scenario::apply_scenario(&registry, &input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rule-based scoring
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_risk_scores(input_json: String) -> NapiResult<String> {
    let input: risk_score::RiskScoreInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = risk_score::calculate_risk_scores(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn estimate_capital(input_json: String) -> NapiResult<String> {
    let input: risk_score::CapitalInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = risk_score::estimate_capital(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Statistical PD model
// ---------------------------------------------------------------------------

/// One-shot fit-and-predict: trains on the supplied portfolio and
/// returns baseline and ESG-adjusted PDs per firm plus the fit summary.
#[napi]
pub fn fit_and_predict_pd(firms_json: String, include_esg: bool) -> NapiResult<String> {
    let firms: Vec<FirmRecord> = serde_json::from_str(&firms_json).map_err(to_napi_error)?;
    let mut model = PdModel::new(PdModelConfig::default());
    let fit = model.fit(&firms).map_err(to_napi_error)?;
    let pds = model.predict_pd(&firms, include_esg).map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({
        "fit": fit,
        "pds": pds,
    }))
    .map_err(to_napi_error)
}

#[napi]
pub fn pd_capital_requirement(firms_json: String, include_esg: bool) -> NapiResult<String> {
    let firms: Vec<FirmRecord> = serde_json::from_str(&firms_json).map_err(to_napi_error)?;
    let mut model = PdModel::new(PdModelConfig::default());
    model.fit(&firms).map_err(to_napi_error)?;
    let output = model
        .calculate_capital(&firms, include_esg)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[napi]
pub fn validate_portfolio(firms_json: String) -> NapiResult<String> {
    let firms: Vec<FirmRecord> = serde_json::from_str(&firms_json).map_err(to_napi_error)?;
    let report = dataset::validate_portfolio(&firms, &RiskThresholds::default());
    serde_json::to_string(&report).map_err(to_napi_error)
}

#[napi]
pub fn sample_portfolio() -> NapiResult<String> {
    serde_json::to_string(&dataset::dax_sample_portfolio()).map_err(to_napi_error)
}
