//! Scenario application: base portfolio in, stressed copy out.
//!
//! The transform never mutates its input. Each call works on an
//! independent copy, so the same base portfolio can be stressed under
//! several scenarios for before/after comparison without
//! cross-contamination.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::RiskThresholds;
use crate::error::EsgCreditError;
use crate::scenario::registry::{ScenarioDefinition, ScenarioRegistry};
use crate::types::{require_columns, with_metadata, ComputationOutput, FirmRecord};
use crate::EsgCreditResult;

const SENSITIVITY_DEFAULT: Decimal = dec!(100);
const SENSITIVITY_LOW: Decimal = dec!(50);
const SENSITIVITY_HIGH: Decimal = dec!(300);

const EMISSIONS_TREND_MIN: Decimal = dec!(-50);
const EMISSIONS_TREND_MAX: Decimal = dec!(50);
const SCORE_MIN: Decimal = dec!(0);
const SCORE_MAX: Decimal = dec!(100);

/// Divisor turning stressed carbon intensity into EBIT-margin erosion.
const MARGIN_EROSION_DIVISOR: Decimal = dec!(10000);

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub firms: Vec<FirmRecord>,
    /// Must be a key of the registry the engine is invoked with.
    pub scenario: String,
    /// Percentage multiplier on the carbon stress (100 = as configured).
    /// Values <= 0 are rejected; values outside 50-300 warn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_sensitivity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<RiskThresholds>,
}

/// A firm row after scenario adjustment, stamped for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressedFirm {
    #[serde(flatten)]
    pub firm: FirmRecord,
    /// Stressed CarbonIntensity exceeds the high-emitter threshold.
    pub high_emitter: bool,
    /// The scenario that produced this row.
    pub scenario: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutput {
    pub scenario: String,
    pub carbon_sensitivity: Decimal,
    pub high_emitter_count: usize,
    pub firms: Vec<StressedFirm>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Apply a named scenario to a portfolio, producing a stressed copy
/// with the same row count and ticker set.
pub fn apply_scenario(
    registry: &ScenarioRegistry,
    input: &ScenarioInput,
) -> EsgCreditResult<ComputationOutput<ScenarioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.firms.is_empty() {
        return Err(EsgCreditError::InsufficientData(
            "At least one firm required".into(),
        ));
    }

    let sensitivity = resolve_sensitivity(input.carbon_sensitivity, &mut warnings)?;
    let definition = registry.get(&input.scenario)?;
    require_columns(&input.firms, registry.required_columns())?;

    let thresholds = input.thresholds.clone().unwrap_or_default();

    let mut firms = Vec::with_capacity(input.firms.len());
    let mut high_emitter_count = 0usize;
    for firm in &input.firms {
        let stressed = stress_firm(firm, definition, sensitivity, &thresholds);
        if stressed.high_emitter {
            high_emitter_count += 1;
        }
        firms.push(stressed);
    }

    let output = ScenarioOutput {
        scenario: definition.name.clone(),
        carbon_sensitivity: sensitivity,
        high_emitter_count,
        firms,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "scenario": definition,
        "carbon_sensitivity_pct": sensitivity.to_string(),
        "high_emitter_threshold": thresholds.high_emitter.to_string(),
        "clamped_domains": {
            "SocialScore": "[0, 100]",
            "GovernanceScore": "[0, 100]",
            "EmissionsTrend": "[-50, 50]"
        },
    });
    Ok(with_metadata(
        "Climate scenario stress transform",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

fn resolve_sensitivity(
    sensitivity: Option<Decimal>,
    warnings: &mut Vec<String>,
) -> EsgCreditResult<Decimal> {
    let value = sensitivity.unwrap_or(SENSITIVITY_DEFAULT);
    if value <= Decimal::ZERO {
        return Err(EsgCreditError::InvalidInput {
            field: "carbon_sensitivity".into(),
            reason: format!("Sensitivity must be positive (got {value})."),
        });
    }
    if !(SENSITIVITY_LOW..=SENSITIVITY_HIGH).contains(&value) {
        warnings.push(format!(
            "Carbon sensitivity {value}% outside the calibrated 50-300% range."
        ));
    }
    Ok(value)
}

fn stress_firm(
    firm: &FirmRecord,
    definition: &ScenarioDefinition,
    sensitivity: Decimal,
    thresholds: &RiskThresholds,
) -> StressedFirm {
    let mut out = firm.clone();

    if let Some(carbon) = out.carbon_intensity {
        let stressed =
            carbon * definition.carbon_multiplier * (sensitivity / SENSITIVITY_DEFAULT);
        out.carbon_intensity = Some(stressed);
        if definition.margin_erosion {
            if let Some(margin) = out.ebit_margin {
                out.ebit_margin = Some(margin - stressed / MARGIN_EROSION_DIVISOR);
            }
        }
    }

    if let Some(coverage) = out.interest_coverage {
        out.interest_coverage = Some(coverage * definition.coverage_multiplier);
    }

    if let Some(trend) = out.emissions_trend {
        out.emissions_trend = Some(clamp(
            trend + definition.emissions_trend_shift,
            EMISSIONS_TREND_MIN,
            EMISSIONS_TREND_MAX,
        ));
    }
    if let Some(social) = out.social_score {
        out.social_score = Some(clamp(social + definition.social_shift, SCORE_MIN, SCORE_MAX));
    }
    if let Some(governance) = out.governance_score {
        out.governance_score = Some(clamp(
            governance + definition.governance_shift,
            SCORE_MIN,
            SCORE_MAX,
        ));
    }

    let high_emitter = out
        .carbon_intensity
        .map(|c| c > thresholds.high_emitter)
        .unwrap_or(false);

    StressedFirm {
        firm: out,
        high_emitter,
        scenario: definition.name.clone(),
    }
}

fn clamp(value: Decimal, min: Decimal, max: Decimal) -> Decimal {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn eba_firm() -> FirmRecord {
        let mut f = FirmRecord::new("BAS.DE", "Chemicals");
        f.debt_to_equity = Some(dec!(0.65));
        f.interest_coverage = Some(dec!(5.0));
        f.carbon_intensity = Some(dec!(500));
        f.emissions_trend = Some(dec!(0));
        f.social_score = Some(dec!(60));
        f.governance_score = Some(dec!(80));
        f.total_assets = Some(dec!(85_400_000_000));
        f
    }

    fn climate_firm() -> FirmRecord {
        let mut f = FirmRecord::new("SAP", "Technology");
        f.carbon_intensity = Some(dec!(100));
        f.ebit_margin = Some(dec!(0.20));
        f
    }

    fn eba_input(scenario: &str) -> ScenarioInput {
        ScenarioInput {
            firms: vec![eba_firm()],
            scenario: scenario.into(),
            carbon_sensitivity: None,
            thresholds: None,
        }
    }

    // -----------------------------------------------------------------------
    // Worked example from the EBA variant: Transition Stress on a firm
    // with carbon 500, coverage 5.0, trend 0, governance 80.
    // -----------------------------------------------------------------------
    #[test]
    fn test_transition_stress_worked_example() {
        let registry = ScenarioRegistry::eba_2025();
        let result = apply_scenario(&registry, &eba_input("Transition Stress")).unwrap();
        let row = &result.result.firms[0];

        assert_eq!(row.firm.carbon_intensity, Some(dec!(750.00)));
        assert_eq!(row.firm.interest_coverage, Some(dec!(5.0)));
        assert_eq!(row.firm.emissions_trend, Some(dec!(10)));
        assert_eq!(row.firm.governance_score, Some(dec!(75)));
        assert!(row.high_emitter, "750 > 500 must flag a high emitter");
        assert_eq!(row.scenario, "Transition Stress");
        assert_eq!(result.result.high_emitter_count, 1);
    }

    // -----------------------------------------------------------------------
    // Worked example from the climate variant: Disorderly Transition
    // (x1.8) at sensitivity 100 on carbon 100, margin 0.20.
    // -----------------------------------------------------------------------
    #[test]
    fn test_disorderly_transition_worked_example() {
        let registry = ScenarioRegistry::climate_transition();
        let input = ScenarioInput {
            firms: vec![climate_firm()],
            scenario: "Disorderly Transition".into(),
            carbon_sensitivity: Some(dec!(100)),
            thresholds: None,
        };
        let result = apply_scenario(&registry, &input).unwrap();
        let row = &result.result.firms[0];

        assert_eq!(row.firm.carbon_intensity, Some(dec!(180.0)));
        // 0.20 - 180/10000 = 0.182
        assert_eq!(row.firm.ebit_margin, Some(dec!(0.182)));
    }

    #[test]
    fn test_sensitivity_scales_carbon_stress() {
        let registry = ScenarioRegistry::climate_transition();
        let input = ScenarioInput {
            firms: vec![climate_firm()],
            scenario: "Orderly Transition".into(),
            carbon_sensitivity: Some(dec!(200)),
            thresholds: None,
        };
        let result = apply_scenario(&registry, &input).unwrap();
        // 100 * 1.2 * 2.0 = 240
        assert_eq!(result.result.firms[0].firm.carbon_intensity, Some(dec!(240.0)));
    }

    #[test]
    fn test_normal_is_identity_at_default_sensitivity() {
        let registry = ScenarioRegistry::eba_2025();
        let base = eba_firm();
        let result = apply_scenario(&registry, &eba_input("Normal")).unwrap();
        let row = &result.result.firms[0];

        assert_eq!(row.firm.carbon_intensity, base.carbon_intensity);
        assert_eq!(row.firm.interest_coverage, base.interest_coverage);
        assert_eq!(row.firm.emissions_trend, base.emissions_trend);
        assert_eq!(row.firm.social_score, base.social_score);
        assert_eq!(row.firm.governance_score, base.governance_score);
        assert!(!row.high_emitter, "500 is not strictly above the threshold");
    }

    #[test]
    fn test_physical_stress_revenue_shock() {
        let registry = ScenarioRegistry::eba_2025();
        let result = apply_scenario(&registry, &eba_input("Physical Stress")).unwrap();
        let row = &result.result.firms[0];

        assert_eq!(row.firm.interest_coverage, Some(dec!(4.50)));
        assert_eq!(row.firm.carbon_intensity, Some(dec!(500)));
        assert_eq!(row.firm.social_score, Some(dec!(50)));
        assert_eq!(row.firm.emissions_trend, Some(dec!(-5)));
    }

    #[test]
    fn test_clamping_is_enforced_even_for_out_of_range_inputs() {
        let registry = ScenarioRegistry::eba_2025();
        let mut firm = eba_firm();
        firm.social_score = Some(dec!(105));
        firm.governance_score = Some(dec!(2));
        firm.emissions_trend = Some(dec!(48));
        let input = ScenarioInput {
            firms: vec![firm],
            scenario: "Transition Stress".into(),
            carbon_sensitivity: None,
            thresholds: None,
        };
        let row = &apply_scenario(&registry, &input).unwrap().result.firms[0];

        assert_eq!(row.firm.social_score, Some(dec!(100)));
        // 2 - 5 clamps at the floor
        assert_eq!(row.firm.governance_score, Some(dec!(0)));
        // 48 + 10 clamps at the ceiling
        assert_eq!(row.firm.emissions_trend, Some(dec!(50)));
    }

    #[test]
    fn test_input_is_never_mutated_and_order_independent() {
        let registry = ScenarioRegistry::eba_2025();
        let input = eba_input("Transition Stress");
        let before = serde_json::to_value(&input.firms).unwrap();

        let first = apply_scenario(&registry, &input).unwrap();
        let after_first = serde_json::to_value(&input.firms).unwrap();
        assert_eq!(before, after_first, "apply_scenario must not mutate its input");

        // Applying a different scenario in between must not change results.
        let mut physical = eba_input("Physical Stress");
        physical.firms = input.firms.clone();
        let _ = apply_scenario(&registry, &physical).unwrap();
        let second = apply_scenario(&registry, &input).unwrap();
        assert_eq!(
            serde_json::to_value(&first.result.firms).unwrap(),
            serde_json::to_value(&second.result.firms).unwrap()
        );
    }

    #[test]
    fn test_row_count_and_identity_preserved() {
        let registry = ScenarioRegistry::eba_2025();
        let mut other = eba_firm();
        other.ticker = "SIE.DE".into();
        let input = ScenarioInput {
            firms: vec![eba_firm(), other],
            scenario: "Physical Stress".into(),
            carbon_sensitivity: None,
            thresholds: None,
        };
        let result = apply_scenario(&registry, &input).unwrap();
        let tickers: Vec<&str> = result
            .result
            .firms
            .iter()
            .map(|f| f.firm.ticker.as_str())
            .collect();
        assert_eq!(tickers, vec!["BAS.DE", "SIE.DE"]);
    }

    #[test]
    fn test_unknown_scenario_rejected_with_valid_names() {
        let registry = ScenarioRegistry::eba_2025();
        let err = apply_scenario(&registry, &eba_input("Stagflation")).unwrap_err();
        match err {
            EsgCreditError::UnknownScenario { name, valid } => {
                assert_eq!(name, "Stagflation");
                assert!(valid.contains(&"Normal".to_string()));
            }
            other => panic!("Expected UnknownScenario, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_columns_rejected_before_computation() {
        let registry = ScenarioRegistry::eba_2025();
        let mut firm = eba_firm();
        firm.social_score = None;
        firm.governance_score = None;
        let input = ScenarioInput {
            firms: vec![firm],
            scenario: "Normal".into(),
            carbon_sensitivity: None,
            thresholds: None,
        };
        let err = apply_scenario(&registry, &input).unwrap_err();
        match err {
            EsgCreditError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["SocialScore", "GovernanceScore"]);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_sensitivity_rejected() {
        let registry = ScenarioRegistry::climate_transition();
        let input = ScenarioInput {
            firms: vec![climate_firm()],
            scenario: "Orderly Transition".into(),
            carbon_sensitivity: Some(dec!(0)),
            thresholds: None,
        };
        let err = apply_scenario(&registry, &input).unwrap_err();
        match err {
            EsgCreditError::InvalidInput { field, .. } => {
                assert_eq!(field, "carbon_sensitivity");
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_band_sensitivity_warns_but_runs() {
        let registry = ScenarioRegistry::climate_transition();
        let input = ScenarioInput {
            firms: vec![climate_firm()],
            scenario: "Orderly Transition".into(),
            carbon_sensitivity: Some(dec!(400)),
            thresholds: None,
        };
        let result = apply_scenario(&registry, &input).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("outside the calibrated 50-300%")));
        // 100 * 1.2 * 4 = 480
        assert_eq!(result.result.firms[0].firm.carbon_intensity, Some(dec!(480.0)));
    }

    #[test]
    fn test_empty_portfolio_rejected() {
        let registry = ScenarioRegistry::eba_2025();
        let input = ScenarioInput {
            firms: vec![],
            scenario: "Normal".into(),
            carbon_sensitivity: None,
            thresholds: None,
        };
        assert!(apply_scenario(&registry, &input).is_err());
    }
}
