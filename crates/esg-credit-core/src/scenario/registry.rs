//! Fixed scenario registries for climate-transition stress testing.
//!
//! Two families are covered by one generalized definition: the EBA-style
//! regulatory set (carbon/coverage multipliers plus additive ESG shifts)
//! and the climate-transition severity ladder (carbon multipliers with
//! second-order EBIT-margin erosion). Registries are immutable after
//! construction; scenarios never mutate state, they only parameterize
//! the transform in [`crate::scenario::engine`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EsgCreditError;
use crate::types::Column;
use crate::EsgCreditResult;

/// One named stress scenario: multiplicative and additive adjustments
/// applied to a fixed subset of firm attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    /// Applied to CarbonIntensity (scaled further by the sensitivity knob).
    pub carbon_multiplier: Decimal,
    /// Applied to InterestCoverage (< 1 models a revenue shock).
    pub coverage_multiplier: Decimal,
    /// Added to EmissionsTrend before clamping to [-50, 50].
    pub emissions_trend_shift: Decimal,
    /// Added to SocialScore before clamping to [0, 100].
    pub social_shift: Decimal,
    /// Added to GovernanceScore before clamping to [0, 100].
    pub governance_shift: Decimal,
    /// When set, stressed carbon erodes EBIT margin by carbon/10000.
    pub margin_erosion: bool,
}

impl ScenarioDefinition {
    fn identity(name: &str) -> Self {
        ScenarioDefinition {
            name: name.to_string(),
            carbon_multiplier: Decimal::ONE,
            coverage_multiplier: Decimal::ONE,
            emissions_trend_shift: Decimal::ZERO,
            social_shift: Decimal::ZERO,
            governance_shift: Decimal::ZERO,
            margin_erosion: false,
        }
    }
}

/// Ordered, immutable set of named scenarios plus the column contract
/// the variant requires of every input row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRegistry {
    scenarios: Vec<ScenarioDefinition>,
    required_columns: Vec<Column>,
}

impl ScenarioRegistry {
    /// EBA 2025 regulatory stress set: Normal, Transition Stress
    /// (carbon cost hike + governance pressure), Physical Stress
    /// (revenue shock + social strain).
    pub fn eba_2025() -> Self {
        let mut transition = ScenarioDefinition::identity("Transition Stress");
        transition.carbon_multiplier = dec!(1.5);
        transition.emissions_trend_shift = dec!(10);
        transition.governance_shift = dec!(-5);

        let mut physical = ScenarioDefinition::identity("Physical Stress");
        physical.coverage_multiplier = dec!(0.9);
        physical.social_shift = dec!(-10);
        physical.emissions_trend_shift = dec!(-5);

        ScenarioRegistry {
            scenarios: vec![
                ScenarioDefinition::identity("Normal"),
                transition,
                physical,
            ],
            required_columns: vec![
                Column::DebtToEquity,
                Column::InterestCoverage,
                Column::CarbonIntensity,
                Column::EmissionsTrend,
                Column::SocialScore,
                Column::GovernanceScore,
            ],
        }
    }

    /// NGFS-style climate transition ladder with increasing carbon
    /// severity; each stressed scenario erodes EBIT margin through the
    /// carbon-cost channel.
    pub fn climate_transition() -> Self {
        let severities = [
            ("Orderly Transition", dec!(1.2)),
            ("Disorderly Transition", dec!(1.8)),
            ("Hot House World", dec!(2.5)),
        ];
        let mut scenarios = vec![ScenarioDefinition::identity("Normal")];
        for (name, multiplier) in severities {
            let mut def = ScenarioDefinition::identity(name);
            def.carbon_multiplier = multiplier;
            def.margin_erosion = true;
            scenarios.push(def);
        }
        ScenarioRegistry {
            scenarios,
            required_columns: vec![Column::CarbonIntensity, Column::EbitMargin],
        }
    }

    /// Look up a scenario; unknown names fail with the valid list.
    pub fn get(&self, name: &str) -> EsgCreditResult<&ScenarioDefinition> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| EsgCreditError::UnknownScenario {
                name: name.to_string(),
                valid: self.names(),
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.scenarios.iter().map(|s| s.name.clone()).collect()
    }

    pub fn definitions(&self) -> &[ScenarioDefinition] {
        &self.scenarios
    }

    pub fn required_columns(&self) -> &[Column] {
        &self.required_columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eba_registry_names_and_order() {
        let reg = ScenarioRegistry::eba_2025();
        assert_eq!(
            reg.names(),
            vec!["Normal", "Transition Stress", "Physical Stress"]
        );
    }

    #[test]
    fn test_climate_registry_severity_ladder() {
        let reg = ScenarioRegistry::climate_transition();
        assert_eq!(reg.get("Orderly Transition").unwrap().carbon_multiplier, dec!(1.2));
        assert_eq!(
            reg.get("Disorderly Transition").unwrap().carbon_multiplier,
            dec!(1.8)
        );
        assert_eq!(reg.get("Hot House World").unwrap().carbon_multiplier, dec!(2.5));
        assert!(reg.get("Hot House World").unwrap().margin_erosion);
    }

    #[test]
    fn test_normal_is_identity_in_both_registries() {
        for reg in [ScenarioRegistry::eba_2025(), ScenarioRegistry::climate_transition()] {
            let normal = reg.get("Normal").unwrap();
            assert_eq!(normal.carbon_multiplier, Decimal::ONE);
            assert_eq!(normal.coverage_multiplier, Decimal::ONE);
            assert_eq!(normal.emissions_trend_shift, Decimal::ZERO);
            assert_eq!(normal.social_shift, Decimal::ZERO);
            assert_eq!(normal.governance_shift, Decimal::ZERO);
            assert!(!normal.margin_erosion);
        }
    }

    #[test]
    fn test_transition_stress_effects() {
        let reg = ScenarioRegistry::eba_2025();
        let t = reg.get("Transition Stress").unwrap();
        assert_eq!(t.carbon_multiplier, dec!(1.5));
        assert_eq!(t.coverage_multiplier, Decimal::ONE);
        assert_eq!(t.emissions_trend_shift, dec!(10));
        assert_eq!(t.governance_shift, dec!(-5));
    }

    #[test]
    fn test_physical_stress_effects() {
        let reg = ScenarioRegistry::eba_2025();
        let p = reg.get("Physical Stress").unwrap();
        assert_eq!(p.carbon_multiplier, Decimal::ONE);
        assert_eq!(p.coverage_multiplier, dec!(0.9));
        assert_eq!(p.social_shift, dec!(-10));
        assert_eq!(p.emissions_trend_shift, dec!(-5));
    }

    #[test]
    fn test_unknown_scenario_enumerates_valid_names() {
        let reg = ScenarioRegistry::eba_2025();
        let err = reg.get("Meteor Strike").unwrap_err();
        match err {
            EsgCreditError::UnknownScenario { name, valid } => {
                assert_eq!(name, "Meteor Strike");
                assert_eq!(valid, vec!["Normal", "Transition Stress", "Physical Stress"]);
            }
            other => panic!("Expected UnknownScenario, got {:?}", other),
        }
        let msg = reg.get("Meteor Strike").unwrap_err().to_string();
        assert!(msg.contains("Transition Stress"));
        assert!(msg.contains("Physical Stress"));
    }
}
