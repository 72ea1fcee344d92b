//! Fixed model configuration: risk-driver weights, thresholds, and
//! loss-rate constants. All immutable once constructed; callers inject
//! these into the scoring functions rather than reading global state.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EsgCreditError;
use crate::types::Rate;
use crate::EsgCreditResult;

/// Loss rate applied to the rule-based StressCapital proxy.
/// Simplified regulatory proxy, not a Basel LGD.
pub const RULE_BASED_LOSS_RATE: Rate = dec!(0.5);

/// Loss rate applied to the statistical capital requirement.
pub const STATISTICAL_LOSS_RATE: Rate = dec!(0.45);

/// Weight tolerance when checking the convex-combination invariant.
pub const WEIGHT_TOLERANCE: Decimal = dec!(0.000000001);

/// Weights for the six rule-based risk drivers. Must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    /// Debt signals default risk.
    pub debt_to_equity: Decimal,
    /// Low interest coverage = cash flow trouble.
    pub interest_coverage: Decimal,
    /// High emissions = transition cost risk.
    pub carbon_intensity: Decimal,
    /// Rising emissions = future liability.
    pub emissions_trend: Decimal,
    /// Social issues = operational risk.
    pub social_score: Decimal,
    /// Weak governance = management risk.
    pub governance_score: Decimal,
}

impl Default for RiskWeights {
    fn default() -> Self {
        RiskWeights {
            debt_to_equity: dec!(0.35),
            interest_coverage: dec!(0.25),
            carbon_intensity: dec!(0.20),
            emissions_trend: dec!(0.10),
            social_score: dec!(0.05),
            governance_score: dec!(0.05),
        }
    }
}

impl RiskWeights {
    /// Enforce non-negative weights summing to 1.0 within tolerance.
    pub fn validate(&self) -> EsgCreditResult<()> {
        let all = [
            self.debt_to_equity,
            self.interest_coverage,
            self.carbon_intensity,
            self.emissions_trend,
            self.social_score,
            self.governance_score,
        ];
        if all.iter().any(|w| *w < Decimal::ZERO) {
            return Err(EsgCreditError::InvalidInput {
                field: "weights".into(),
                reason: "Risk weights must be non-negative.".into(),
            });
        }
        let sum: Decimal = all.iter().copied().sum();
        if (sum - Decimal::ONE).abs() > WEIGHT_TOLERANCE {
            return Err(EsgCreditError::InvalidInput {
                field: "weights".into(),
                reason: format!("Risk weights must sum to 1.0 (got {sum})."),
            });
        }
        Ok(())
    }
}

/// Fixed classification thresholds.
///
/// `high_risk_score` applies to the rule-based RiskScore and
/// `high_risk_pd` to the statistical PD; they threshold different
/// measures, so both are retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// RiskScore >= this => High Risk.
    pub high_risk_score: Decimal,
    /// PD > this => high-risk firm in the statistical variant.
    pub high_risk_pd: Decimal,
    /// CarbonIntensity above this (tCO2/EUR M) => High Emitter.
    pub high_emitter: Decimal,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds {
            high_risk_score: dec!(0.4),
            high_risk_pd: dec!(0.25),
            high_emitter: dec!(500),
        }
    }
}

/// Weights for the heuristic training label of the statistical model:
/// a weighted sum of normalized Debt/Equity, inverse InterestCoverage,
/// inverted ESG_Score, CarbonIntensity, and Volatility, thresholded at
/// `label_threshold`. The label is derived from a heuristic, not from
/// observed defaults; consumers are warned accordingly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelHeuristic {
    pub debt_to_equity: Decimal,
    pub interest_coverage: Decimal,
    pub esg_score: Decimal,
    pub carbon_intensity: Decimal,
    pub volatility: Decimal,
    pub label_threshold: Decimal,
}

impl Default for LabelHeuristic {
    fn default() -> Self {
        LabelHeuristic {
            debt_to_equity: dec!(0.30),
            interest_coverage: dec!(0.25),
            esg_score: dec!(0.15),
            carbon_intensity: dec!(0.15),
            volatility: dec!(0.15),
            label_threshold: dec!(0.35),
        }
    }
}

impl LabelHeuristic {
    pub fn validate(&self) -> EsgCreditResult<()> {
        let sum = self.debt_to_equity
            + self.interest_coverage
            + self.esg_score
            + self.carbon_intensity
            + self.volatility;
        if (sum - Decimal::ONE).abs() > WEIGHT_TOLERANCE {
            return Err(EsgCreditError::InvalidInput {
                field: "label_heuristic".into(),
                reason: format!("Label heuristic weights must sum to 1.0 (got {sum})."),
            });
        }
        if self.label_threshold <= Decimal::ZERO || self.label_threshold >= Decimal::ONE {
            return Err(EsgCreditError::InvalidInput {
                field: "label_threshold".into(),
                reason: "Label threshold must be strictly between 0 and 1.".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = RiskWeights::default();
        assert!(w.validate().is_ok());
        let sum = w.debt_to_equity
            + w.interest_coverage
            + w.carbon_intensity
            + w.emissions_trend
            + w.social_score
            + w.governance_score;
        assert_eq!(sum, Decimal::ONE);
    }

    #[test]
    fn test_weights_rejected_when_sum_off() {
        let mut w = RiskWeights::default();
        w.debt_to_equity = dec!(0.40);
        let err = w.validate().unwrap_err();
        match err {
            EsgCreditError::InvalidInput { field, .. } => assert_eq!(field, "weights"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut w = RiskWeights::default();
        w.social_score = dec!(-0.05);
        w.governance_score = dec!(0.15);
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_default_thresholds() {
        let t = RiskThresholds::default();
        assert_eq!(t.high_risk_score, dec!(0.4));
        assert_eq!(t.high_risk_pd, dec!(0.25));
        assert_eq!(t.high_emitter, dec!(500));
    }

    #[test]
    fn test_label_heuristic_defaults_valid() {
        assert!(LabelHeuristic::default().validate().is_ok());
    }

    #[test]
    fn test_label_threshold_bounds() {
        let mut h = LabelHeuristic::default();
        h.label_threshold = dec!(1.0);
        assert!(h.validate().is_err());
        h.label_threshold = dec!(0);
        assert!(h.validate().is_err());
    }
}
