//! Rule-based composite risk scoring.
//!
//! Converts a (possibly scenario-stressed) portfolio into per-firm
//! RiskScores via a fixed, auditable weighted sum of six normalized
//! drivers, plus a simplified stress-capital proxy.
//!
//! Normalization bases for the leverage, coverage, and carbon drivers
//! are computed per invocation from the current batch (max over the
//! rows passed in). A firm's score therefore depends on which other
//! firms share the batch; scenario comparisons are only valid within
//! the same batch composition. The ESG drivers use fixed affine maps
//! and are batch-independent.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{RiskThresholds, RiskWeights, RULE_BASED_LOSS_RATE};
use crate::error::EsgCreditError;
use crate::types::{
    require_columns, with_metadata, Column, ComputationOutput, FirmRecord, Money, Rate, RiskLevel,
};
use crate::EsgCreditResult;

const REQUIRED_COLUMNS: [Column; 6] = [
    Column::DebtToEquity,
    Column::InterestCoverage,
    Column::CarbonIntensity,
    Column::EmissionsTrend,
    Column::SocialScore,
    Column::GovernanceScore,
];

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScoreInput {
    pub firms: Vec<FirmRecord>,
    /// Driver weights; defaults to the EBA 2025 set when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<RiskWeights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<RiskThresholds>,
}

/// Per-driver weighted contributions to a firm's RiskScore.
/// Each entry is weight x normalized driver; they sum to the score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverContributions {
    pub debt: Decimal,
    pub interest: Decimal,
    pub carbon: Decimal,
    pub emissions_trend: Decimal,
    pub social: Decimal,
    pub governance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredFirm {
    pub ticker: String,
    pub industry: String,
    /// Composite risk, 0-1, higher is worse.
    pub risk_score: Decimal,
    pub risk_level: RiskLevel,
    pub contributions: DriverContributions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScoreOutput {
    pub firms: Vec<ScoredFirm>,
    pub high_risk_count: usize,
    /// Batch maxima the relative normalizations were computed against.
    pub normalization_bases: NormalizationBases,
}

/// The per-batch reduction the relative drivers are divided by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationBases {
    pub max_debt_to_equity: Decimal,
    pub max_inverse_coverage: Decimal,
    pub max_carbon_intensity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalInput {
    pub firms: Vec<FirmRecord>,
    /// Scores previously computed for the same batch, keyed by position.
    pub scores: Vec<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_rate: Option<Rate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmCapital {
    pub ticker: String,
    /// RiskScore x TotalAssets x loss rate.
    pub stress_capital: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalOutput {
    pub firms: Vec<FirmCapital>,
    pub total_stress_capital: Money,
    pub loss_rate: Rate,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score every firm in the batch. Fails fast on missing columns,
/// invalid weights, or non-positive interest coverage.
pub fn calculate_risk_scores(
    input: &RiskScoreInput,
) -> EsgCreditResult<ComputationOutput<RiskScoreOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.firms.is_empty() {
        return Err(EsgCreditError::InsufficientData(
            "At least one firm required".into(),
        ));
    }

    let weights = input.weights.clone().unwrap_or_default();
    weights.validate()?;
    let thresholds = input.thresholds.clone().unwrap_or_default();

    require_columns(&input.firms, &REQUIRED_COLUMNS)?;

    // Inverse coverage is undefined at zero and meaningless below it;
    // reject the batch rather than emit silent infinities.
    for firm in &input.firms {
        let coverage = firm.interest_coverage.unwrap_or_default();
        if coverage <= Decimal::ZERO {
            return Err(EsgCreditError::DivisionByZero {
                context: format!(
                    "InterestCoverage for '{}' is {coverage}; must be > 0",
                    firm.ticker
                ),
            });
        }
    }

    let bases = normalization_bases(&input.firms);
    if bases.max_carbon_intensity.is_zero() {
        warnings.push(
            "All carbon intensities are zero; CarbonNorm defined as 0 for the batch.".into(),
        );
    }
    if bases.max_debt_to_equity.is_zero() {
        warnings.push("All Debt/Equity ratios are zero; DebtNorm defined as 0.".into());
    }

    let mut firms = Vec::with_capacity(input.firms.len());
    let mut high_risk_count = 0usize;
    for firm in &input.firms {
        let contributions = driver_contributions(firm, &weights, &bases);
        let risk_score = contributions.debt
            + contributions.interest
            + contributions.carbon
            + contributions.emissions_trend
            + contributions.social
            + contributions.governance;
        let risk_level = if risk_score >= thresholds.high_risk_score {
            high_risk_count += 1;
            RiskLevel::HighRisk
        } else {
            RiskLevel::Safe
        };
        firms.push(ScoredFirm {
            ticker: firm.ticker.clone(),
            industry: firm.industry.clone(),
            risk_score,
            risk_level,
            contributions,
        });
    }

    let output = RiskScoreOutput {
        firms,
        high_risk_count,
        normalization_bases: bases,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "weights": weights,
        "high_risk_threshold": thresholds.high_risk_score.to_string(),
        "normalization": "leverage/coverage/carbon relative to batch max; \
                          ESG drivers via fixed affine maps",
        "batch_dependence": "scores are comparable only within one batch",
    });
    Ok(with_metadata(
        "EBA 2025 weighted ESG risk scorecard",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Stress-capital proxy: RiskScore x TotalAssets x loss rate.
/// A simplified regulatory placeholder, not a Basel calculation.
pub fn estimate_capital(input: &CapitalInput) -> EsgCreditResult<ComputationOutput<CapitalOutput>> {
    let start = Instant::now();

    if input.firms.len() != input.scores.len() {
        return Err(EsgCreditError::InvalidInput {
            field: "scores".into(),
            reason: "Must have one risk score per firm".into(),
        });
    }
    require_columns(&input.firms, &[Column::TotalAssets])?;

    let loss_rate = input.loss_rate.unwrap_or(RULE_BASED_LOSS_RATE);
    if loss_rate <= Decimal::ZERO || loss_rate > Decimal::ONE {
        return Err(EsgCreditError::InvalidInput {
            field: "loss_rate".into(),
            reason: format!("Loss rate must be in (0, 1] (got {loss_rate})."),
        });
    }

    let mut firms = Vec::with_capacity(input.firms.len());
    let mut total = Decimal::ZERO;
    for (firm, score) in input.firms.iter().zip(input.scores.iter()) {
        let assets = firm.total_assets.unwrap_or_default();
        let stress_capital = *score * assets * loss_rate;
        total += stress_capital;
        firms.push(FirmCapital {
            ticker: firm.ticker.clone(),
            stress_capital,
        });
    }

    let output = CapitalOutput {
        firms,
        total_stress_capital: total,
        loss_rate,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Stress capital proxy (RiskScore x assets x loss rate)",
        &serde_json::json!({
            "loss_rate": loss_rate.to_string(),
            "caveat": "simplified proxy, not a Basel capital calculation",
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn normalization_bases(firms: &[FirmRecord]) -> NormalizationBases {
    let mut max_debt = Decimal::ZERO;
    let mut max_inverse_coverage = Decimal::ZERO;
    let mut max_carbon = Decimal::ZERO;
    for firm in firms {
        let debt = firm.debt_to_equity.unwrap_or_default();
        if debt > max_debt {
            max_debt = debt;
        }
        // Coverage validated > 0 before this point.
        let inverse = Decimal::ONE / firm.interest_coverage.unwrap_or(Decimal::ONE);
        if inverse > max_inverse_coverage {
            max_inverse_coverage = inverse;
        }
        let carbon = firm.carbon_intensity.unwrap_or_default();
        if carbon > max_carbon {
            max_carbon = carbon;
        }
    }
    NormalizationBases {
        max_debt_to_equity: max_debt,
        max_inverse_coverage,
        max_carbon_intensity: max_carbon,
    }
}

/// 0/0 in a degenerate all-zero batch is defined as zero risk.
fn relative_norm(value: Decimal, base: Decimal) -> Decimal {
    if base.is_zero() {
        Decimal::ZERO
    } else {
        value / base
    }
}

fn driver_contributions(
    firm: &FirmRecord,
    weights: &RiskWeights,
    bases: &NormalizationBases,
) -> DriverContributions {
    let debt_norm = relative_norm(firm.debt_to_equity.unwrap_or_default(), bases.max_debt_to_equity);
    let interest_norm = relative_norm(
        Decimal::ONE / firm.interest_coverage.unwrap_or(Decimal::ONE),
        bases.max_inverse_coverage,
    );
    let carbon_norm = relative_norm(
        firm.carbon_intensity.unwrap_or_default(),
        bases.max_carbon_intensity,
    );
    // Fixed affine maps from the declared ESG domains onto [0, 1].
    let trend_norm = (firm.emissions_trend.unwrap_or_default() + dec!(50)) / dec!(100);
    let social_norm = (dec!(100) - firm.social_score.unwrap_or_default()) / dec!(100);
    let governance_norm = (dec!(100) - firm.governance_score.unwrap_or_default()) / dec!(100);

    DriverContributions {
        debt: weights.debt_to_equity * debt_norm,
        interest: weights.interest_coverage * interest_norm,
        carbon: weights.carbon_intensity * carbon_norm,
        emissions_trend: weights.emissions_trend * trend_norm,
        social: weights.social_score * social_norm,
        governance: weights.governance_score * governance_norm,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn firm(
        ticker: &str,
        debt: Decimal,
        coverage: Decimal,
        carbon: Decimal,
        trend: Decimal,
        social: Decimal,
        governance: Decimal,
    ) -> FirmRecord {
        let mut f = FirmRecord::new(ticker, "Industrial");
        f.debt_to_equity = Some(debt);
        f.interest_coverage = Some(coverage);
        f.carbon_intensity = Some(carbon);
        f.emissions_trend = Some(trend);
        f.social_score = Some(social);
        f.governance_score = Some(governance);
        f
    }

    fn two_firm_batch() -> Vec<FirmRecord> {
        vec![
            firm("LOW", dec!(0.3), dec!(9), dec!(50), dec!(-10), dec!(85), dec!(90)),
            firm("HIGH", dec!(1.8), dec!(2), dec!(900), dec!(20), dec!(40), dec!(45)),
        ]
    }

    fn score(firms: Vec<FirmRecord>) -> ComputationOutput<RiskScoreOutput> {
        calculate_risk_scores(&RiskScoreInput {
            firms,
            weights: None,
            thresholds: None,
        })
        .unwrap()
    }

    // -----------------------------------------------------------------------
    // Batch maximum firm collects the full relative norms.
    // -----------------------------------------------------------------------
    #[test]
    fn test_batch_max_firm_scores_highest() {
        let out = score(two_firm_batch());
        let high = &out.result.firms[1];

        // HIGH holds every batch max: debt, inverse coverage, carbon.
        assert_eq!(high.contributions.debt, dec!(0.35));
        assert_eq!(high.contributions.interest, dec!(0.25));
        assert_eq!(high.contributions.carbon, dec!(0.20));
        // (20+50)/100 = 0.7 * 0.10
        assert_eq!(high.contributions.emissions_trend, dec!(0.070));
        // (100-40)/100 = 0.6 * 0.05
        assert_eq!(high.contributions.social, dec!(0.030));
        assert_eq!(high.contributions.governance, dec!(0.0275));
        assert_eq!(high.risk_score, dec!(0.9275));
        assert_eq!(high.risk_level, RiskLevel::HighRisk);
    }

    #[test]
    fn test_contributions_sum_to_score() {
        let out = score(two_firm_batch());
        for f in &out.result.firms {
            let sum = f.contributions.debt
                + f.contributions.interest
                + f.contributions.carbon
                + f.contributions.emissions_trend
                + f.contributions.social
                + f.contributions.governance;
            assert_eq!(sum, f.risk_score);
        }
    }

    #[test]
    fn test_scores_within_unit_interval() {
        let out = score(two_firm_batch());
        for f in &out.result.firms {
            assert!(f.risk_score >= Decimal::ZERO && f.risk_score <= Decimal::ONE);
        }
    }

    #[test]
    fn test_threshold_consistency() {
        let out = score(two_firm_batch());
        for f in &out.result.firms {
            let expected = if f.risk_score >= dec!(0.4) {
                RiskLevel::HighRisk
            } else {
                RiskLevel::Safe
            };
            assert_eq!(f.risk_level, expected);
        }
        assert_eq!(out.result.high_risk_count, 1);
    }

    // -----------------------------------------------------------------------
    // Batch-relative normalization: same firm, different batch, different
    // score. Load-bearing design property, not an accident.
    // -----------------------------------------------------------------------
    #[test]
    fn test_score_depends_on_batch_composition() {
        let solo = score(vec![firm(
            "LOW",
            dec!(0.3),
            dec!(9),
            dec!(50),
            dec!(-10),
            dec!(85),
            dec!(90),
        )]);
        let paired = score(two_firm_batch());

        let solo_score = solo.result.firms[0].risk_score;
        let paired_score = paired.result.firms[0].risk_score;
        // Alone, LOW is its own batch max and carries full relative norms.
        assert!(solo_score > paired_score);
    }

    #[test]
    fn test_degenerate_all_zero_carbon_batch() {
        let mut firms = two_firm_batch();
        for f in &mut firms {
            f.carbon_intensity = Some(Decimal::ZERO);
        }
        let out = calculate_risk_scores(&RiskScoreInput {
            firms,
            weights: None,
            thresholds: None,
        })
        .unwrap();
        for f in &out.result.firms {
            assert_eq!(f.contributions.carbon, Decimal::ZERO);
        }
        assert!(out.warnings.iter().any(|w| w.contains("CarbonNorm")));
    }

    #[test]
    fn test_zero_interest_coverage_rejected() {
        let mut firms = two_firm_batch();
        firms[0].interest_coverage = Some(Decimal::ZERO);
        let err = calculate_risk_scores(&RiskScoreInput {
            firms,
            weights: None,
            thresholds: None,
        })
        .unwrap_err();
        match err {
            EsgCreditError::DivisionByZero { context } => {
                assert!(context.contains("LOW"));
            }
            other => panic!("Expected DivisionByZero, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_interest_coverage_rejected() {
        let mut firms = two_firm_batch();
        firms[1].interest_coverage = Some(dec!(-2.5));
        assert!(calculate_risk_scores(&RiskScoreInput {
            firms,
            weights: None,
            thresholds: None,
        })
        .is_err());
    }

    #[test]
    fn test_missing_columns_listed_exactly() {
        let mut firms = two_firm_batch();
        firms[0].emissions_trend = None;
        firms[1].governance_score = None;
        let err = calculate_risk_scores(&RiskScoreInput {
            firms,
            weights: None,
            thresholds: None,
        })
        .unwrap_err();
        match err {
            EsgCreditError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["EmissionsTrend", "GovernanceScore"]);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_weights_must_sum_to_one() {
        let mut weights = RiskWeights::default();
        weights.carbon_intensity = dec!(0.30);
        let err = calculate_risk_scores(&RiskScoreInput {
            firms: two_firm_batch(),
            weights: Some(weights),
            thresholds: None,
        })
        .unwrap_err();
        match err {
            EsgCreditError::InvalidInput { field, .. } => assert_eq!(field, "weights"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    // -----------------------------------------------------------------------
    // Capital proxy
    // -----------------------------------------------------------------------
    #[test]
    fn test_capital_formula_and_total() {
        let mut firms = two_firm_batch();
        firms[0].total_assets = Some(dec!(1_000_000));
        firms[1].total_assets = Some(dec!(2_000_000));
        let out = estimate_capital(&CapitalInput {
            firms,
            scores: vec![dec!(0.2), dec!(0.9)],
            loss_rate: None,
        })
        .unwrap();

        // 0.2 * 1M * 0.5 = 100k; 0.9 * 2M * 0.5 = 900k
        assert_eq!(out.result.firms[0].stress_capital, dec!(100_000.0));
        assert_eq!(out.result.firms[1].stress_capital, dec!(900_000.0));
        assert_eq!(out.result.total_stress_capital, dec!(1_000_000.0));
        assert_eq!(out.result.loss_rate, dec!(0.5));
    }

    #[test]
    fn test_capital_monotone_in_score() {
        let mut base = firm("A", dec!(1), dec!(5), dec!(100), dec!(0), dec!(70), dec!(70));
        base.total_assets = Some(dec!(10_000_000));
        let capital_at = |score: Decimal| {
            estimate_capital(&CapitalInput {
                firms: vec![base.clone()],
                scores: vec![score],
                loss_rate: None,
            })
            .unwrap()
            .result
            .firms[0]
                .stress_capital
        };
        assert!(capital_at(dec!(0.5)) > capital_at(dec!(0.4)));
        assert!(capital_at(dec!(0.4)) > capital_at(dec!(0.1)));
    }

    #[test]
    fn test_capital_requires_total_assets() {
        let firms = two_firm_batch();
        let err = estimate_capital(&CapitalInput {
            firms,
            scores: vec![dec!(0.2), dec!(0.9)],
            loss_rate: None,
        })
        .unwrap_err();
        match err {
            EsgCreditError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["TotalAssets"]);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_capital_score_count_mismatch_rejected() {
        let err = estimate_capital(&CapitalInput {
            firms: two_firm_batch(),
            scores: vec![dec!(0.2)],
            loss_rate: None,
        })
        .unwrap_err();
        match err {
            EsgCreditError::InvalidInput { field, .. } => assert_eq!(field, "scores"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }
}
