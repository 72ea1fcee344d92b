//! Portfolio health check run before scoring or stressing.
//!
//! The validator never fails: it returns a structured report the
//! caller can print or inspect. Hard problems (missing required
//! columns, out-of-range ESG values, duplicate tickers) land in
//! `errors` and clear the `valid` flag; gaps the models can tolerate
//! land in `warnings`.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::RiskThresholds;
use crate::types::{Column, FirmRecord};

/// Columns every scoring and stress path relies on.
const REQUIRED_COLUMNS: [Column; 6] = [
    Column::DebtToEquity,
    Column::InterestCoverage,
    Column::CarbonIntensity,
    Column::EmissionsTrend,
    Column::SocialScore,
    Column::GovernanceScore,
];

/// Optional columns worth flagging when sparsely populated.
const OPTIONAL_COLUMNS: [Column; 5] = [
    Column::EbitMargin,
    Column::Roa,
    Column::EsgScore,
    Column::Volatility,
    Column::TotalAssets,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub firm_count: usize,
    /// Firms with CarbonIntensity strictly above the high-emitter threshold.
    pub high_emitter_count: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Inspect a portfolio against the dataset contract.
pub fn validate_portfolio(firms: &[FirmRecord], thresholds: &RiskThresholds) -> ValidationReport {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if firms.is_empty() {
        errors.push("Portfolio is empty".into());
        return ValidationReport {
            valid: false,
            firm_count: 0,
            high_emitter_count: 0,
            errors,
            warnings,
        };
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for firm in firms {
        if !seen.insert(firm.ticker.as_str()) {
            errors.push(format!("Duplicate ticker '{}'", firm.ticker));
        }
    }

    for column in &REQUIRED_COLUMNS {
        let absent: Vec<&str> = firms
            .iter()
            .filter(|f| f.column(*column).is_none())
            .map(|f| f.ticker.as_str())
            .collect();
        if !absent.is_empty() {
            errors.push(format!(
                "Required column '{}' missing for: {}",
                column.header(),
                absent.join(", ")
            ));
        }
    }

    for column in &OPTIONAL_COLUMNS {
        let absent = firms.iter().filter(|f| f.column(*column).is_none()).count();
        if absent > 0 {
            warnings.push(format!(
                "Optional column '{}' absent on {absent} of {} firms",
                column.header(),
                firms.len()
            ));
        }
    }

    for firm in firms {
        if let Some(trend) = firm.emissions_trend {
            if trend < dec!(-50) || trend > dec!(50) {
                errors.push(format!(
                    "EmissionsTrend for '{}' is {trend}; expected [-50, 50]",
                    firm.ticker
                ));
            }
        }
        for (column, value) in [
            (Column::SocialScore, firm.social_score),
            (Column::GovernanceScore, firm.governance_score),
            (Column::EsgScore, firm.esg_score),
        ] {
            if let Some(v) = value {
                if v < dec!(0) || v > dec!(100) {
                    errors.push(format!(
                        "{} for '{}' is {v}; expected [0, 100]",
                        column.header(),
                        firm.ticker
                    ));
                }
            }
        }
        if let Some(coverage) = firm.interest_coverage {
            if coverage <= dec!(0) {
                errors.push(format!(
                    "InterestCoverage for '{}' is {coverage}; must be > 0",
                    firm.ticker
                ));
            }
        }
        if let Some(debt) = firm.debt_to_equity {
            if debt < dec!(0) {
                warnings.push(format!(
                    "Debt/Equity for '{}' is negative ({debt})",
                    firm.ticker
                ));
            }
        }
    }

    let high_emitter_count = firms
        .iter()
        .filter(|f| {
            f.carbon_intensity
                .map(|c| c > thresholds.high_emitter)
                .unwrap_or(false)
        })
        .count();

    ValidationReport {
        valid: errors.is_empty(),
        firm_count: firms.len(),
        high_emitter_count,
        errors,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample::dax_sample_portfolio;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sample_portfolio_is_valid() {
        let portfolio = dax_sample_portfolio();
        let report = validate_portfolio(&portfolio.firms, &RiskThresholds::default());
        assert!(report.valid, "errors: {:?}", report.errors);
        assert_eq!(report.firm_count, 10);
        // BAS.DE (850) and DAI.DE (510) sit above the 500 threshold.
        assert_eq!(report.high_emitter_count, 2);
    }

    #[test]
    fn test_empty_portfolio_is_invalid() {
        let report = validate_portfolio(&[], &RiskThresholds::default());
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Portfolio is empty"]);
    }

    #[test]
    fn test_missing_required_column_reported_with_tickers() {
        let mut portfolio = dax_sample_portfolio();
        portfolio.firms[0].carbon_intensity = None;
        portfolio.firms[3].carbon_intensity = None;
        let report = validate_portfolio(&portfolio.firms, &RiskThresholds::default());
        assert!(!report.valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("CarbonIntensity") && e.contains("SAP") && e.contains("BAS.DE")));
    }

    #[test]
    fn test_out_of_range_values_reported() {
        let mut portfolio = dax_sample_portfolio();
        portfolio.firms[1].emissions_trend = Some(dec!(75));
        portfolio.firms[2].governance_score = Some(dec!(130));
        let report = validate_portfolio(&portfolio.firms, &RiskThresholds::default());
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.contains("EmissionsTrend")));
        assert!(report.errors.iter().any(|e| e.contains("GovernanceScore")));
    }

    #[test]
    fn test_duplicate_ticker_reported() {
        let mut portfolio = dax_sample_portfolio();
        let dup = portfolio.firms[0].clone();
        portfolio.firms.push(dup);
        let report = validate_portfolio(&portfolio.firms, &RiskThresholds::default());
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.contains("Duplicate ticker 'SAP'")));
    }

    #[test]
    fn test_sparse_optional_column_warns_without_invalidating() {
        let mut portfolio = dax_sample_portfolio();
        portfolio.firms[4].volatility = None;
        let report = validate_portfolio(&portfolio.firms, &RiskThresholds::default());
        assert!(report.valid);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("Volatility") && w.contains("1 of 10")));
    }
}
