use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EsgCreditError;
use crate::EsgCreditResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// A single firm row of the portfolio table.
///
/// Numeric attributes are optional so that an absent column (a field
/// that is `None` on at least one row) is detectable and reportable
/// as a missing-column failure, mirroring the tabular contract the
/// external data pipeline produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmRecord {
    /// Unique key within a portfolio.
    pub ticker: String,
    /// Sector classification used for cross-sectional aggregation.
    pub industry: String,
    /// Total debt / shareholder equity, >= 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_to_equity: Option<Decimal>,
    /// EBIT / interest expense. Must be > 0 for inverse-ratio scoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_coverage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ebit_margin: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roa: Option<Decimal>,
    /// tCO2 per EUR million of revenue, >= 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_intensity: Option<Decimal>,
    /// Percent change in emissions, domain [-50, 50].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissions_trend: Option<Decimal>,
    /// Composite ESG score, 0-100, higher is better.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub esg_score: Option<Decimal>,
    /// 0-100, higher is better.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_score: Option<Decimal>,
    /// 0-100, higher is better.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub governance_score: Option<Decimal>,
    /// Fraction of board seats held by women, 0-1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_diversity: Option<Decimal>,
    /// True when the firm has active ESG controversies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controversy_flag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<Decimal>,
    /// Currency units, > 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_assets: Option<Money>,
    /// Historical default label, only needed for model training.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_flag: Option<bool>,
}

impl FirmRecord {
    /// Bare record with only identity fields set.
    pub fn new(ticker: &str, industry: &str) -> Self {
        FirmRecord {
            ticker: ticker.to_string(),
            industry: industry.to_string(),
            debt_to_equity: None,
            interest_coverage: None,
            ebit_margin: None,
            roa: None,
            carbon_intensity: None,
            emissions_trend: None,
            esg_score: None,
            social_score: None,
            governance_score: None,
            board_diversity: None,
            controversy_flag: None,
            volatility: None,
            total_assets: None,
            default_flag: None,
        }
    }

    /// Numeric column accessor. `DefaultFlag` maps true/false to 1/0.
    pub fn column(&self, column: Column) -> Option<Decimal> {
        match column {
            Column::DebtToEquity => self.debt_to_equity,
            Column::InterestCoverage => self.interest_coverage,
            Column::EbitMargin => self.ebit_margin,
            Column::Roa => self.roa,
            Column::CarbonIntensity => self.carbon_intensity,
            Column::EmissionsTrend => self.emissions_trend,
            Column::EsgScore => self.esg_score,
            Column::SocialScore => self.social_score,
            Column::GovernanceScore => self.governance_score,
            Column::BoardDiversity => self.board_diversity,
            Column::Volatility => self.volatility,
            Column::TotalAssets => self.total_assets,
            Column::DefaultFlag => self
                .default_flag
                .map(|d| if d { Decimal::ONE } else { Decimal::ZERO }),
        }
    }
}

/// Names of the attribute columns in the external table contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Column {
    DebtToEquity,
    InterestCoverage,
    EbitMargin,
    Roa,
    CarbonIntensity,
    EmissionsTrend,
    EsgScore,
    SocialScore,
    GovernanceScore,
    BoardDiversity,
    Volatility,
    TotalAssets,
    DefaultFlag,
}

impl Column {
    /// The header name used by the external dataset contract.
    pub fn header(&self) -> &'static str {
        match self {
            Column::DebtToEquity => "Debt/Equity",
            Column::InterestCoverage => "InterestCoverage",
            Column::EbitMargin => "EBIT_Margin",
            Column::Roa => "ROA",
            Column::CarbonIntensity => "CarbonIntensity",
            Column::EmissionsTrend => "EmissionsTrend",
            Column::EsgScore => "ESG_Score",
            Column::SocialScore => "SocialScore",
            Column::GovernanceScore => "GovernanceScore",
            Column::BoardDiversity => "BoardDiversity",
            Column::Volatility => "Volatility",
            Column::TotalAssets => "TotalAssets",
            Column::DefaultFlag => "Default_Flag",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// Fail with the exact list of columns absent on at least one row,
/// before any computation touches the values.
pub fn require_columns(firms: &[FirmRecord], required: &[Column]) -> EsgCreditResult<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|col| firms.iter().any(|f| f.column(**col).is_none()))
        .map(|col| col.header().to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(EsgCreditError::MissingColumns(missing))
    }
}

/// A portfolio of firms at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub as_of: NaiveDate,
    pub firms: Vec<FirmRecord>,
}

impl Portfolio {
    /// Build a portfolio, rejecting duplicate tickers.
    pub fn new(as_of: NaiveDate, firms: Vec<FirmRecord>) -> EsgCreditResult<Self> {
        let mut seen: Vec<&str> = Vec::with_capacity(firms.len());
        for firm in &firms {
            if seen.contains(&firm.ticker.as_str()) {
                return Err(EsgCreditError::InvalidInput {
                    field: "firms".into(),
                    reason: format!("Duplicate ticker '{}'.", firm.ticker),
                });
            }
            seen.push(firm.ticker.as_str());
        }
        Ok(Portfolio { as_of, firms })
    }
}

/// Thresholded classification of a composite risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "High Risk")]
    HighRisk,
    Safe,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::HighRisk => write!(f, "High Risk"),
            RiskLevel::Safe => write!(f, "Safe"),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
