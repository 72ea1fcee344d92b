use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use esg_credit_core::config::RiskThresholds;
use esg_credit_core::model::pd_model::{LabelSource, PdModel, PdModelConfig};
use esg_credit_core::types::{Money, RiskLevel};

/// Arguments for the statistical PD model
#[derive(Args)]
pub struct PdArgs {
    /// Path to JSON portfolio file (used for both fitting and scoring)
    #[arg(long)]
    pub input: Option<String>,

    /// Use the bundled DAX sample portfolio
    #[arg(long)]
    pub sample: bool,
}

#[derive(Serialize)]
struct PdRow {
    ticker: String,
    pd_baseline: Decimal,
    pd_esg: Decimal,
    /// Classification of the ESG-adjusted PD against the PD threshold.
    risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    capital_requirement: Option<Money>,
}

#[derive(Serialize)]
struct PdReport {
    observations: usize,
    default_rate: Decimal,
    label_source: LabelSource,
    firms: Vec<PdRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_capital_requirement: Option<Money>,
}

pub fn run_pd(args: PdArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let firms = super::load_firms(&args.input, args.sample)?;

    let mut model = PdModel::new(PdModelConfig::default());
    let fit = model.fit(&firms)?;
    let baseline = model.predict_pd(&firms, false)?;
    let esg = model.predict_pd(&firms, true)?;

    // Capital needs TotalAssets on every row; PDs stand alone without it.
    let capital = if firms.iter().all(|f| f.total_assets.is_some()) {
        Some(model.calculate_capital(&firms, true)?)
    } else {
        None
    };

    let thresholds = RiskThresholds::default();
    let rows = firms
        .iter()
        .enumerate()
        .map(|(i, f)| PdRow {
            ticker: f.ticker.clone(),
            pd_baseline: baseline[i],
            pd_esg: esg[i],
            risk_level: if esg[i] > thresholds.high_risk_pd {
                RiskLevel::HighRisk
            } else {
                RiskLevel::Safe
            },
            capital_requirement: capital
                .as_ref()
                .map(|c| c.result.firms[i].capital_requirement),
        })
        .collect();

    let report = PdReport {
        observations: fit.result.observations,
        default_rate: fit.result.default_rate,
        label_source: fit.result.label_source,
        firms: rows,
        total_capital_requirement: capital
            .as_ref()
            .map(|c| c.result.total_capital_requirement),
    };

    Ok(serde_json::json!({
        "result": report,
        "methodology": fit.methodology,
        "assumptions": fit.assumptions,
        "warnings": fit.warnings,
        "metadata": fit.metadata,
    }))
}
