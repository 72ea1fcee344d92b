//! Statistical probability-of-default model.
//!
//! A pair of logistic-regression classifiers over `Decimal` — a
//! financial-only baseline and an ESG-augmented variant — fitted once
//! by deterministic gradient descent with median imputation, z-score
//! standardization, and a base-rate intercept recalibration so the
//! outputs are usable as PD estimates.
//!
//! When the training portfolio carries no `Default_Flag`, labels are
//! derived from a heuristic risk score thresholded at 0.35, exactly as
//! the historical pipeline did. That label is NOT an observed default
//! indicator; every fit performed this way carries a warning saying so.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{LabelHeuristic, STATISTICAL_LOSS_RATE};
use crate::error::EsgCreditError;
use crate::math::{decimal_ln, decimal_sqrt, sigmoid};
use crate::types::{with_metadata, Column, ComputationOutput, FirmRecord, Money, Rate};
use crate::EsgCreditResult;

/// Financial-only feature set.
const BASELINE_FEATURES: [Column; 4] = [
    Column::DebtToEquity,
    Column::InterestCoverage,
    Column::EbitMargin,
    Column::Volatility,
];

/// Baseline plus the two ESG drivers.
const ESG_FEATURES: [Column; 6] = [
    Column::DebtToEquity,
    Column::InterestCoverage,
    Column::EbitMargin,
    Column::Volatility,
    Column::EsgScore,
    Column::CarbonIntensity,
];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdModelConfig {
    /// Gradient-descent step size.
    pub learning_rate: Decimal,
    /// Fixed iteration count; the fit is deterministic.
    pub iterations: u32,
    pub label_heuristic: LabelHeuristic,
}

impl Default for PdModelConfig {
    fn default() -> Self {
        PdModelConfig {
            learning_rate: dec!(0.5),
            iterations: 300,
            label_heuristic: LabelHeuristic::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Fitted state
// ---------------------------------------------------------------------------

/// One fitted logistic regression with its imputation/scaling state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedLogit {
    pub features: Vec<Column>,
    pub intercept: Decimal,
    pub coefficients: Vec<Decimal>,
    /// Training medians, reused when imputing at prediction time.
    pub medians: Vec<Decimal>,
    pub means: Vec<Decimal>,
    pub std_devs: Vec<Decimal>,
}

impl FittedLogit {
    /// Linear score for one firm, imputing absent values with the
    /// training medians.
    fn score(&self, firm: &FirmRecord) -> Decimal {
        let mut z = self.intercept;
        for (j, column) in self.features.iter().enumerate() {
            let raw = firm.column(*column).unwrap_or(self.medians[j]);
            let standardized = (raw - self.means[j]) / self.std_devs[j];
            z += self.coefficients[j] * standardized;
        }
        z
    }
}

/// Where the training labels came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelSource {
    /// Observed `Default_Flag` column.
    Observed,
    /// Heuristic risk score thresholded at the configured cutoff.
    Heuristic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummary {
    pub observations: usize,
    pub default_rate: Decimal,
    pub label_source: LabelSource,
    pub baseline: FittedLogit,
    pub esg: FittedLogit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdFirmCapital {
    pub ticker: String,
    pub pd: Decimal,
    /// PD x TotalAssets x loss rate.
    pub capital_requirement: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdCapitalOutput {
    pub include_esg: bool,
    pub loss_rate: Rate,
    pub firms: Vec<PdFirmCapital>,
    pub total_capital_requirement: Money,
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Lifecycle: `new` -> unfitted; `fit` once; predictions afterwards.
/// A fitted model is immutable and safe for concurrent reads.
#[derive(Debug, Clone)]
pub struct PdModel {
    config: PdModelConfig,
    baseline: Option<FittedLogit>,
    esg: Option<FittedLogit>,
}

impl Default for PdModel {
    fn default() -> Self {
        PdModel::new(PdModelConfig::default())
    }
}

impl PdModel {
    pub fn new(config: PdModelConfig) -> Self {
        PdModel {
            config,
            baseline: None,
            esg: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.baseline.is_some() && self.esg.is_some()
    }

    /// Batch-fit both classifiers from a historical portfolio.
    pub fn fit(
        &mut self,
        firms: &[FirmRecord],
    ) -> EsgCreditResult<ComputationOutput<FitSummary>> {
        let start = Instant::now();
        let mut warnings: Vec<String> = Vec::new();

        if firms.len() < 4 {
            return Err(EsgCreditError::InsufficientData(format!(
                "Need at least 4 training firms, got {}",
                firms.len()
            )));
        }
        self.config.label_heuristic.validate()?;

        // Presence: a feature column must hold a value on at least one
        // row; individual gaps are median-imputed.
        require_any(firms, &ESG_FEATURES)?;

        let imputed = ImputedMatrix::build(firms, &ESG_FEATURES);

        let (labels, label_source) = resolve_labels(
            firms,
            &imputed,
            &self.config.label_heuristic,
            &mut warnings,
        )?;

        let defaults = labels.iter().filter(|l| **l).count();
        if defaults == 0 || defaults == labels.len() {
            return Err(EsgCreditError::InsufficientData(
                "Training labels are single-class; cannot fit a classifier".into(),
            ));
        }
        let default_rate = Decimal::from(defaults as u64) / Decimal::from(labels.len() as u64);

        let baseline = fit_logit(&imputed, &BASELINE_FEATURES, &labels, &self.config);
        let esg = fit_logit(&imputed, &ESG_FEATURES, &labels, &self.config);

        self.baseline = Some(baseline.clone());
        self.esg = Some(esg.clone());

        let summary = FitSummary {
            observations: firms.len(),
            default_rate,
            label_source,
            baseline,
            esg,
        };

        let elapsed = start.elapsed().as_micros() as u64;
        let assumptions = serde_json::json!({
            "classifier": "logistic regression, deterministic gradient descent",
            "imputation": "per-feature training median",
            "scaling": "z-score from training moments",
            "calibration": "intercept shifted to match the observed base rate",
            "learning_rate": self.config.learning_rate.to_string(),
            "iterations": self.config.iterations,
        });
        Ok(with_metadata(
            "ESG-augmented PD classifier (logistic)",
            &assumptions,
            warnings,
            elapsed,
            summary,
        ))
    }

    /// Positive-class probability per firm, in input order.
    pub fn predict_pd(
        &self,
        firms: &[FirmRecord],
        include_esg: bool,
    ) -> EsgCreditResult<Vec<Decimal>> {
        let logit = self.fitted(include_esg)?;
        require_any(firms, &logit.features)?;
        Ok(firms.iter().map(|f| sigmoid(logit.score(f))).collect())
    }

    /// Capital requirement: PD x TotalAssets x 0.45. All failures are
    /// typed errors; nothing degrades to a silent null.
    pub fn calculate_capital(
        &self,
        firms: &[FirmRecord],
        include_esg: bool,
    ) -> EsgCreditResult<ComputationOutput<PdCapitalOutput>> {
        let start = Instant::now();

        // TotalAssets is a hard requirement on every row; it is not a
        // model feature and is never imputed.
        let missing_assets = firms.iter().any(|f| f.total_assets.is_none());
        if missing_assets {
            return Err(EsgCreditError::MissingColumns(vec![
                Column::TotalAssets.header().to_string(),
            ]));
        }

        let pds = self.predict_pd(firms, include_esg)?;

        let mut rows = Vec::with_capacity(firms.len());
        let mut total = Decimal::ZERO;
        for (firm, pd) in firms.iter().zip(pds.iter()) {
            let assets = firm.total_assets.unwrap_or_default();
            let capital_requirement = *pd * assets * STATISTICAL_LOSS_RATE;
            total += capital_requirement;
            rows.push(PdFirmCapital {
                ticker: firm.ticker.clone(),
                pd: *pd,
                capital_requirement,
            });
        }

        let output = PdCapitalOutput {
            include_esg,
            loss_rate: STATISTICAL_LOSS_RATE,
            firms: rows,
            total_capital_requirement: total,
        };

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "PD-based capital requirement (PD x assets x loss rate)",
            &serde_json::json!({
                "loss_rate": STATISTICAL_LOSS_RATE.to_string(),
                "caveat": "simplified proxy, not a Basel capital calculation",
            }),
            Vec::new(),
            elapsed,
            output,
        ))
    }

    fn fitted(&self, include_esg: bool) -> EsgCreditResult<&FittedLogit> {
        let slot = if include_esg { &self.esg } else { &self.baseline };
        slot.as_ref().ok_or_else(|| {
            EsgCreditError::ModelNotFitted(
                "call fit() with a training portfolio before predicting".into(),
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Derive the training label per firm: the observed Default_Flag when
/// the column is complete, otherwise the heuristic risk score
/// thresholded at the configured cutoff.
pub fn derive_default_labels(
    firms: &[FirmRecord],
    heuristic: &LabelHeuristic,
) -> EsgCreditResult<Vec<bool>> {
    heuristic.validate()?;
    require_any(firms, &ESG_FEATURES)?;
    let imputed = ImputedMatrix::build(firms, &ESG_FEATURES);
    heuristic_labels(firms, &imputed, heuristic)
}

fn resolve_labels(
    firms: &[FirmRecord],
    imputed: &ImputedMatrix,
    heuristic: &LabelHeuristic,
    warnings: &mut Vec<String>,
) -> EsgCreditResult<(Vec<bool>, LabelSource)> {
    if firms.iter().all(|f| f.default_flag.is_some()) {
        let labels = firms.iter().map(|f| f.default_flag.unwrap_or(false)).collect();
        return Ok((labels, LabelSource::Observed));
    }
    warnings.push(
        "Default_Flag absent; training labels derived from a heuristic risk score \
         and do not represent observed defaults."
            .into(),
    );
    let labels = heuristic_labels(firms, imputed, heuristic)?;
    Ok((labels, LabelSource::Heuristic))
}

fn heuristic_labels(
    firms: &[FirmRecord],
    imputed: &ImputedMatrix,
    heuristic: &LabelHeuristic,
) -> EsgCreditResult<Vec<bool>> {
    let debt = imputed.column(Column::DebtToEquity);
    let coverage = imputed.column(Column::InterestCoverage);
    let esg = imputed.column(Column::EsgScore);
    let carbon = imputed.column(Column::CarbonIntensity);
    let volatility = imputed.column(Column::Volatility);

    for (firm, c) in firms.iter().zip(coverage.iter()) {
        if *c <= Decimal::ZERO {
            return Err(EsgCreditError::DivisionByZero {
                context: format!("InterestCoverage for '{}' is {c}; must be > 0", firm.ticker),
            });
        }
    }

    let inverse_coverage: Vec<Decimal> =
        coverage.iter().map(|c| Decimal::ONE / *c).collect();
    let max_debt = batch_max(debt);
    let max_inverse = batch_max(&inverse_coverage);
    let max_carbon = batch_max(carbon);
    let max_volatility = batch_max(volatility);

    let mut labels = Vec::with_capacity(firms.len());
    for i in 0..firms.len() {
        let score = heuristic.debt_to_equity * relative(debt[i], max_debt)
            + heuristic.interest_coverage * relative(inverse_coverage[i], max_inverse)
            + heuristic.esg_score * (dec!(100) - esg[i]) / dec!(100)
            + heuristic.carbon_intensity * relative(carbon[i], max_carbon)
            + heuristic.volatility * relative(volatility[i], max_volatility);
        labels.push(score >= heuristic.label_threshold);
    }
    Ok(labels)
}

fn batch_max(values: &[Decimal]) -> Decimal {
    values
        .iter()
        .copied()
        .fold(Decimal::ZERO, |acc, v| if v > acc { v } else { acc })
}

fn relative(value: Decimal, base: Decimal) -> Decimal {
    if base.is_zero() {
        Decimal::ZERO
    } else {
        value / base
    }
}

// ---------------------------------------------------------------------------
// Imputation & fitting
// ---------------------------------------------------------------------------

/// Column presence for the statistical variant: a column is missing
/// only when no row carries a value (gaps are median-imputed).
fn require_any(firms: &[FirmRecord], columns: &[Column]) -> EsgCreditResult<()> {
    let missing: Vec<String> = columns
        .iter()
        .filter(|col| firms.iter().all(|f| f.column(**col).is_none()))
        .map(|col| col.header().to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(EsgCreditError::MissingColumns(missing))
    }
}

struct ImputedMatrix {
    columns: Vec<(Column, Vec<Decimal>, Decimal)>,
}

impl ImputedMatrix {
    /// Per column: fill gaps with the training median.
    fn build(firms: &[FirmRecord], columns: &[Column]) -> Self {
        let mut out = Vec::with_capacity(columns.len());
        for column in columns {
            let available: Vec<Decimal> =
                firms.iter().filter_map(|f| f.column(*column)).collect();
            let med = median(&available);
            let values: Vec<Decimal> = firms
                .iter()
                .map(|f| f.column(*column).unwrap_or(med))
                .collect();
            out.push((*column, values, med));
        }
        ImputedMatrix { columns: out }
    }

    fn column(&self, column: Column) -> &[Decimal] {
        self.columns
            .iter()
            .find(|(c, _, _)| *c == column)
            .map(|(_, v, _)| v.as_slice())
            .unwrap_or(&[])
    }

    fn median_of(&self, column: Column) -> Decimal {
        self.columns
            .iter()
            .find(|(c, _, _)| *c == column)
            .map(|(_, _, m)| *m)
            .unwrap_or_default()
    }
}

fn median(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / dec!(2)
    } else {
        sorted[mid]
    }
}

fn fit_logit(
    imputed: &ImputedMatrix,
    features: &[Column],
    labels: &[bool],
    config: &PdModelConfig,
) -> FittedLogit {
    let n = labels.len();
    let n_d = Decimal::from(n as u64);

    // Standardize each feature from its training moments.
    let mut means = Vec::with_capacity(features.len());
    let mut std_devs = Vec::with_capacity(features.len());
    let mut medians = Vec::with_capacity(features.len());
    let mut standardized: Vec<Vec<Decimal>> = Vec::with_capacity(features.len());
    for column in features {
        let values = imputed.column(*column);
        let mean: Decimal = values.iter().copied().sum::<Decimal>() / n_d;
        let variance: Decimal = values
            .iter()
            .map(|v| (*v - mean) * (*v - mean))
            .sum::<Decimal>()
            / n_d;
        let mut std_dev = decimal_sqrt(variance);
        if std_dev.is_zero() {
            // Constant feature carries no signal; avoid dividing by zero.
            std_dev = Decimal::ONE;
        }
        standardized.push(values.iter().map(|v| (*v - mean) / std_dev).collect());
        means.push(mean);
        std_devs.push(std_dev);
        medians.push(imputed.median_of(*column));
    }

    let y: Vec<Decimal> = labels
        .iter()
        .map(|l| if *l { Decimal::ONE } else { Decimal::ZERO })
        .collect();

    // Plain batch gradient descent on the log-loss.
    let mut intercept = Decimal::ZERO;
    let mut coefficients = vec![Decimal::ZERO; features.len()];
    for _ in 0..config.iterations {
        let mut grad_intercept = Decimal::ZERO;
        let mut grad = vec![Decimal::ZERO; features.len()];
        for i in 0..n {
            let mut z = intercept;
            for j in 0..features.len() {
                z += coefficients[j] * standardized[j][i];
            }
            let residual = sigmoid(z) - y[i];
            grad_intercept += residual;
            for j in 0..features.len() {
                grad[j] += residual * standardized[j][i];
            }
        }
        intercept -= config.learning_rate * grad_intercept / n_d;
        for j in 0..features.len() {
            coefficients[j] -= config.learning_rate * grad[j] / n_d;
        }
    }

    // Base-rate calibration: shift the intercept in log-odds space so
    // the mean fitted PD matches the observed default rate.
    let base_rate = y.iter().copied().sum::<Decimal>() / n_d;
    for _ in 0..5 {
        let mean_pd: Decimal = (0..n)
            .map(|i| {
                let mut z = intercept;
                for j in 0..features.len() {
                    z += coefficients[j] * standardized[j][i];
                }
                sigmoid(z)
            })
            .sum::<Decimal>()
            / n_d;
        if mean_pd.is_zero() || mean_pd >= Decimal::ONE {
            break;
        }
        intercept += log_odds(base_rate) - log_odds(mean_pd);
    }

    FittedLogit {
        features: features.to_vec(),
        intercept,
        coefficients,
        medians,
        means,
        std_devs,
    }
}

fn log_odds(p: Decimal) -> Decimal {
    decimal_ln(p) - decimal_ln(Decimal::ONE - p)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
