pub mod pd_model;
pub mod risk_score;

pub use pd_model::{derive_default_labels, FitSummary, PdModel, PdModelConfig};
pub use risk_score::{calculate_risk_scores, estimate_capital, RiskScoreInput, ScoredFirm};
