//! Model evaluation: in-sample fit, residual diagnostics and adequacy scoring.

mod adequacy;
mod fit;
mod report;
mod residuals;

pub use adequacy::{
    assess_model_adequacy, score_adequacy, AdequacyChecks, AdequacyLevel, AdequacyScore,
    ModelAdequacy, ModelAdequacyLevel, ResidualIssue,
};
pub use fit::{adjusted_r_squared, fit_model, FitResult, FitStatistics};
pub use report::{EvaluationReport, ModelEvaluator};
pub use residuals::{
    analyze_residuals, BasicStatistics, NormalityTests, ResidualAnalysis, ResidualCorrelograms,
    RESIDUAL_ALPHA,
};
