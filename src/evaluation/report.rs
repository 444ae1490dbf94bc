//! Per-order evaluation report: fit, residual diagnostics, adequacy and advice.

use crate::config::MleConfig;
use crate::error::Result;
use crate::evaluation::adequacy::{
    assess_model_adequacy, score_adequacy, AdequacyScore, ModelAdequacy, ResidualIssue,
};
use crate::evaluation::fit::{fit_model, FitResult, FitStatistics};
use crate::evaluation::residuals::{analyze_residuals, BasicStatistics, NormalityTests, ResidualAnalysis};
use crate::models::ModelOrder;
use crate::validation::LjungBoxResult;
use log::warn;
use serde::Serialize;

/// Full evaluation of one order.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub success: bool,
    pub order: ModelOrder,
    pub model_type: String,
    pub fit_statistics: Option<FitStatistics>,
    pub residual_analysis: Option<ResidualAnalysis>,
    pub model_adequacy: Option<ModelAdequacy>,
    pub recommendations: Vec<String>,
    pub error: Option<String>,
    pub fit: FitResult,
}

impl EvaluationReport {
    pub fn aic(&self) -> Option<f64> {
        self.fit_statistics.as_ref().map(|s| s.aic)
    }
}

fn recommendations(statistics: &FitStatistics, residual: Option<&ResidualAnalysis>) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(analysis) = residual {
        let issues = &analysis.overall_assessment.issues;
        if issues.contains(&ResidualIssue::Autocorrelated) {
            out.push("add AR or MA terms to remove residual autocorrelation".to_string());
        }
        if issues.contains(&ResidualIssue::NonNormal) {
            out.push("consider transforming the data or a different error distribution".to_string());
        }
        if issues.contains(&ResidualIssue::MeanOffset) {
            out.push("check whether the model needs a constant term".to_string());
        }
    }
    if statistics.r_squared < 0.5 {
        out.push("explanatory power is low; consider a richer model or additional variables".to_string());
    }
    out.push("compare other ARIMA orders by AIC/BIC before settling on this one".to_string());
    out
}

/// Fits, diagnoses and scores candidate orders.
#[derive(Debug, Clone, Default)]
pub struct ModelEvaluator {
    mle: MleConfig,
}

impl ModelEvaluator {
    pub fn new(mle: MleConfig) -> Self {
        Self { mle }
    }

    /// Fit `order` by maximum likelihood; failures come back as `success == false`.
    pub fn fit(&self, values: &[f64], order: ModelOrder) -> FitResult {
        fit_model(values, order, &self.mle)
    }

    pub fn analyze_residuals(&self, residuals: &[f64]) -> Result<ResidualAnalysis> {
        analyze_residuals(residuals)
    }

    pub fn score_adequacy(
        &self,
        basic: &BasicStatistics,
        normality: &NormalityTests,
        autocorrelation: Option<&LjungBoxResult>,
    ) -> AdequacyScore {
        score_adequacy(basic, normality, autocorrelation)
    }

    /// Fit, analyse residuals and score `order` on the undifferenced `values`.
    ///
    /// Stops right after a failed fit.
    pub fn generate_report(&self, values: &[f64], order: ModelOrder) -> EvaluationReport {
        let fit = self.fit(values, order);
        let Some(statistics) = fit.statistics.clone() else {
            return EvaluationReport {
                success: false,
                order,
                model_type: order.to_string(),
                fit_statistics: None,
                residual_analysis: None,
                model_adequacy: None,
                recommendations: vec![],
                error: fit.error.clone(),
                fit,
            };
        };

        let residual_analysis = match self.analyze_residuals(&fit.residuals) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!("evaluation stage: residual analysis of {} failed: {}", order, e);
                None
            }
        };
        let model_adequacy = assess_model_adequacy(
            &statistics,
            residual_analysis.as_ref().map(|r| &r.overall_assessment),
        );

        EvaluationReport {
            success: true,
            order,
            model_type: order.to_string(),
            recommendations: recommendations(&statistics, residual_analysis.as_ref()),
            fit_statistics: Some(statistics),
            residual_analysis,
            model_adequacy: Some(model_adequacy),
            error: None,
            fit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn ar1(n: usize, phi: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut y = vec![0.0; n];
        for t in 1..n {
            y[t] = phi * y[t - 1] + normal.sample(&mut rng);
        }
        y
    }

    #[test]
    fn report_on_correct_order() {
        let y = ar1(300, 0.8, 41);
        let report = ModelEvaluator::default().generate_report(&y, ModelOrder::new(1, 0, 0));
        assert!(report.success);
        assert_eq!(report.model_type, "ARIMA(1, 0, 0)");
        let stats = report.fit_statistics.as_ref().unwrap();
        assert!(stats.r_squared > 0.4);
        let residual = report.residual_analysis.as_ref().unwrap();
        assert_eq!(residual.is_white_noise(), Some(true));
        let adequacy = report.model_adequacy.as_ref().unwrap();
        assert!(adequacy.score >= 55 && adequacy.score <= 100);
        assert!(report
            .recommendations
            .last()
            .unwrap()
            .contains("AIC/BIC"));
    }

    #[test]
    fn underfit_order_recommends_more_terms() {
        let y = ar1(300, 0.9, 42);
        let report = ModelEvaluator::default().generate_report(&y, ModelOrder::new(0, 0, 1));
        assert!(report.success);
        let residual = report.residual_analysis.as_ref().unwrap();
        assert_eq!(residual.is_white_noise(), Some(false));
        assert!(report.recommendations.iter().any(|r| r.contains("AR or MA")));
    }

    #[test]
    fn failed_fit_skips_residuals() {
        let report = ModelEvaluator::default().generate_report(&[1.0, 2.0, 1.0], ModelOrder::new(2, 0, 2));
        assert!(!report.success);
        assert!(report.residual_analysis.is_none());
        assert!(report.error.is_some());
        assert!(report.aic().is_none());
    }
}
