//! Outbound result types of an analysis session.

use crate::core::{DataSummary, IndexLabel};
use crate::estimation::{EstimateComparison, EstimationMethod, EstimationResult};
use crate::evaluation::EvaluationReport;
use crate::identification::{CandidateModel, Correlogram, Identification};
use crate::models::ModelOrder;
use crate::validation::OverallStationarity;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Pipeline stage, used for failure context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Stationarity,
    Differencing,
    Identification,
    Estimation,
    Evaluation,
    Selection,
    Prediction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Stationarity => "stationarity",
            Stage::Differencing => "differencing",
            Stage::Identification => "identification",
            Stage::Estimation => "estimation",
            Stage::Evaluation => "evaluation",
            Stage::Selection => "selection",
            Stage::Prediction => "prediction",
        };
        f.write_str(name)
    }
}

/// Differencing applied before identification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferencingInfo {
    pub applied: bool,
    pub order: usize,
    /// Set when the differencing search ran out of orders.
    pub warning: Option<String>,
}

/// A candidate that could not be fitted or evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateFailure {
    pub order: ModelOrder,
    pub stage: Stage,
    pub method: Option<EstimationMethod>,
    pub message: String,
}

/// A candidate that was estimated and evaluated successfully.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedModel {
    pub order: ModelOrder,
    pub candidate: CandidateModel,
    pub estimation: BTreeMap<EstimationMethod, EstimationResult>,
    pub comparison: Option<EstimateComparison>,
    pub evaluation: EvaluationReport,
}

impl EvaluatedModel {
    pub fn aic(&self) -> Option<f64> {
        self.evaluation.aic()
    }

    pub fn mle(&self) -> Option<&EstimationResult> {
        self.estimation.get(&EstimationMethod::Mle)
    }
}

/// Everything one `analyze` call produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub session_id: String,
    pub data_summary: DataSummary,
    pub stationarity: OverallStationarity,
    pub differencing: DifferencingInfo,
    pub identification: Identification,
    /// Successfully evaluated candidates in proposal order.
    pub evaluated_models: Vec<EvaluatedModel>,
    /// Position of the minimum-AIC model in `evaluated_models`.
    pub best_index: Option<usize>,
    pub warnings: Vec<String>,
    pub failures: Vec<CandidateFailure>,
}

impl AnalysisResult {
    pub fn candidates(&self) -> &[CandidateModel] {
        &self.identification.candidates
    }

    pub fn best_model(&self) -> Option<&EvaluatedModel> {
        self.best_index.and_then(|i| self.evaluated_models.get(i))
    }
}

/// Response of `predict`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub forecast: Vec<f64>,
    pub index: Vec<IndexLabel>,
    pub confidence_intervals: Option<Vec<[f64; 2]>>,
    pub model_order: ModelOrder,
    pub steps: usize,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationaritySummary {
    pub is_stationary: bool,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestModelSummary {
    pub order: ModelOrder,
    pub model_type: String,
    pub aic: f64,
    pub bic: f64,
    pub r_squared: f64,
    pub adequacy_score: u32,
    pub adequacy_level: String,
}

/// Compact overview of a finished analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub data_info: DataSummary,
    pub stationarity: StationaritySummary,
    pub differencing: DifferencingInfo,
    pub best_model: Option<BestModelSummary>,
}

/// Raw sequences for an external plotting layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationData {
    pub index: Vec<IndexLabel>,
    pub original: Vec<f64>,
    pub differenced: Vec<f64>,
    pub acf: Option<Correlogram>,
    pub pacf: Option<Correlogram>,
    /// Residuals and fitted values of the best model, aligned to `index[d..]`.
    pub residuals: Vec<f64>,
    pub fitted_values: Vec<f64>,
    pub residual_acf: Option<Correlogram>,
    pub residual_pacf: Option<Correlogram>,
    pub forecast: Option<PredictionResponse>,
    /// `(order, aic, bic, hqic)` of each evaluated model.
    pub model_comparison: Vec<(ModelOrder, f64, f64, f64)>,
}
