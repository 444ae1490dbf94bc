//! The analysis session state machine.

use crate::config::InsightConfig;
use crate::core::{IndexLabel, Series};
use crate::error::{InsightError, Result};
use crate::estimation::{EstimationMethod, ParameterEstimator};
use crate::evaluation::ModelEvaluator;
use crate::identification::OrderIdentifier;
use crate::session::request::{AnalysisRequest, PredictionRequest};
use crate::session::result::{
    AnalysisResult, BestModelSummary, CandidateFailure, DifferencingInfo, EvaluatedModel,
    PredictionResponse, SessionSummary, Stage, StationaritySummary, VisualizationData,
};
use crate::validation::StationarityTester;
use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

/// Where a session is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Empty,
    Loaded,
    StationarityChecked,
    Differenced,
    OrdersIdentified,
    ModelsEvaluated,
    BestSelected,
}

/// Index of the strictly smallest finite value; the first one wins ties.
pub fn select_min_aic(aics: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &aic) in aics.iter().enumerate() {
        if !aic.is_finite() {
            continue;
        }
        match best {
            Some((_, current)) if aic >= current => {}
            _ => best = Some((i, aic)),
        }
    }
    best.map(|(i, _)| i)
}

/// One analysis of one series.
///
/// Sessions own their series, results and fitted models; nothing is shared
/// between sessions.
#[derive(Debug, Clone)]
pub struct InsightSession {
    id: String,
    config: InsightConfig,
    state: SessionState,
    series: Option<Series>,
    differenced: Option<Series>,
    result: Option<AnalysisResult>,
    last_prediction: Option<PredictionResponse>,
}

impl Default for InsightSession {
    fn default() -> Self {
        Self::new(InsightConfig::default())
    }
}

impl InsightSession {
    pub fn new(config: InsightConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            config,
            state: SessionState::Empty,
            series: None,
            differenced: None,
            result: None,
            last_prediction: None,
        }
    }

    /// Load a series and run the full analysis.
    pub fn quick_analysis(series: Series, request: AnalysisRequest) -> Result<Self> {
        let mut session = Self::default();
        session.load(series)?;
        session.analyze(request)?;
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn series(&self) -> Option<&Series> {
        self.series.as_ref()
    }

    /// The last analysis.
    pub fn result(&self) -> Result<&AnalysisResult> {
        self.result
            .as_ref()
            .ok_or_else(|| InsightError::State("no analysis has run".to_string()))
    }

    fn transition(&mut self, next: SessionState) {
        debug!("session {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }

    /// Replace the session's series, discarding earlier results.
    pub fn load(&mut self, series: Series) -> Result<()> {
        if series.is_empty() {
            return Err(InsightError::EmptyData);
        }
        self.series = Some(series);
        self.differenced = None;
        self.result = None;
        self.last_prediction = None;
        self.transition(SessionState::Loaded);
        Ok(())
    }

    /// Run the pipeline on the loaded series.
    ///
    /// Candidate failures are recorded in the result; only input and
    /// sequencing errors are returned.
    pub fn analyze(&mut self, request: AnalysisRequest) -> Result<&AnalysisResult> {
        let series = self
            .series
            .clone()
            .ok_or_else(|| InsightError::State("analyze called before load".to_string()))?;
        let request = request.clamped();
        let values = series.values();
        let mut warnings = Vec::new();
        let mut failures = Vec::new();

        let tester = StationarityTester::new(self.config.stationarity.clone());
        let stationarity = tester.test(&series)?;
        self.transition(SessionState::StationarityChecked);

        let (differenced, differencing) = if request.auto_diff && !stationarity.is_stationary {
            let outcome = tester.auto_difference(&series, self.config.stationarity.max_diff_order)?;
            let warning = outcome.warning.map(|w| w.to_string());
            if let Some(w) = &warning {
                warnings.push(format!("{}: {}", Stage::Differencing, w));
            }
            self.transition(SessionState::Differenced);
            (
                outcome.series,
                DifferencingInfo {
                    applied: true,
                    order: outcome.order,
                    warning,
                },
            )
        } else {
            (
                series.clone(),
                DifferencingInfo {
                    applied: false,
                    order: 0,
                    warning: None,
                },
            )
        };
        let d = differencing.order;

        let identifier = OrderIdentifier::new(self.config.identification.clone());
        let identification =
            identifier.identify_orders(differenced.values(), request.max_p, request.max_q, d)?;
        self.transition(SessionState::OrdersIdentified);

        let estimator = ParameterEstimator::new(self.config.moments.clone(), self.config.mle.clone());
        let evaluator = ModelEvaluator::new(self.config.mle.clone());
        let mut evaluated_models = Vec::new();

        for candidate in identification.candidates.iter().take(request.n_models) {
            let order = candidate.order;
            let estimation = estimator.estimate(values, order, &EstimationMethod::ALL);
            for result in estimation.values().filter(|r| !r.success) {
                failures.push(CandidateFailure {
                    order,
                    stage: Stage::Estimation,
                    method: Some(result.method),
                    message: result.error.clone().unwrap_or_default(),
                });
            }

            let evaluation = evaluator.generate_report(values, order);
            if !evaluation.success {
                let message = evaluation.error.clone().unwrap_or_default();
                warn!("{} stage: dropping {}: {}", Stage::Evaluation, order, message);
                failures.push(CandidateFailure {
                    order,
                    stage: Stage::Evaluation,
                    method: Some(EstimationMethod::Mle),
                    message,
                });
                continue;
            }

            evaluated_models.push(EvaluatedModel {
                order,
                candidate: candidate.clone(),
                comparison: estimator.compare(&estimation),
                estimation,
                evaluation,
            });
        }
        self.transition(SessionState::ModelsEvaluated);

        let aics: Vec<f64> = evaluated_models
            .iter()
            .map(|m| m.aic().unwrap_or(f64::NAN))
            .collect();
        let best_index = select_min_aic(&aics);
        match best_index {
            Some(i) => {
                info!(
                    "best model {} (AIC {:.3}) among {} evaluated",
                    evaluated_models[i].order,
                    aics[i],
                    evaluated_models.len()
                );
                self.transition(SessionState::BestSelected);
            }
            None => warn!("{} stage: no candidate could be evaluated", Stage::Selection),
        }

        self.differenced = Some(differenced);
        self.last_prediction = None;
        Ok(&*self.result.insert(AnalysisResult {
            session_id: self.id.clone(),
            data_summary: series.summary(),
            stationarity,
            differencing,
            identification,
            evaluated_models,
            best_index,
            warnings,
            failures,
        }))
    }

    /// Forecast with the best model's maximum likelihood fit.
    pub fn predict(&mut self, request: PredictionRequest) -> Result<PredictionResponse> {
        let request = request.clamped();
        let (series, result) = match (&self.series, &self.result) {
            (Some(series), Some(result)) => (series, result),
            _ => return Err(InsightError::State("predict called before analyze".to_string())),
        };
        let best = result
            .best_model()
            .ok_or_else(|| InsightError::ModelUnavailable("no model was fitted successfully".to_string()))?;
        let handle = best
            .mle()
            .filter(|mle| mle.success)
            .and_then(|mle| mle.fitted_model())
            .ok_or_else(|| {
                InsightError::ModelUnavailable(format!(
                    "maximum likelihood fit of {} is unavailable",
                    best.order
                ))
            })?;

        let forecast = handle.forecast(request.steps, request.alpha)?;
        let response = PredictionResponse {
            index: series.future_index(request.steps)?,
            confidence_intervals: forecast.intervals(),
            forecast: forecast.point().to_vec(),
            model_order: best.order,
            steps: request.steps,
            alpha: request.alpha,
        };
        debug!("session {}: forecast {} steps with {}", self.id, request.steps, best.order);
        self.last_prediction = Some(response.clone());
        Ok(response)
    }

    /// Compact overview of the last analysis.
    pub fn summary(&self) -> Result<SessionSummary> {
        let result = self.result()?;
        let best_model = result.best_model().and_then(|best| {
            let stats = best.evaluation.fit_statistics.as_ref()?;
            let adequacy = best.evaluation.model_adequacy.as_ref()?;
            Some(BestModelSummary {
                order: best.order,
                model_type: best.evaluation.model_type.clone(),
                aic: stats.aic,
                bic: stats.bic,
                r_squared: stats.r_squared,
                adequacy_score: adequacy.score,
                adequacy_level: adequacy.level.to_string(),
            })
        });
        Ok(SessionSummary {
            data_info: result.data_summary.clone(),
            stationarity: StationaritySummary {
                is_stationary: result.stationarity.is_stationary,
                interpretation: result.stationarity.interpretation.clone(),
            },
            differencing: result.differencing.clone(),
            best_model,
        })
    }

    /// Raw sequences of the loaded series and the last analysis.
    pub fn visualization(&self) -> Result<VisualizationData> {
        let series = self
            .series
            .as_ref()
            .ok_or_else(|| InsightError::State("no series loaded".to_string()))?;
        let index: Vec<IndexLabel> = (0..series.len())
            .filter_map(|i| series.index_label(i))
            .collect();
        let mut data = VisualizationData {
            index,
            original: series.values().to_vec(),
            differenced: self
                .differenced
                .as_ref()
                .map(|s| s.values().to_vec())
                .unwrap_or_default(),
            acf: None,
            pacf: None,
            residuals: vec![],
            fitted_values: vec![],
            residual_acf: None,
            residual_pacf: None,
            forecast: self.last_prediction.clone(),
            model_comparison: vec![],
        };

        if let Some(result) = &self.result {
            data.acf = Some(result.identification.acf.clone());
            data.pacf = Some(result.identification.pacf.clone());
            data.model_comparison = result
                .evaluated_models
                .iter()
                .filter_map(|m| {
                    let s = m.evaluation.fit_statistics.as_ref()?;
                    Some((m.order, s.aic, s.bic, s.hqic))
                })
                .collect();
            if let Some(best) = result.best_model() {
                data.residuals = best.evaluation.fit.residuals.clone();
                data.fitted_values = best.evaluation.fit.fitted_values.clone();
                if let Some(correlograms) = best
                    .evaluation
                    .residual_analysis
                    .as_ref()
                    .and_then(|r| r.correlograms.as_ref())
                {
                    data.residual_acf = Some(correlograms.acf.clone());
                    data.residual_pacf = Some(correlograms.pacf.clone());
                }
            }
        }
        Ok(data)
    }
}

/// Load `series` into a fresh session and analyse it.
pub fn analyze_time_series(series: Series, request: AnalysisRequest) -> Result<InsightSession> {
    InsightSession::quick_analysis(series, request)
}
