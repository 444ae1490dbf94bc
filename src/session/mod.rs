//! Analysis sessions: the pipeline orchestrator, its request and result
//! types, export helpers and a concurrent session store.
//!
//! ```
//! use arima_insight::core::Series;
//! use arima_insight::session::{AnalysisRequest, InsightSession, PredictionRequest};
//!
//! let values: Vec<f64> = (0..120).map(|t| ((t as f64) * 0.7).sin() + 0.02 * t as f64).collect();
//! let mut session = InsightSession::default();
//! session.load(Series::from_values(values).unwrap()).unwrap();
//! let result = session.analyze(AnalysisRequest::default()).unwrap();
//! assert!(!result.candidates().is_empty());
//! if result.best_model().is_some() {
//!     let prediction = session.predict(PredictionRequest::new(5, 0.05)).unwrap();
//!     assert_eq!(prediction.forecast.len(), 5);
//! }
//! ```

pub mod export;
mod orchestrator;
mod request;
mod result;
mod store;

pub use orchestrator::{analyze_time_series, select_min_aic, InsightSession, SessionState};
pub use request::{AnalysisRequest, PredictionRequest};
pub use result::{
    AnalysisResult, BestModelSummary, CandidateFailure, DifferencingInfo, EvaluatedModel,
    PredictionResponse, SessionSummary, Stage, StationaritySummary, VisualizationData,
};
pub use store::{InMemorySessionStore, SessionStore, SharedSession};
