//! # arima-insight
//!
//! Box-Jenkins ARIMA analysis of univariate time series.
//!
//! A session walks a series through stationarity testing, differencing,
//! ACF/PACF pattern reading, candidate order proposal, moment and maximum
//! likelihood estimation, residual diagnostics and adequacy scoring, picks
//! the candidate with the lowest AIC and forecasts with it.
//!
//! ```
//! use arima_insight::prelude::*;
//!
//! let values: Vec<f64> = (0..100).map(|t| (t as f64 * 0.3).cos() * 2.0).collect();
//! let series = Series::from_values(values).unwrap();
//! let session = InsightSession::quick_analysis(series, AnalysisRequest::default()).unwrap();
//! println!("{:?}", session.summary().unwrap().best_model);
//! ```

#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod error;
pub mod estimation;
pub mod evaluation;
pub mod identification;
pub mod models;
pub mod session;
pub mod utils;
pub mod validation;

pub use error::{InsightError, Result};

pub mod prelude {
    pub use crate::config::InsightConfig;
    pub use crate::core::{Forecast, Series};
    pub use crate::error::{InsightError, Result};
    pub use crate::estimation::{EstimationMethod, ParameterEstimator};
    pub use crate::evaluation::ModelEvaluator;
    pub use crate::identification::OrderIdentifier;
    pub use crate::models::{ArimaModel, FittedModel, ModelOrder};
    pub use crate::session::{
        analyze_time_series, AnalysisRequest, InsightSession, PredictionRequest,
    };
    pub use crate::validation::StationarityTester;
}
