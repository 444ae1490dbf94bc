//! Capability interface exposed by fitted models.

use crate::core::Forecast;
use crate::error::Result;
use std::sync::Arc;

/// A fitted model as seen by the rest of the pipeline.
///
/// Results own their fitted model through this narrow interface; callers can
/// forecast and read the in-sample sequences but never reach the concrete type.
pub trait FittedModel: std::fmt::Debug + Send + Sync {
    /// Forecast `steps` periods ahead with `(1 - alpha)` prediction intervals.
    fn forecast(&self, steps: usize, alpha: f64) -> Result<Forecast>;

    /// One-step-ahead prediction errors.
    fn residuals(&self) -> &[f64];

    /// In-sample fitted values on the scale of the input series.
    fn fitted_values(&self) -> &[f64];

    /// Human-readable model name, e.g. `ARIMA(1, 1, 0)`.
    fn name(&self) -> String;
}

/// Shared handle to a fitted model.
pub type FittedModelHandle = Arc<dyn FittedModel>;
