//! In-sample fit of one order.

use crate::config::MleConfig;
use crate::models::{ArimaModel, FittedArima, FittedModel, ModelOrder};
use crate::utils::stats::r_squared;
use log::warn;
use serde::Serialize;
use std::sync::Arc;

/// Goodness-of-fit statistics of a successful fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitStatistics {
    pub aic: f64,
    pub bic: f64,
    pub hqic: f64,
    pub log_likelihood: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub sigma2: f64,
}

/// Outcome of fitting one order by maximum likelihood.
///
/// `fitted_values` and `residuals` are aligned with the input from position
/// `d` on; R-squared is computed over that same span.
#[derive(Debug, Clone, Serialize)]
pub struct FitResult {
    pub success: bool,
    pub order: ModelOrder,
    pub statistics: Option<FitStatistics>,
    pub n_observations: usize,
    /// AR plus MA terms.
    pub n_parameters: usize,
    pub fitted_values: Vec<f64>,
    pub residuals: Vec<f64>,
    pub model_summary: String,
    pub error: Option<String>,
    #[serde(skip)]
    pub model: Option<Arc<FittedArima>>,
}

impl FitResult {
    fn failed(order: ModelOrder, n_observations: usize, error: String) -> Self {
        Self {
            success: false,
            order,
            statistics: None,
            n_observations,
            n_parameters: order.num_arma_params(),
            fitted_values: vec![],
            residuals: vec![],
            model_summary: String::new(),
            error: Some(error),
            model: None,
        }
    }
}

/// `1 - (1 - r2) (n - 1) / (n - k - 1)`, or `r2` when `n <= k + 1`.
pub fn adjusted_r_squared(r2: f64, n: usize, k: usize) -> f64 {
    if n > k + 1 {
        1.0 - (1.0 - r2) * (n as f64 - 1.0) / (n as f64 - k as f64 - 1.0)
    } else {
        r2
    }
}

/// Fit `order` to `values`, never returning an error.
pub fn fit_model(values: &[f64], order: ModelOrder, config: &MleConfig) -> FitResult {
    let fitted = match ArimaModel::new(order).with_config(config.clone()).fit(values) {
        Ok(fitted) => fitted,
        Err(e) => {
            warn!("evaluation stage: fitting {} failed: {}", order, e);
            return FitResult::failed(order, values.len(), e.to_string());
        }
    };

    let actual = fitted.aligned_actuals();
    let r2 = r_squared(actual, fitted.fitted_values());
    let k = order.num_arma_params();

    FitResult {
        success: true,
        order,
        statistics: Some(FitStatistics {
            aic: fitted.aic(),
            bic: fitted.bic(),
            hqic: fitted.hqic(),
            log_likelihood: fitted.log_likelihood(),
            r_squared: r2,
            adj_r_squared: adjusted_r_squared(r2, actual.len(), k),
            sigma2: fitted.sigma2(),
        }),
        n_observations: values.len(),
        n_parameters: k,
        fitted_values: fitted.fitted_values().to_vec(),
        residuals: fitted.residuals().to_vec(),
        model_summary: fitted.summary(),
        error: None,
        model: Some(Arc::new(fitted)),
    }
}
