//! Estimation methods and their per-method result.

use crate::error::InsightError;
use crate::models::{FittedModelHandle, ModelOrder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Parameter estimation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimationMethod {
    /// Method of moments (pure AR or pure MA only).
    Moments,
    /// Exact maximum likelihood.
    Mle,
}

impl EstimationMethod {
    pub const ALL: [EstimationMethod; 2] = [EstimationMethod::Moments, EstimationMethod::Mle];

    pub fn as_str(&self) -> &'static str {
        match self {
            EstimationMethod::Moments => "moments",
            EstimationMethod::Mle => "mle",
        }
    }
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstimationMethod {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "moments" | "mom" => Ok(EstimationMethod::Moments),
            "mle" | "ml" => Ok(EstimationMethod::Mle),
            other => Err(InsightError::UnknownMethod(other.to_string())),
        }
    }
}

/// Method-specific diagnostics attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimationDetails {
    None,
    /// AR moments: autocovariances and the Yule-Walker system.
    YuleWalker {
        autocovariances: Vec<f64>,
        matrix: Vec<Vec<f64>>,
        vector: Vec<f64>,
        least_squares_fallback: bool,
    },
    /// MA moments: the sample ACF being matched.
    AutocorrelationMatch {
        sample_acf: Vec<f64>,
        sample_variance: f64,
        /// `None` for the closed-form MA(1) solution.
        optimizer_converged: Option<bool>,
    },
    /// Maximum likelihood optimiser state.
    Likelihood {
        converged: bool,
        iterations: usize,
        param_names: Vec<String>,
        warnings: Vec<String>,
    },
}

/// Outcome of one (order, method) estimation.
///
/// Failures are values: `success == false` with `error` set.
#[derive(Debug, Clone, Serialize)]
pub struct EstimationResult {
    pub method: EstimationMethod,
    pub order: ModelOrder,
    pub success: bool,
    pub ar_params: Vec<f64>,
    pub ma_params: Vec<f64>,
    pub constant: f64,
    pub sigma2: f64,
    pub log_likelihood: Option<f64>,
    pub aic: Option<f64>,
    pub bic: Option<f64>,
    pub hqic: Option<f64>,
    /// Standard errors keyed by parameter name (MLE only).
    pub std_errors: BTreeMap<String, f64>,
    pub error: Option<String>,
    pub details: EstimationDetails,
    #[serde(skip)]
    pub fitted: Option<FittedModelHandle>,
}

impl EstimationResult {
    pub(crate) fn failure(method: EstimationMethod, order: ModelOrder, error: impl ToString) -> Self {
        Self {
            method,
            order,
            success: false,
            ar_params: vec![],
            ma_params: vec![],
            constant: 0.0,
            sigma2: f64::NAN,
            log_likelihood: None,
            aic: None,
            bic: None,
            hqic: None,
            std_errors: BTreeMap::new(),
            error: Some(error.to_string()),
            details: EstimationDetails::None,
            fitted: None,
        }
    }

    pub(crate) fn moments(
        order: ModelOrder,
        ar_params: Vec<f64>,
        ma_params: Vec<f64>,
        constant: f64,
        sigma2: f64,
        details: EstimationDetails,
    ) -> Self {
        Self {
            method: EstimationMethod::Moments,
            order,
            success: true,
            ar_params,
            ma_params,
            constant,
            sigma2,
            log_likelihood: None,
            aic: None,
            bic: None,
            hqic: None,
            std_errors: BTreeMap::new(),
            error: None,
            details,
            fitted: None,
        }
    }

    /// The fitted model, when the method produced one.
    pub fn fitted_model(&self) -> Option<&FittedModelHandle> {
        self.fitted.as_ref()
    }
}
