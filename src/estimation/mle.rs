//! Maximum likelihood estimation wrapper.

use crate::config::MleConfig;
use crate::estimation::result::{EstimationDetails, EstimationMethod, EstimationResult};
use crate::models::{ArimaModel, ModelOrder};
use log::warn;
use std::sync::Arc;

/// Fit `order` to the undifferenced `values` by maximum likelihood.
///
/// Any fitting error becomes a `success == false` result.
pub fn estimate_mle(values: &[f64], order: ModelOrder, config: &MleConfig) -> EstimationResult {
    let fitted = match ArimaModel::new(order).with_config(config.clone()).fit(values) {
        Ok(fitted) => fitted,
        Err(e) => {
            warn!("estimation stage: {} by mle failed: {}", order, e);
            return EstimationResult::failure(EstimationMethod::Mle, order, e);
        }
    };

    let std_errors = fitted
        .parameters()
        .iter()
        .map(|param| (param.name.clone(), param.std_error))
        .collect();
    let param_names = fitted
        .parameters()
        .iter()
        .map(|param| param.name.clone())
        .collect();

    EstimationResult {
        method: EstimationMethod::Mle,
        order,
        success: true,
        ar_params: fitted.ar_coefficients().to_vec(),
        ma_params: fitted.ma_coefficients().to_vec(),
        constant: fitted.constant(),
        sigma2: fitted.sigma2(),
        log_likelihood: Some(fitted.log_likelihood()),
        aic: Some(fitted.aic()),
        bic: Some(fitted.bic()),
        hqic: Some(fitted.hqic()),
        std_errors,
        error: None,
        details: EstimationDetails::Likelihood {
            converged: fitted.converged(),
            iterations: fitted.iterations(),
            param_names,
            warnings: fitted.warnings().to_vec(),
        },
        fitted: Some(Arc::new(fitted)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_is_a_value() {
        let result = estimate_mle(&[1.0, 2.0, 3.0], ModelOrder::new(2, 0, 2), &MleConfig::default());
        assert!(!result.success);
        assert!(result.fitted.is_none());
        assert!(result.error.unwrap().contains("ARIMA(2, 0, 2)"));
    }

    #[test]
    fn success_carries_handle_and_names() {
        let values: Vec<f64> = (0..80).map(|i| ((i * 37) % 17) as f64 - 8.0).collect();
        let result = estimate_mle(&values, ModelOrder::new(1, 0, 0), &MleConfig::default());
        assert!(result.success);
        assert!(result.aic.is_some());
        assert!(result.std_errors.contains_key("ar.L1"));
        assert!(result.std_errors.contains_key("const"));
        let handle = result.fitted_model().unwrap();
        assert_eq!(handle.residuals().len(), 80);
        assert_eq!(handle.forecast(3, 0.05).unwrap().horizon(), 3);
    }
}
