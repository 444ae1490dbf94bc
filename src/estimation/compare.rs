//! Side-by-side comparison of moment and likelihood estimates.

use crate::estimation::result::{EstimationMethod, EstimationResult};
use serde::Serialize;

/// Elementwise differences of one coefficient vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientDifference {
    pub moments: Vec<f64>,
    pub mle: Vec<f64>,
    pub absolute_differences: Vec<f64>,
    /// `|a - b| / max(|a|, |b|)`, 0 when both are 0.
    pub relative_differences: Vec<f64>,
    pub max_difference: f64,
}

/// Difference in the noise variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceDifference {
    pub moments: f64,
    pub mle: f64,
    pub absolute_difference: f64,
    pub relative_difference: f64,
}

/// Information criteria of the likelihood fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionCriteria {
    pub aic: f64,
    pub bic: f64,
    pub log_likelihood: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateComparison {
    pub ar: Option<CoefficientDifference>,
    pub ma: Option<CoefficientDifference>,
    pub sigma2: Option<VarianceDifference>,
    pub recommended_method: Option<EstimationMethod>,
    pub reason: Option<String>,
    pub criteria: Option<SelectionCriteria>,
}

fn relative(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale > 0.0 {
        (a - b).abs() / scale
    } else {
        0.0
    }
}

fn coefficient_difference(moments: &[f64], mle: &[f64]) -> Option<CoefficientDifference> {
    if moments.is_empty() || moments.len() != mle.len() {
        return None;
    }
    let absolute_differences: Vec<f64> =
        moments.iter().zip(mle).map(|(a, b)| (a - b).abs()).collect();
    Some(CoefficientDifference {
        moments: moments.to_vec(),
        mle: mle.to_vec(),
        relative_differences: moments.iter().zip(mle).map(|(a, b)| relative(*a, *b)).collect(),
        max_difference: absolute_differences.iter().copied().fold(0.0, f64::max),
        absolute_differences,
    })
}

/// Compare a moments result with an MLE result.
///
/// Differences are reported only when both succeeded. MLE is recommended
/// whenever it succeeded, moments when only moments did, nothing otherwise.
pub fn compare(moments: &EstimationResult, mle: &EstimationResult) -> EstimateComparison {
    let both = moments.success && mle.success;
    let (ar, ma, sigma2) = if both {
        (
            coefficient_difference(&moments.ar_params, &mle.ar_params),
            coefficient_difference(&moments.ma_params, &mle.ma_params),
            Some(VarianceDifference {
                moments: moments.sigma2,
                mle: mle.sigma2,
                absolute_difference: (moments.sigma2 - mle.sigma2).abs(),
                relative_difference: relative(moments.sigma2, mle.sigma2),
            }),
        )
    } else {
        (None, None, None)
    };

    let criteria = match (mle.success, mle.aic, mle.bic, mle.log_likelihood) {
        (true, Some(aic), Some(bic), Some(log_likelihood)) => Some(SelectionCriteria {
            aic,
            bic,
            log_likelihood,
        }),
        _ => None,
    };

    let (recommended_method, reason) = if mle.success {
        (
            Some(EstimationMethod::Mle),
            Some("maximum likelihood is asymptotically efficient and has lower estimator variance"),
        )
    } else if moments.success {
        (
            Some(EstimationMethod::Moments),
            Some("maximum likelihood failed; moment estimates are the only usable fit"),
        )
    } else {
        (None, None)
    };

    EstimateComparison {
        ar,
        ma,
        sigma2,
        recommended_method,
        reason: reason.map(str::to_string),
        criteria,
    }
}
