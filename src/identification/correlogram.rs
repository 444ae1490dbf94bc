//! Sample ACF and PACF with confidence bands.

use crate::error::{InsightError, Result};
use crate::utils::stats::{autocovariances, two_sided_z};
use serde::Serialize;

/// Which correlation function a [`Correlogram`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelogramKind {
    Acf,
    Pacf,
}

/// Correlations at lags `0..=max_lag` with a band centred on zero.
///
/// `half_widths[k]` is the band half-width at lag `k`; lag 0 has width 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlogram {
    pub kind: CorrelogramKind,
    pub values: Vec<f64>,
    pub half_widths: Vec<f64>,
    pub alpha: f64,
    pub n_obs: usize,
}

impl Correlogram {
    pub fn max_lag(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// `[lower, upper]` band per lag.
    pub fn bands(&self) -> Vec<[f64; 2]> {
        self.half_widths.iter().map(|w| [-w, *w]).collect()
    }

    /// Whether the correlation at `lag` lies outside its band.
    pub fn is_significant(&self, lag: usize) -> bool {
        lag > 0
            && lag < self.values.len()
            && self.values[lag].abs() > self.half_widths[lag]
    }
}

/// Lags used when none are requested: `min(n / 4, max_lags)`, kept below `n / 2`.
pub fn default_lags(n: usize, max_lags: usize) -> usize {
    cap_lags(n / 4, n, max_lags)
}

fn cap_lags(requested: usize, n: usize, max_lags: usize) -> usize {
    requested.min(max_lags).min((n / 2).saturating_sub(1))
}

fn check_input(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(InsightError::EmptyData);
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(InsightError::MissingValues);
    }
    Ok(())
}

/// Sample autocorrelation function with Bartlett bands.
///
/// The band at lag `k` uses `var(r_k) = (1 + 2 * sum_{j<k} r_j^2) / n`.
pub fn acf(values: &[f64], lags: usize, alpha: f64) -> Result<Correlogram> {
    check_input(values)?;
    let n = values.len();
    let lags = lags.min(n - 1);
    let acov = autocovariances(values, lags);
    let values_out: Vec<f64> = if acov[0] > 0.0 {
        acov.iter().map(|g| g / acov[0]).collect()
    } else {
        // Constant series.
        (0..=lags).map(|k| if k == 0 { 1.0 } else { 0.0 }).collect()
    };

    let z = two_sided_z(alpha);
    let nf = n as f64;
    let mut half_widths = Vec::with_capacity(lags + 1);
    let mut cumulative = 0.0;
    for k in 0..=lags {
        if k == 0 {
            half_widths.push(0.0);
            continue;
        }
        if k > 1 {
            cumulative += values_out[k - 1] * values_out[k - 1];
        }
        half_widths.push(z * ((1.0 + 2.0 * cumulative) / nf).sqrt());
    }

    Ok(Correlogram {
        kind: CorrelogramKind::Acf,
        values: values_out,
        half_widths,
        alpha,
        n_obs: n,
    })
}

/// Sample partial autocorrelation function.
///
/// Yule-Walker with autocovariances divided by `n - k`, solved by
/// Durbin-Levinson. Bands are `+-z / sqrt(n)`.
pub fn pacf(values: &[f64], lags: usize, alpha: f64) -> Result<Correlogram> {
    check_input(values)?;
    let n = values.len();
    let lags = lags.min((n / 2).saturating_sub(1));
    let nf = n as f64;

    let adjusted: Vec<f64> = autocovariances(values, lags)
        .iter()
        .enumerate()
        .map(|(k, g)| g * nf / (nf - k as f64))
        .collect();

    let mut values_out = vec![1.0];
    if adjusted[0] > 0.0 && lags > 0 {
        let rho: Vec<f64> = adjusted.iter().map(|g| g / adjusted[0]).collect();
        let mut phi: Vec<f64> = Vec::with_capacity(lags);
        let mut error_var = 1.0;
        for k in 1..=lags {
            let numerator = rho[k]
                - phi
                    .iter()
                    .enumerate()
                    .map(|(j, p)| p * rho[k - 1 - j])
                    .sum::<f64>();
            let reflection = if error_var > 0.0 { numerator / error_var } else { 0.0 };
            let previous = phi.clone();
            for j in 0..previous.len() {
                phi[j] = previous[j] - reflection * previous[previous.len() - 1 - j];
            }
            phi.push(reflection);
            error_var *= 1.0 - reflection * reflection;
            values_out.push(reflection);
        }
    } else {
        values_out.extend(std::iter::repeat(0.0).take(lags));
    }

    let band = two_sided_z(alpha) / nf.sqrt();
    let half_widths = (0..=lags).map(|k| if k == 0 { 0.0 } else { band }).collect();

    Ok(Correlogram {
        kind: CorrelogramKind::Pacf,
        values: values_out,
        half_widths,
        alpha,
        n_obs: n,
    })
}

/// ACF and PACF at the same lag count, capped below `n / 2`.
pub fn acf_pacf(values: &[f64], lags: usize, alpha: f64) -> Result<(Correlogram, Correlogram)> {
    let lags = lags.min((values.len() / 2).saturating_sub(1));
    Ok((acf(values, lags, alpha)?, pacf(values, lags, alpha)?))
}
