//! Stationarity tests and the differencing search built on them.
//!
//! Two tests with opposite null hypotheses are combined:
//! - Augmented Dickey-Fuller, H0 = unit root (non-stationary)
//! - KPSS (level), H0 = stationary
//!
//! ADF uses a constant-only regression with the augmentation lag picked by
//! AIC and trimmed while the last lag is insignificant, MacKinnon (1994) p-values and MacKinnon (2010) critical values. KPSS
//! uses the Hobijn et al. data-dependent bandwidth with a Bartlett kernel.

use crate::config::StationarityConfig;
use crate::core::Series;
use crate::error::{InsightError, Result};
use crate::models::arima::{difference, seasonal_difference};
use crate::utils::linalg::{least_squares, LeastSquares};
use crate::utils::stats::cdf_normal;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// Which test produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StationarityTest {
    Adf,
    Kpss,
}

/// Which tests `StationarityTester::test_with` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestSelection {
    Adf,
    Kpss,
    #[default]
    Both,
}

/// Result of one stationarity test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityVerdict {
    pub test: StationarityTest,
    pub statistic: f64,
    pub p_value: f64,
    /// Augmentation lags (ADF) or bandwidth (KPSS).
    pub lags: usize,
    /// Observations entering the test regression.
    pub n_obs: usize,
    /// Critical values keyed by significance level, e.g. `"5%"`.
    pub critical_values: BTreeMap<String, f64>,
    pub is_stationary: bool,
    pub interpretation: String,
}

/// Three-way outcome of combining ADF and KPSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StationarityConclusion {
    Stationary,
    NonStationary,
    /// Tests disagree; treated as non-stationary.
    Inconclusive,
}

impl StationarityConclusion {
    pub fn is_stationary(self) -> bool {
        matches!(self, StationarityConclusion::Stationary)
    }
}

/// Combined verdict of the selected tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStationarity {
    pub adf: Option<StationarityVerdict>,
    pub kpss: Option<StationarityVerdict>,
    pub conclusion: StationarityConclusion,
    pub is_stationary: bool,
    pub interpretation: String,
}

/// Combine the two test decisions.
///
/// Agreement carries over; disagreement is `Inconclusive`, which counts as
/// non-stationary.
pub fn combine(adf_stationary: bool, kpss_stationary: bool) -> StationarityConclusion {
    match (adf_stationary, kpss_stationary) {
        (true, true) => StationarityConclusion::Stationary,
        (false, false) => StationarityConclusion::NonStationary,
        _ => StationarityConclusion::Inconclusive,
    }
}

// MacKinnon (1994) response surface, constant-only regression, one variable.
/// Two-sided 10% normal quantile; trailing ADF lags below it are dropped.
const ADF_LAG_T_STOP: f64 = 1.644_853_626_951_472_2;

const ADF_MAX_STAT: f64 = 2.74;
const ADF_MIN_STAT: f64 = -18.83;
const ADF_STAR_STAT: f64 = -1.61;
const ADF_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const ADF_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) finite-sample critical values, constant-only regression.
const ADF_CRITICAL: [(&str, [f64; 4]); 3] = [
    ("1%", [-3.43035, -6.5393, -16.786, -79.433]),
    ("5%", [-2.86154, -2.8903, -4.234, -40.04]),
    ("10%", [-2.56677, -1.5384, -2.809, 0.0]),
];

const KPSS_CRITICAL: [(&str, f64, f64); 4] = [
    ("10%", 0.347, 0.10),
    ("5%", 0.463, 0.05),
    ("2.5%", 0.574, 0.025),
    ("1%", 0.739, 0.01),
];

fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Approximate ADF p-value (MacKinnon 1994).
pub fn adf_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > ADF_MAX_STAT {
        return 1.0;
    }
    if statistic < ADF_MIN_STAT {
        return 0.0;
    }
    let value = if statistic <= ADF_STAR_STAT {
        polyval(&ADF_SMALL_P, statistic)
    } else {
        polyval(&ADF_LARGE_P, statistic)
    };
    cdf_normal(value)
}

/// ADF critical values for a regression with `n_obs` observations.
pub fn adf_critical_values(n_obs: usize) -> BTreeMap<String, f64> {
    let inv = 1.0 / n_obs.max(1) as f64;
    ADF_CRITICAL
        .iter()
        .map(|(level, b)| (level.to_string(), polyval(b, inv)))
        .collect()
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Design rows `[1, y_{t-1}, dy_{t-1}, ..., dy_{t-lags}]` for diff positions `start..`.
fn adf_design(levels: &[f64], diffs: &[f64], lags: usize, start: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let rows = (start..diffs.len())
        .map(|t| {
            let mut row = Vec::with_capacity(lags + 2);
            row.push(1.0);
            row.push(levels[t]);
            row.extend((1..=lags).map(|j| diffs[t - j]));
            row
        })
        .collect();
    (rows, diffs[start..].to_vec())
}

/// Augmented Dickey-Fuller test with a constant.
///
/// The augmentation lag is chosen by AIC over `0..=12 (n/100)^(1/4)` on a
/// common sample. Trailing lags whose coefficient has `|t| < 1.645` are then
/// dropped one at a time. The regression is refit with the
/// final lag and the series is judged stationary when `p < alpha`.
pub fn adf_test(values: &[f64], alpha: f64) -> Result<StationarityVerdict> {
    let n = values.len();
    if n < 6 {
        return Err(InsightError::InsufficientData { needed: 6, got: n });
    }

    if is_constant(values) {
        return Ok(StationarityVerdict {
            test: StationarityTest::Adf,
            statistic: f64::NEG_INFINITY,
            p_value: 0.0,
            lags: 0,
            n_obs: n - 1,
            critical_values: adf_critical_values(n - 1),
            is_stationary: true,
            interpretation: "constant series: trivially stationary".to_string(),
        });
    }

    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lag = schwert.min(n / 2 - 2);
    let diffs = difference(values, 1);

    let fits: Vec<Option<LeastSquares>> = (0..=max_lag)
        .map(|lags| {
            let (rows, y) = adf_design(values, &diffs, lags, max_lag);
            least_squares(&rows, &y).ok()
        })
        .collect();

    let mut best_lag = 0;
    let mut best_aic = f64::INFINITY;
    for (lags, fit) in fits.iter().enumerate() {
        let Some(fit) = fit else { continue };
        let aic = -2.0 * fit.log_likelihood() + 2.0 * (lags + 2) as f64;
        if aic < best_aic {
            best_aic = aic;
            best_lag = lags;
        }
    }
    // Column 0 is the constant, column 1 the lagged level.
    while best_lag > 0 {
        match &fits[best_lag] {
            Some(fit) if fit.t_stat(best_lag + 1).abs() >= ADF_LAG_T_STOP => break,
            _ => best_lag -= 1,
        }
    }

    let (rows, y) = adf_design(values, &diffs, best_lag, best_lag);
    let fit = least_squares(&rows, &y)?;
    let statistic = fit.t_stat(1);
    let n_obs = fit.nobs();
    let scale: f64 = y.iter().map(|v| v * v).sum();
    if !statistic.is_finite() || fit.sse <= 1e-12 * scale {
        // Exact fit (e.g. a deterministic trend): no evidence against a unit root.
        return Ok(StationarityVerdict {
            test: StationarityTest::Adf,
            statistic: f64::NAN,
            p_value: 1.0,
            lags: best_lag,
            n_obs,
            critical_values: adf_critical_values(n_obs),
            is_stationary: false,
            interpretation: "ADF regression fits exactly: unit root not rejected".to_string(),
        });
    }
    let p_value = adf_p_value(statistic);
    let is_stationary = p_value < alpha;
    let interpretation = if is_stationary {
        format!(
            "ADF statistic {:.4}, p-value {:.4} < {}: unit root rejected, series appears stationary",
            statistic, p_value, alpha
        )
    } else {
        format!(
            "ADF statistic {:.4}, p-value {:.4} >= {}: unit root not rejected, series appears non-stationary",
            statistic, p_value, alpha
        )
    };

    Ok(StationarityVerdict {
        test: StationarityTest::Adf,
        statistic,
        p_value,
        lags: best_lag,
        n_obs,
        critical_values: adf_critical_values(n_obs),
        is_stationary,
        interpretation,
    })
}

/// Lag product `sum_t r_t r_{t-i}`.
fn lag_product(resids: &[f64], i: usize) -> f64 {
    resids[i..]
        .iter()
        .zip(&resids[..resids.len() - i])
        .map(|(a, b)| a * b)
        .sum()
}

/// Hobijn, Franses and Ooms (1998) automatic bandwidth.
fn kpss_bandwidth(resids: &[f64]) -> usize {
    let n = resids.len();
    let nf = n as f64;
    let cov_lags = nf.powf(2.0 / 9.0) as usize;
    let mut s0 = resids.iter().map(|r| r * r).sum::<f64>() / nf;
    let mut s1 = 0.0;
    for i in 1..=cov_lags.min(n - 1) {
        let prod = lag_product(resids, i) / (nf / 2.0);
        s0 += prod;
        s1 += i as f64 * prod;
    }
    if s0 == 0.0 {
        return 0;
    }
    let s_hat = s1 / s0;
    let gamma = 1.1447 * (s_hat * s_hat).powf(1.0 / 3.0);
    ((gamma * nf.powf(1.0 / 3.0)) as usize).min(n - 1)
}

fn kpss_p_value(statistic: f64) -> f64 {
    let (first, last) = (KPSS_CRITICAL[0], KPSS_CRITICAL[KPSS_CRITICAL.len() - 1]);
    if statistic <= first.1 {
        return first.2;
    }
    if statistic >= last.1 {
        return last.2;
    }
    KPSS_CRITICAL
        .windows(2)
        .find(|w| statistic <= w[1].1)
        .map(|w| {
            let (x0, y0) = (w[0].1, w[0].2);
            let (x1, y1) = (w[1].1, w[1].2);
            y0 + (statistic - x0) * (y1 - y0) / (x1 - x0)
        })
        .unwrap_or(last.2)
}

/// KPSS test for level stationarity.
///
/// The p-value is interpolated from the tabulated critical values and is
/// therefore bounded to `[0.01, 0.10]`. Stationary when `p > alpha`.
pub fn kpss_test(values: &[f64], alpha: f64) -> Result<StationarityVerdict> {
    let n = values.len();
    if n < 3 {
        return Err(InsightError::InsufficientData { needed: 3, got: n });
    }
    let nf = n as f64;
    let m = values.iter().sum::<f64>() / nf;
    let resids: Vec<f64> = values.iter().map(|x| x - m).collect();

    let lags = kpss_bandwidth(&resids);
    let eta = resids
        .iter()
        .scan(0.0, |acc, r| {
            *acc += r;
            Some(*acc * *acc)
        })
        .sum::<f64>()
        / (nf * nf);

    let mut long_run = resids.iter().map(|r| r * r).sum::<f64>();
    for i in 1..=lags {
        long_run += 2.0 * lag_product(&resids, i) * (1.0 - i as f64 / (lags as f64 + 1.0));
    }
    let long_run = long_run / nf;

    let statistic = if long_run > 0.0 { eta / long_run } else { 0.0 };
    let p_value = kpss_p_value(statistic);
    let is_stationary = p_value > alpha;
    let interpretation = if is_stationary {
        format!(
            "KPSS statistic {:.4}, p-value {:.4} > {}: level stationarity not rejected",
            statistic, p_value, alpha
        )
    } else {
        format!(
            "KPSS statistic {:.4}, p-value {:.4} <= {}: level stationarity rejected, series appears non-stationary",
            statistic, p_value, alpha
        )
    };

    Ok(StationarityVerdict {
        test: StationarityTest::Kpss,
        statistic,
        p_value,
        lags,
        n_obs: n,
        critical_values: KPSS_CRITICAL
            .iter()
            .map(|(level, cv, _)| (level.to_string(), *cv))
            .collect(),
        is_stationary,
        interpretation,
    })
}

/// Series produced by the differencing search.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferencingOutcome {
    pub series: Series,
    /// Ordinary differences applied.
    pub order: usize,
    /// Set when `max_order` was exhausted and the lenient fallback was used.
    pub warning: Option<InsightError>,
}

/// Runs the stationarity tests and the differencing search.
#[derive(Debug, Clone, Default)]
pub struct StationarityTester {
    config: StationarityConfig,
}

impl StationarityTester {
    pub fn new(config: StationarityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StationarityConfig {
        &self.config
    }

    fn check_length(&self, series: &Series) -> Result<()> {
        if series.is_empty() {
            return Err(InsightError::EmptyData);
        }
        if series.len() < self.config.min_observations {
            return Err(InsightError::InsufficientData {
                needed: self.config.min_observations,
                got: series.len(),
            });
        }
        Ok(())
    }

    /// Run ADF and KPSS and combine them.
    pub fn test(&self, series: &Series) -> Result<OverallStationarity> {
        self.test_with(series, TestSelection::Both)
    }

    /// Run the selected tests. With a single test its decision is the conclusion.
    pub fn test_with(&self, series: &Series, selection: TestSelection) -> Result<OverallStationarity> {
        self.check_length(series)?;
        let alpha = self.config.alpha;
        let adf = match selection {
            TestSelection::Adf | TestSelection::Both => Some(adf_test(series.values(), alpha)?),
            TestSelection::Kpss => None,
        };
        let kpss = match selection {
            TestSelection::Kpss | TestSelection::Both => Some(kpss_test(series.values(), alpha)?),
            TestSelection::Adf => None,
        };

        let (conclusion, interpretation) = match (&adf, &kpss) {
            (Some(a), Some(k)) => {
                let conclusion = combine(a.is_stationary, k.is_stationary);
                let text = match conclusion {
                    StationarityConclusion::Stationary => {
                        "ADF and KPSS both indicate stationarity".to_string()
                    }
                    StationarityConclusion::NonStationary => {
                        "ADF and KPSS both indicate non-stationarity; differencing recommended"
                            .to_string()
                    }
                    StationarityConclusion::Inconclusive => format!(
                        "inconclusive: ADF says {}, KPSS says {}; treated as non-stationary",
                        stationary_word(a.is_stationary),
                        stationary_word(k.is_stationary)
                    ),
                };
                (conclusion, text)
            }
            (Some(v), None) | (None, Some(v)) => {
                let conclusion = if v.is_stationary {
                    StationarityConclusion::Stationary
                } else {
                    StationarityConclusion::NonStationary
                };
                (conclusion, v.interpretation.clone())
            }
            (None, None) => {
                return Err(InsightError::InvalidInput(
                    "no stationarity test selected".to_string(),
                ))
            }
        };

        debug!("stationarity: {:?} ({})", conclusion, interpretation);
        Ok(OverallStationarity {
            adf,
            kpss,
            conclusion,
            is_stationary: conclusion.is_stationary(),
            interpretation,
        })
    }

    /// Apply `seasonal_order` seasonal differences then `order` ordinary ones.
    pub fn difference(
        &self,
        series: &Series,
        order: usize,
        seasonal_order: usize,
        seasonal_period: usize,
    ) -> Result<Series> {
        let seasonal = seasonal_difference(series.values(), seasonal_order, seasonal_period);
        let values = difference(&seasonal, order);
        if values.is_empty() {
            return Err(InsightError::InsufficientData {
                needed: order + seasonal_order * seasonal_period + 1,
                got: series.len(),
            });
        }
        Ok(series.with_trailing_values(values))
    }

    /// [`difference`](Self::difference) at the configured seasonal period.
    pub fn difference_seasonal(&self, series: &Series, order: usize, seasonal_order: usize) -> Result<Series> {
        self.difference(series, order, seasonal_order, self.config.seasonal_period)
    }

    /// Difference until the ADF test reports stationarity.
    ///
    /// Returns order 0 when the combined test already finds the series
    /// stationary. When `max_order` differences are not enough, falls back
    /// to the first difference (order 1) and records a
    /// [`InsightError::DifferencingExhausted`] warning.
    pub fn auto_difference(&self, series: &Series, max_order: usize) -> Result<DifferencingOutcome> {
        if self.test(series)?.is_stationary {
            return Ok(DifferencingOutcome {
                series: series.clone(),
                order: 0,
                warning: None,
            });
        }

        let mut current = series.clone();
        for order in 1..=max_order {
            current = match self.difference(&current, 1, 0, 0) {
                Ok(next) => next,
                Err(_) => break,
            };
            match adf_test(current.values(), self.config.alpha) {
                Ok(verdict) if verdict.is_stationary => {
                    debug!("series stationary after {} difference(s)", order);
                    return Ok(DifferencingOutcome {
                        series: current,
                        order,
                        warning: None,
                    });
                }
                Ok(_) => {}
                Err(e) => debug!("ADF skipped at order {}: {}", order, e),
            }
        }

        let warning = InsightError::DifferencingExhausted { max_order };
        warn!("{}; falling back to first difference", warning);
        if max_order == 0 {
            return Ok(DifferencingOutcome {
                series: series.clone(),
                order: 0,
                warning: Some(warning),
            });
        }
        Ok(DifferencingOutcome {
            series: self.difference(series, 1, 0, 0)?,
            order: 1,
            warning: Some(warning),
        })
    }
}

fn stationary_word(stationary: bool) -> &'static str {
    if stationary {
        "stationary"
    } else {
        "non-stationary"
    }
}
