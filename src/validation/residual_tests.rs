//! Residual diagnostic tests: autocorrelation, normality and variance drift.

use crate::error::{InsightError, Result};
use crate::utils::stats::{
    autocovariances, excess_kurtosis, pearson_correlation, quantile_normal, skewness, cdf_normal,
};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Ljung-Box statistic at one lag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LjungBoxLag {
    pub lag: usize,
    pub statistic: f64,
    pub p_value: f64,
}

/// Ljung-Box test result over lags `1..=max_lag`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LjungBoxResult {
    /// Q statistic at the largest lag tested.
    pub statistic: f64,
    /// P-value at the largest lag tested.
    pub p_value: f64,
    pub max_lag: usize,
    /// Degrees of freedom at the largest lag.
    pub df: usize,
    /// Statistic and p-value at every lag.
    pub table: Vec<LjungBoxLag>,
}

impl LjungBoxResult {
    /// True if we fail to reject the null of no autocorrelation.
    pub fn is_white_noise(&self, alpha: f64) -> bool {
        self.p_value > alpha
    }
}

fn chi_squared_sf(statistic: f64, df: f64) -> f64 {
    match ChiSquared::new(df) {
        Ok(dist) => 1.0 - dist.cdf(statistic.max(0.0)),
        Err(_) => f64::NAN,
    }
}

/// Default portmanteau lag count: `min(10, n / 4)`, at least one.
pub fn default_ljung_box_lags(n: usize) -> usize {
    (n / 4).clamp(1, 10)
}

/// Ljung-Box portmanteau test.
///
/// Degrees of freedom equal the lag (no adjustment for fitted parameters).
pub fn ljung_box(residuals: &[f64], lags: Option<usize>) -> Result<LjungBoxResult> {
    let n = residuals.len();
    if n < 3 {
        return Err(InsightError::InsufficientData { needed: 3, got: n });
    }
    let max_lag = lags.unwrap_or_else(|| default_ljung_box_lags(n)).clamp(1, n - 1);

    let acov = autocovariances(residuals, max_lag);
    let nf = n as f64;
    let mut q = 0.0;
    let mut table = Vec::with_capacity(max_lag);
    for k in 1..=max_lag {
        let rho = if acov[0] > 0.0 { acov[k] / acov[0] } else { 0.0 };
        q += rho * rho / (nf - k as f64);
        let statistic = nf * (nf + 2.0) * q;
        table.push(LjungBoxLag {
            lag: k,
            statistic,
            p_value: chi_squared_sf(statistic, k as f64),
        });
    }

    let last = table[table.len() - 1].clone();
    Ok(LjungBoxResult {
        statistic: last.statistic,
        p_value: last.p_value,
        max_lag,
        df: max_lag,
        table,
    })
}

/// Result of a normality test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityTest {
    pub statistic: f64,
    pub p_value: f64,
    /// `p_value > 0.05`.
    pub is_normal: bool,
}

impl NormalityTest {
    fn new(statistic: f64, p_value: f64) -> Self {
        Self {
            statistic,
            p_value,
            is_normal: p_value > 0.05,
        }
    }
}

/// Jarque-Bera omnibus test built on sample skewness and excess kurtosis.
pub fn jarque_bera(values: &[f64]) -> Result<NormalityTest> {
    let n = values.len();
    if n < 3 {
        return Err(InsightError::InsufficientData { needed: 3, got: n });
    }
    let s = skewness(values);
    let k = excess_kurtosis(values);
    let statistic = n as f64 / 6.0 * (s * s + k * k / 4.0);
    Ok(NormalityTest::new(statistic, chi_squared_sf(statistic, 2.0)))
}

/// Largest sample the Shapiro-Wilk approximation is used for.
pub const SHAPIRO_MAX_N: usize = 5000;

fn poly(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Shapiro-Wilk coefficients for the upper half of the order statistics
/// (Royston 1995, algorithm AS R94).
fn shapiro_coefficients(n: usize) -> Vec<f64> {
    const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
    const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];

    let half = n / 2;
    if n == 3 {
        return vec![std::f64::consts::FRAC_1_SQRT_2];
    }

    let nf = n as f64;
    let m: Vec<f64> = (1..=half)
        .map(|i| quantile_normal((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();

    let mut a = vec![0.0; half];
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    a[0] = a1;
    let (first_plain, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };
    for i in first_plain..half {
        a[i] = -m[i] / fac;
    }
    a
}

/// Significance of a Shapiro-Wilk `w` for sample size `n`.
fn shapiro_p_value(w: f64, n: usize) -> f64 {
    const G: [f64; 2] = [-2.273, 0.459];
    const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
    const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
    const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
    const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];

    let nf = n as f64;
    if n == 3 {
        let p = 6.0 / std::f64::consts::PI
            * (w.sqrt().asin() - std::f64::consts::FRAC_PI_3);
        return p.max(0.0);
    }

    let mut y = (1.0 - w).ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return 1e-99;
        }
        y = -(gamma - y).ln();
        (poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let ln_n = nf.ln();
        (poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };
    1.0 - cdf_normal((y - m) / s)
}

/// Shapiro-Wilk test for `3 <= n <= 5000`.
pub fn shapiro_wilk(values: &[f64]) -> Result<NormalityTest> {
    let n = values.len();
    if n < 3 {
        return Err(InsightError::InsufficientData { needed: 3, got: n });
    }
    if n > SHAPIRO_MAX_N {
        return Err(InsightError::InvalidInput(format!(
            "Shapiro-Wilk supports at most {} observations, got {}",
            SHAPIRO_MAX_N, n
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let range = sorted[n - 1] - sorted[0];
    if range < 1e-19 {
        return Err(InsightError::Computation(
            "Shapiro-Wilk is undefined for constant data".to_string(),
        ));
    }

    let a = shapiro_coefficients(n);
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (sorted[n - 1 - i] - sorted[i]))
        .sum();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let ss: f64 = sorted.iter().map(|x| (x - mean).powi(2)).sum();
    let w = (numerator * numerator / ss).min(1.0);

    Ok(NormalityTest::new(w, shapiro_p_value(w, n)))
}

/// Correlation of squared residuals with time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeteroskedasticityTest {
    pub correlation: f64,
    pub p_value: f64,
    /// `|r| < 0.1` and `p > 0.05`.
    pub is_homoskedastic: bool,
}

/// Variance-drift check: Pearson correlation between squared residuals and a time index.
pub fn heteroskedasticity_test(residuals: &[f64]) -> Result<HeteroskedasticityTest> {
    let n = residuals.len();
    if n < 3 {
        return Err(InsightError::InsufficientData { needed: 3, got: n });
    }
    let squared: Vec<f64> = residuals.iter().map(|r| r * r).collect();
    let time: Vec<f64> = (0..n).map(|t| t as f64).collect();
    let (correlation, p_value) = pearson_correlation(&squared, &time);
    Ok(HeteroskedasticityTest {
        correlation,
        p_value,
        is_homoskedastic: correlation.abs() < 0.1 && p_value > 0.05,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn uniform_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    fn normal_scores(n: usize) -> Vec<f64> {
        (1..=n)
            .map(|i| quantile_normal((i as f64 - 0.375) / (n as f64 + 0.25)))
            .collect()
    }

    #[test]
    fn ljung_box_white_noise() {
        let result = ljung_box(&uniform_noise(200, 1), None).unwrap();
        assert_eq!(result.max_lag, 10);
        assert_eq!(result.table.len(), 10);
        assert_eq!(result.df, 10);
        assert!(result.is_white_noise(0.01), "p = {}", result.p_value);
    }

    #[test]
    fn ljung_box_detects_autocorrelation() {
        let residuals: Vec<f64> = (0..100).map(|i| (i as f64 * 0.3).sin()).collect();
        let result = ljung_box(&residuals, None).unwrap();
        assert!(!result.is_white_noise(0.05));
        assert!(result.table.windows(2).all(|w| w[1].statistic >= w[0].statistic));
    }

    #[test]
    fn ljung_box_default_lags() {
        assert_eq!(default_ljung_box_lags(20), 5);
        assert_eq!(default_ljung_box_lags(400), 10);
        assert_eq!(default_ljung_box_lags(3), 1);
        assert!(ljung_box(&[1.0, 2.0], None).is_err());
    }

    #[test]
    fn ljung_box_constant_is_white() {
        let result = ljung_box(&[1.0; 30], Some(5)).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_relative_eq!(result.p_value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn jarque_bera_normal_scores_pass() {
        let result = jarque_bera(&normal_scores(200)).unwrap();
        assert!(result.is_normal, "{:?}", result);
    }

    #[test]
    fn jarque_bera_skewed_fails() {
        let skewed: Vec<f64> = (0..200).map(|i| (i as f64 / 20.0).exp()).collect();
        let result = jarque_bera(&skewed).unwrap();
        assert!(!result.is_normal);
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn shapiro_wilk_normal_scores_pass() {
        for n in [3, 5, 10, 50, 500] {
            let result = shapiro_wilk(&normal_scores(n)).unwrap();
            assert!(result.statistic > 0.9, "n = {}: {:?}", n, result);
            assert!(result.is_normal, "n = {}: {:?}", n, result);
        }
    }

    #[test]
    fn shapiro_wilk_skewed_fails() {
        let skewed: Vec<f64> = (0..60).map(|i| (i as f64 / 6.0).exp()).collect();
        let result = shapiro_wilk(&skewed).unwrap();
        assert!(!result.is_normal, "{:?}", result);
    }

    #[test]
    fn shapiro_wilk_limits() {
        assert!(shapiro_wilk(&[1.0, 2.0]).is_err());
        assert!(shapiro_wilk(&[2.0; 10]).is_err());
        assert!(matches!(
            shapiro_wilk(&vec![0.0; SHAPIRO_MAX_N + 1]),
            Err(InsightError::InvalidInput(_))
        ));
    }

    #[test]
    fn shapiro_coefficients_are_normalised() {
        for n in [4, 7, 20, 101] {
            let a = shapiro_coefficients(n);
            let norm: f64 = 2.0 * a.iter().map(|v| v * v).sum::<f64>();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn heteroskedasticity_growing_variance() {
        let noise = uniform_noise(200, 2);
        let growing: Vec<f64> = noise
            .iter()
            .enumerate()
            .map(|(t, e)| e * (1.0 + t as f64 / 10.0))
            .collect();
        let result = heteroskedasticity_test(&growing).unwrap();
        assert!(!result.is_homoskedastic);
        assert!(result.correlation > 0.1);
    }
}
