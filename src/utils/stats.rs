//! Statistical utility functions.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Quantile function of the standard normal distribution.
///
/// # Example
/// ```
/// use arima_insight::utils::quantile_normal;
///
/// let z = quantile_normal(0.975);
/// assert!((z - 1.959964).abs() < 1e-5);
/// ```
pub fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Cumulative distribution function of the standard normal distribution.
pub fn cdf_normal(x: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(x),
        Err(_) => f64::NAN,
    }
}

/// Two-sided critical value `z_{1 - alpha/2}`.
pub fn two_sided_z(alpha: f64) -> f64 {
    quantile_normal(1.0 - alpha / 2.0)
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Calculate the standard deviation of a slice.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Central moment of order `k` with denominator `n`.
fn central_moment(values: &[f64], k: i32) -> f64 {
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(k)).sum::<f64>() / values.len() as f64
}

/// Biased sample skewness `m3 / m2^1.5`.
pub fn skewness(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m2 = central_moment(values, 2);
    if m2 == 0.0 {
        return 0.0;
    }
    central_moment(values, 3) / m2.powf(1.5)
}

/// Biased excess kurtosis `m4 / m2^2 - 3`.
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m2 = central_moment(values, 2);
    if m2 == 0.0 {
        return 0.0;
    }
    central_moment(values, 4) / (m2 * m2) - 3.0
}

/// Autocovariances at lags `0..=max_lag` with denominator `n` (biased).
pub fn autocovariances(values: &[f64], max_lag: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return vec![];
    }
    let m = mean(values);
    let centered: Vec<f64> = values.iter().map(|x| x - m).collect();
    (0..=max_lag.min(n - 1))
        .map(|k| {
            centered[k..]
                .iter()
                .zip(&centered[..n - k])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64
        })
        .collect()
}

/// Pearson correlation with its two-sided p-value (Student t, n - 2 df).
///
/// Returns `(0.0, 1.0)` when either input is constant.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len().min(y.len());
    if n < 3 {
        return (f64::NAN, f64::NAN);
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return (0.0, 1.0);
    }
    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let df = (n - 2) as f64;
    if (1.0 - r.abs()) < 1e-15 {
        return (r, 0.0);
    }
    let t = r * (df / (1.0 - r * r)).sqrt();
    let p = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => f64::NAN,
    };
    (r, p)
}

/// Least-squares slope of `values` against `0..n`.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    num / den
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
pub fn r_squared(actual: &[f64], fitted: &[f64]) -> f64 {
    let n = actual.len().min(fitted.len());
    if n == 0 {
        return f64::NAN;
    }
    let m = mean(&actual[..n]);
    let ss_tot: f64 = actual[..n].iter().map(|a| (a - m).powi(2)).sum();
    let ss_res: f64 = actual[..n]
        .iter()
        .zip(&fitted[..n])
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quantile_normal_known_values() {
        assert_relative_eq!(quantile_normal(0.5), 0.0, epsilon = 1e-8);
        assert_relative_eq!(quantile_normal(0.975), 1.959964, epsilon = 1e-5);
        assert_relative_eq!(quantile_normal(0.025), -1.959964, epsilon = 1e-5);
        assert_relative_eq!(two_sided_z(0.01), 2.575829, epsilon = 1e-5);
    }

    #[test]
    fn quantile_normal_boundary_values() {
        assert_eq!(quantile_normal(0.0), f64::NEG_INFINITY);
        assert_eq!(quantile_normal(1.0), f64::INFINITY);
    }

    #[test]
    fn cdf_normal_symmetry() {
        assert_relative_eq!(cdf_normal(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(cdf_normal(1.5) + cdf_normal(-1.5), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn mean_and_variance() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert!(mean(&[]).is_nan());
        assert_relative_eq!(variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5, epsilon = 1e-10);
        assert!(variance(&[1.0]).is_nan());
        assert_relative_eq!(
            std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            2.5_f64.sqrt(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn skewness_and_kurtosis() {
        // Symmetric data has zero skewness.
        assert_relative_eq!(skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]), 0.0, epsilon = 1e-12);
        // Uniform-like data on 1..5: m2 = 2, m4 = 6.8, excess = 6.8/4 - 3.
        assert_relative_eq!(
            excess_kurtosis(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            -1.3,
            epsilon = 1e-12
        );
        // Right tail.
        assert!(skewness(&[0.0, 0.0, 0.0, 0.0, 10.0]) > 1.0);
        assert_eq!(skewness(&[2.0, 2.0, 2.0]), 0.0);
    }

    #[test]
    fn autocovariance_uses_n_denominator() {
        let acov = autocovariances(&[1.0, 2.0, 3.0, 4.0], 1);
        // centered: -1.5, -0.5, 0.5, 1.5
        assert_relative_eq!(acov[0], 5.0 / 4.0, epsilon = 1e-12);
        assert_relative_eq!(acov[1], (0.75 - 0.25 + 0.75) / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn pearson_perfect_and_constant() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let (r, p) = pearson_correlation(&x, &y);
        assert_relative_eq!(r, 1.0, epsilon = 1e-12);
        assert_eq!(p, 0.0);

        let (r, p) = pearson_correlation(&x, &[3.0; 10]);
        assert_eq!((r, p), (0.0, 1.0));
    }

    #[test]
    fn pearson_weak_correlation_has_large_p() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.0, 1.0, 4.0, 3.0, 1.0, 2.0];
        let (r, p) = pearson_correlation(&x, &y);
        assert!(r.abs() < 0.5);
        assert!(p > 0.3 && p <= 1.0);
    }

    #[test]
    fn slope_of_line() {
        assert_relative_eq!(linear_slope(&[1.0, 3.0, 5.0, 7.0]), 2.0, epsilon = 1e-12);
        assert_relative_eq!(linear_slope(&[4.0, 3.0, 2.0]), -1.0, epsilon = 1e-12);
        assert_eq!(linear_slope(&[1.0]), 0.0);
    }

    #[test]
    fn r_squared_bounds() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(r_squared(&actual, &actual), 1.0, epsilon = 1e-12);
        assert_relative_eq!(r_squared(&actual, &[2.5; 4]), 0.0, epsilon = 1e-12);
    }
}
