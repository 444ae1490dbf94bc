//! Method-of-moments estimators for pure AR and pure MA models.

use crate::config::MomentsConfig;
use crate::estimation::result::{EstimationDetails, EstimationMethod, EstimationResult};
use crate::models::ModelOrder;
use crate::utils::linalg::{least_squares, solve};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{autocovariances, mean, variance};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Smallest noise variance a moment estimate may report.
const SIGMA2_FLOOR: f64 = 0.001;
/// Box bound on MA coefficients in the ACF-matching search.
const MA_BOUND: f64 = 0.99;

/// Sample autocovariances for Yule-Walker: `gamma(0)` with `n - 1`, lag `k` with `n - k`.
fn yule_walker_autocovariances(values: &[f64], p: usize) -> Vec<f64> {
    let m = mean(values);
    let centered: Vec<f64> = values.iter().map(|v| v - m).collect();
    let n = centered.len();
    (0..=p)
        .map(|k| {
            if k == 0 {
                variance(values)
            } else {
                centered[k..]
                    .iter()
                    .zip(&centered[..n - k])
                    .map(|(a, b)| a * b)
                    .sum::<f64>()
                    / (n - k) as f64
            }
        })
        .collect()
}

/// AR(p) by Yule-Walker.
pub fn estimate_ar(values: &[f64], p: usize) -> EstimationResult {
    let order = ModelOrder::new(p, 0, 0);
    if p == 0 {
        return EstimationResult::failure(EstimationMethod::Moments, order, "AR order must be positive");
    }
    if values.len() <= p + 1 {
        return EstimationResult::failure(
            EstimationMethod::Moments,
            order,
            format!("AR({}) needs more than {} observations, got {}", p, p + 1, values.len()),
        );
    }
    let gamma = yule_walker_autocovariances(values, p);
    if !(gamma[0] > 0.0) {
        return EstimationResult::failure(EstimationMethod::Moments, order, "series has zero variance");
    }

    let matrix: Vec<Vec<f64>> = (0..p)
        .map(|i| (0..p).map(|j| gamma[i.abs_diff(j)]).collect())
        .collect();
    let vector = gamma[1..=p].to_vec();

    let mut least_squares_fallback = false;
    let phi = if p == 1 {
        vec![gamma[1] / gamma[0]]
    } else {
        match solve(&matrix, &vector) {
            Ok(phi) => phi,
            Err(_) => {
                least_squares_fallback = true;
                debug!("Yule-Walker system for AR({}) is singular; using least squares", p);
                match least_squares(&matrix, &vector) {
                    Ok(fit) => fit.coefficients,
                    Err(e) => return EstimationResult::failure(EstimationMethod::Moments, order, e),
                }
            }
        }
    };

    let explained: f64 = phi.iter().zip(&vector).map(|(a, g)| a * g).sum();
    let sigma2 = (gamma[0] - explained).max(SIGMA2_FLOOR);

    EstimationResult::moments(
        order,
        phi,
        vec![],
        mean(values),
        sigma2,
        EstimationDetails::YuleWalker {
            autocovariances: gamma,
            matrix,
            vector,
            least_squares_fallback,
        },
    )
}

/// Theoretical ACF of an MA(q) process at lags `1..=q`.
pub fn ma_theoretical_acf(theta: &[f64]) -> Vec<f64> {
    let q = theta.len();
    let denominator = 1.0 + theta.iter().map(|t| t * t).sum::<f64>();
    (1..=q)
        .map(|k| {
            let cross: f64 = (0..q - k).map(|j| theta[j] * theta[j + k]).sum();
            (theta[k - 1] + cross) / denominator
        })
        .collect()
}

/// MA(1) coefficient from the lag-1 autocorrelation.
///
/// Solves `rho = theta / (1 + theta^2)` for the invertible root; outside
/// `|rho| < 0.5` there is no real solution and `0.5 * sign(rho)` is used.
pub fn ma1_from_rho(rho: f64) -> f64 {
    if rho == 0.0 {
        return 0.0;
    }
    if rho.abs() >= 0.5 {
        return 0.5 * rho.signum();
    }
    let inverse = 1.0 / rho;
    let root = (inverse * inverse - 4.0).sqrt();
    let a = (inverse - root) / 2.0;
    let b = (inverse + root) / 2.0;
    if a.abs() < b.abs() {
        a
    } else {
        b
    }
}

/// MA(q) by matching the sample ACF.
pub fn estimate_ma(values: &[f64], q: usize, config: &MomentsConfig) -> EstimationResult {
    let order = ModelOrder::new(0, 0, q);
    if q == 0 {
        return EstimationResult::failure(EstimationMethod::Moments, order, "MA order must be positive");
    }
    if values.len() <= q + 1 {
        return EstimationResult::failure(
            EstimationMethod::Moments,
            order,
            format!("MA({}) needs more than {} observations, got {}", q, q + 1, values.len()),
        );
    }
    let sample_variance = variance(values);
    let acov = autocovariances(values, q);
    if !(acov[0] > 0.0) || !(sample_variance > 0.0) {
        return EstimationResult::failure(EstimationMethod::Moments, order, "series has zero variance");
    }
    let sample_acf: Vec<f64> = acov.iter().map(|g| g / acov[0]).collect();

    let (theta, sigma2, optimizer_converged) = if q == 1 {
        let theta = ma1_from_rho(sample_acf[1]);
        (vec![theta], sample_variance / (1.0 + theta * theta), None)
    } else {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let start: Vec<f64> = (0..q).map(|_| rng.gen_range(-0.5..0.5)).collect();
        let target = &sample_acf[1..=q];
        let objective = |theta: &[f64]| {
            ma_theoretical_acf(theta)
                .iter()
                .zip(target)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
        };
        let bounds = vec![(-MA_BOUND, MA_BOUND); q];
        let result = nelder_mead(
            objective,
            &start,
            Some(&bounds),
            NelderMeadConfig::default().with_tolerance(1e-10),
        );
        if result.converged {
            let sum_sq: f64 = result.optimal_point.iter().map(|t| t * t).sum();
            (result.optimal_point, sample_variance / (1.0 + sum_sq), Some(true))
        } else {
            debug!("MA({}) moment search did not converge; using fallback values", q);
            (vec![0.1; q], 0.8 * sample_variance, Some(false))
        }
    };

    EstimationResult::moments(
        order,
        vec![],
        theta,
        mean(values),
        sigma2.max(SIGMA2_FLOOR),
        EstimationDetails::AutocorrelationMatch {
            sample_acf,
            sample_variance,
            optimizer_converged,
        },
    )
}

/// Moment estimate for `order` on an already differenced series.
///
/// Mixed ARMA orders are not supported and return a failure result.
pub fn estimate_moments(values: &[f64], order: ModelOrder, config: &MomentsConfig) -> EstimationResult {
    let mut result = match (order.p, order.q) {
        (p, 0) if p > 0 => estimate_ar(values, p),
        (0, q) if q > 0 => estimate_ma(values, q, config),
        (0, 0) => {
            return EstimationResult::failure(EstimationMethod::Moments, order, "invalid model order")
        }
        _ => {
            return EstimationResult::failure(
                EstimationMethod::Moments,
                order,
                "moment estimation of mixed ARMA models is not supported; use maximum likelihood",
            )
        }
    };
    result.order = order;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand_distr::{Distribution, Normal};

    fn simulate(n: usize, ar: f64, ma: &[f64], seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let e: Vec<f64> = (0..n + 50).map(|_| normal.sample(&mut rng)).collect();
        let mut y = vec![0.0; n + 50];
        for t in 1..n + 50 {
            let mut v = ar * y[t - 1] + e[t];
            for (j, th) in ma.iter().enumerate() {
                if t > j {
                    v += th * e[t - 1 - j];
                }
            }
            y[t] = v;
        }
        y.split_off(50)
    }

    #[test]
    fn ar1_closed_form() {
        let y = simulate(1000, 0.6, &[], 1);
        let result = estimate_ar(&y, 1);
        assert!(result.success);
        assert!((result.ar_params[0] - 0.6).abs() < 0.08);
        match &result.details {
            EstimationDetails::YuleWalker { autocovariances, .. } => {
                assert_relative_eq!(result.ar_params[0], autocovariances[1] / autocovariances[0]);
            }
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn ar2_system() {
        let mut rng = StdRng::seed_from_u64(2);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut y = vec![0.0; 2000];
        for t in 2..2000 {
            y[t] = 0.5 * y[t - 1] - 0.3 * y[t - 2] + normal.sample(&mut rng);
        }
        let result = estimate_ar(&y, 2);
        assert!(result.success);
        assert!((result.ar_params[0] - 0.5).abs() < 0.08);
        assert!((result.ar_params[1] + 0.3).abs() < 0.08);
        assert!((result.sigma2 - 1.0).abs() < 0.15);
    }

    #[test]
    fn zero_variance_fails_gracefully() {
        let result = estimate_ar(&[2.0; 30], 1);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("zero variance"));
        assert!(!estimate_ma(&[2.0; 30], 2, &MomentsConfig::default()).success);
    }

    #[test]
    fn ma1_root_selection() {
        assert_eq!(ma1_from_rho(0.0), 0.0);
        assert_eq!(ma1_from_rho(0.7), 0.5);
        assert_eq!(ma1_from_rho(-0.6), -0.5);
        let theta = ma1_from_rho(0.4);
        assert!(theta.abs() < 1.0);
        assert_relative_eq!(theta / (1.0 + theta * theta), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn theoretical_acf_of_ma2() {
        let acf = ma_theoretical_acf(&[0.5, 0.25]);
        let denom = 1.0 + 0.25 + 0.0625;
        assert_relative_eq!(acf[0], (0.5 + 0.5 * 0.25) / denom, epsilon = 1e-12);
        assert_relative_eq!(acf[1], 0.25 / denom, epsilon = 1e-12);
    }

    #[test]
    fn ma2_matches_sample_acf() {
        let y = simulate(3000, 0.0, &[0.5, 0.3], 3);
        let config = MomentsConfig::default().with_seed(9);
        let result = estimate_ma(&y, 2, &config);
        assert!(result.success);
        assert_eq!(result.ma_params.len(), 2);
        assert!(result.ma_params.iter().all(|t| t.abs() <= MA_BOUND));
        assert!((result.ma_params[0] - 0.5).abs() < 0.2);
        // Seeded starts are reproducible.
        let again = estimate_ma(&y, 2, &config);
        assert_eq!(result.ma_params, again.ma_params);
    }

    #[test]
    fn mixed_order_is_unsupported() {
        let y = simulate(100, 0.5, &[0.2], 4);
        let result = estimate_moments(&y, ModelOrder::new(1, 1, 1), &MomentsConfig::default());
        assert!(!result.success);
        assert!(result.error.unwrap().contains("maximum likelihood"));
        let ar = estimate_moments(&y, ModelOrder::new(1, 1, 0), &MomentsConfig::default());
        assert_eq!(ar.order, ModelOrder::new(1, 1, 0));
    }
}
