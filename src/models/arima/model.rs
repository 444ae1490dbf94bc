//! ARIMA(p, d, q) fitted by exact maximum likelihood.

use crate::config::MleConfig;
use crate::core::Forecast;
use crate::error::{InsightError, Result};
use crate::models::arima::diff::{difference, integrate};
use crate::models::arima::kalman::{filter, ArmaStateSpace, FilterOutput};
use crate::models::arima::params::{
    constrain_ar, constrain_ma, integrated_ar, psi_weights, unconstrain_ar,
};
use crate::models::FittedModel;
use crate::utils::linalg::{invert, solve};
use crate::utils::optimization::{nelder_mead, numerical_hessian, NelderMeadConfig};
use crate::utils::stats::{autocovariances, mean, std_dev, two_sided_z};
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

/// ARIMA order: AR order `p`, differencing order `d`, MA order `q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModelOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ModelOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of AR and MA coefficients (excludes `d`).
    pub fn num_arma_params(&self) -> usize {
        self.p + self.q
    }

    pub fn is_pure_ar(&self) -> bool {
        self.p > 0 && self.q == 0
    }

    pub fn is_pure_ma(&self) -> bool {
        self.p == 0 && self.q > 0
    }

    /// Short family label: `AR`, `MA`, `ARMA` or `WN` with an `I` prefix when differenced.
    pub fn family(&self) -> String {
        let core = if self.is_pure_ar() {
            "AR"
        } else if self.is_pure_ma() {
            "MA"
        } else if self.p > 0 {
            "ARMA"
        } else {
            "WN"
        };
        if self.d > 0 && core != "WN" {
            format!("ARIMA ({}, d={})", core, self.d)
        } else if self.d > 0 {
            format!("random walk (d={})", self.d)
        } else {
            core.to_string()
        }
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({}, {}, {})", self.p, self.d, self.q)
    }
}

/// A named coefficient with its standard error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterEstimate {
    pub name: String,
    pub value: f64,
    pub std_error: f64,
}

/// Unconstrained optimiser vector <-> model coefficients.
#[derive(Debug, Clone, Copy)]
struct ParamLayout {
    p: usize,
    q: usize,
    include_mean: bool,
    center: f64,
    scale: f64,
}

impl ParamLayout {
    fn offset(&self) -> usize {
        usize::from(self.include_mean)
    }

    fn len(&self) -> usize {
        self.offset() + self.p + self.q
    }

    fn natural(&self, u: &[f64]) -> (f64, Vec<f64>, Vec<f64>) {
        let o = self.offset();
        let mu = if self.include_mean {
            self.center + self.scale * u[0]
        } else {
            0.0
        };
        (
            mu,
            constrain_ar(&u[o..o + self.p]),
            constrain_ma(&u[o + self.p..o + self.p + self.q]),
        )
    }

    fn names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.len());
        if self.include_mean {
            names.push("const".to_string());
        }
        names.extend((1..=self.p).map(|i| format!("ar.L{}", i)));
        names.extend((1..=self.q).map(|i| format!("ma.L{}", i)));
        names
    }
}

fn arma_likelihood(w: &[f64], mu: f64, ar: &[f64], ma: &[f64]) -> Result<FilterOutput> {
    let centered: Vec<f64> = w.iter().map(|v| v - mu).collect();
    filter(&ArmaStateSpace::new(ar, ma), &centered)
}

/// Yule-Walker AR start values on the demeaned series, zeros if unusable.
fn yule_walker_start(w: &[f64], p: usize) -> Vec<f64> {
    if p == 0 || w.len() <= p {
        return vec![0.0; p];
    }
    let acov = autocovariances(w, p);
    if acov.len() <= p || acov[0] <= 0.0 {
        return vec![0.0; p];
    }
    let toeplitz: Vec<Vec<f64>> = (0..p)
        .map(|i| (0..p).map(|j| acov[i.abs_diff(j)]).collect())
        .collect();
    match solve(&toeplitz, &acov[1..=p]) {
        Ok(phi) => unconstrain_ar(&phi).unwrap_or_else(|| vec![0.0; p]),
        Err(_) => vec![0.0; p],
    }
}

/// ARIMA model specification, fitted by maximum likelihood.
///
/// The series is differenced `d` times and the exact Gaussian likelihood of
/// the resulting ARMA(p, q) process is maximised over stationary and
/// invertible coefficients. A mean is estimated only when `d == 0`.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    order: ModelOrder,
    config: MleConfig,
}

impl ArimaModel {
    pub fn new(order: ModelOrder) -> Self {
        Self {
            order,
            config: MleConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn order(&self) -> ModelOrder {
        self.order
    }

    fn failure(&self, message: impl ToString) -> InsightError {
        InsightError::estimation(self.order, "mle", message)
    }

    /// Fit to `values` (levels, not differenced).
    pub fn fit(&self, values: &[f64]) -> Result<FittedArima> {
        let ModelOrder { p, d, q } = self.order;
        if values.iter().any(|v| !v.is_finite()) {
            return Err(InsightError::MissingValues);
        }

        let w = difference(values, d);
        let n_eff = w.len();
        let include_mean = d == 0;
        let k = p + q + usize::from(include_mean) + 1;
        if n_eff <= k {
            return Err(self.failure(format!(
                "{} parameters need more than {} differenced observations, got {}",
                k, k, n_eff
            )));
        }

        let center = mean(&w);
        let spread = std_dev(&w);
        let layout = ParamLayout {
            p,
            q,
            include_mean,
            center,
            scale: if spread.is_finite() && spread > 0.0 { spread } else { 1.0 },
        };

        let nf = n_eff as f64;
        let objective = |u: &[f64]| {
            let (mu, ar, ma) = layout.natural(u);
            match arma_likelihood(&w, mu, &ar, &ma) {
                Ok(out) => -out.log_likelihood / nf,
                Err(_) => f64::NAN,
            }
        };

        let mut start = vec![0.0; layout.len()];
        let o = layout.offset();
        start[o..o + p].copy_from_slice(&yule_walker_start(&w, p));

        let mut warnings = Vec::new();
        let (optimum, converged, iterations) = if start.is_empty() {
            (start, true, 0)
        } else {
            let result = nelder_mead(
                objective,
                &start,
                None,
                NelderMeadConfig::default()
                    .with_max_iter(self.config.max_iter)
                    .with_tolerance(self.config.tolerance),
            );
            (result.optimal_point, result.converged, result.iterations)
        };

        if !converged {
            let message = format!(
                "optimizer did not converge within {} iterations",
                self.config.max_iter
            );
            if self.config.require_convergence {
                return Err(self.failure(message));
            }
            warn!("{}: {}", self.order, message);
            warnings.push(message);
        }

        let (mu, ar, ma) = layout.natural(&optimum);
        let out = arma_likelihood(&w, mu, &ar, &ma).map_err(|e| self.failure(e))?;
        if !out.log_likelihood.is_finite() {
            return Err(self.failure("non-finite likelihood"));
        }
        debug!(
            "{} fitted: loglik {:.4}, sigma2 {:.6}, {} iterations",
            self.order, out.log_likelihood, out.sigma2, iterations
        );

        let kf = k as f64;
        let ll = out.log_likelihood;
        let aic = -2.0 * ll + 2.0 * kf;
        let bic = -2.0 * ll + kf * nf.ln();
        let hqic = -2.0 * ll + 2.0 * kf * nf.ln().ln();

        let mut natural: Vec<f64> = Vec::with_capacity(layout.len());
        if include_mean {
            natural.push(mu);
        }
        natural.extend(&ar);
        natural.extend(&ma);
        let std_errs = match standard_errors(&w, &natural, include_mean, p) {
            Some(se) => se,
            None => {
                warnings.push("covariance matrix is singular; standard errors unavailable".into());
                vec![f64::NAN; natural.len()]
            }
        };
        let mut parameters: Vec<ParameterEstimate> = layout
            .names()
            .into_iter()
            .zip(natural.iter().zip(&std_errs))
            .map(|(name, (&value, &std_error))| ParameterEstimate {
                name,
                value,
                std_error,
            })
            .collect();
        parameters.push(ParameterEstimate {
            name: "sigma2".to_string(),
            value: out.sigma2,
            std_error: (2.0 * out.sigma2 * out.sigma2 / nf).sqrt(),
        });

        let fitted: Vec<f64> = values[d..]
            .iter()
            .zip(&out.innovations)
            .map(|(y, v)| y - v)
            .collect();

        Ok(FittedArima {
            order: self.order,
            ar,
            ma,
            mean: mu,
            include_mean,
            sigma2: out.sigma2,
            log_likelihood: ll,
            aic,
            bic,
            hqic,
            parameters,
            converged,
            iterations,
            n_obs: values.len(),
            original: values.to_vec(),
            residuals: out.innovations,
            fitted,
            next_state: out.next_state,
            warnings,
        })
    }
}

/// Standard errors from the inverse Hessian of the negative log-likelihood.
fn standard_errors(w: &[f64], natural: &[f64], include_mean: bool, p: usize) -> Option<Vec<f64>> {
    if natural.is_empty() {
        return Some(vec![]);
    }
    let o = usize::from(include_mean);
    let negloglik = |theta: &[f64]| {
        let mu = if include_mean { theta[0] } else { 0.0 };
        match arma_likelihood(w, mu, &theta[o..o + p], &theta[o + p..]) {
            Ok(out) => -out.log_likelihood,
            Err(_) => f64::NAN,
        }
    };
    let hessian = numerical_hessian(negloglik, natural);
    if hessian.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    let cov = invert(&hessian).ok()?;
    Some(
        (0..natural.len())
            .map(|i| if cov[i][i] > 0.0 { cov[i][i].sqrt() } else { f64::NAN })
            .collect(),
    )
}

/// Result of [`ArimaModel::fit`].
#[derive(Debug, Clone)]
pub struct FittedArima {
    order: ModelOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    mean: f64,
    include_mean: bool,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    hqic: f64,
    parameters: Vec<ParameterEstimate>,
    converged: bool,
    iterations: usize,
    n_obs: usize,
    original: Vec<f64>,
    residuals: Vec<f64>,
    fitted: Vec<f64>,
    next_state: Vec<f64>,
    warnings: Vec<String>,
}

impl FittedArima {
    pub fn order(&self) -> ModelOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Process mean of the undifferenced series (zero when `d > 0`).
    pub fn constant(&self) -> f64 {
        self.mean
    }

    pub fn has_constant(&self) -> bool {
        self.include_mean
    }

    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    pub fn bic(&self) -> f64 {
        self.bic
    }

    pub fn hqic(&self) -> f64 {
        self.hqic
    }

    /// Estimated coefficients, ending with `sigma2`.
    pub fn parameters(&self) -> &[ParameterEstimate] {
        &self.parameters
    }

    /// Estimated parameters including `sigma2`.
    pub fn n_parameters(&self) -> usize {
        self.parameters.len()
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Length of the input series.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Observations entering the likelihood (`n - d`).
    pub fn n_effective(&self) -> usize {
        self.residuals.len()
    }

    /// Input values aligned with [`FittedModel::fitted_values`] (drops the first `d`).
    pub fn aligned_actuals(&self) -> &[f64] {
        &self.original[self.order.d..]
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Plain-text coefficient table.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{}  n={}  log-likelihood={:.3}  AIC={:.3}  BIC={:.3}  HQIC={:.3}\n",
            self.order,
            self.n_obs,
            self.log_likelihood,
            self.aic,
            self.bic,
            self.hqic
        );
        out.push_str(&format!("{:<10} {:>12} {:>12} {:>10}\n", "param", "coef", "std err", "z"));
        for param in &self.parameters {
            out.push_str(&format!(
                "{:<10} {:>12.4} {:>12.4} {:>10.3}\n",
                param.name,
                param.value,
                param.std_error,
                param.value / param.std_error
            ));
        }
        out
    }
}

impl FittedModel for FittedArima {
    fn forecast(&self, steps: usize, alpha: f64) -> Result<Forecast> {
        if steps == 0 {
            return Err(InsightError::InvalidInput(
                "forecast horizon must be at least 1".to_string(),
            ));
        }
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(InsightError::InvalidInput(format!(
                "alpha must lie in (0, 1), got {}",
                alpha
            )));
        }

        let system = ArmaStateSpace::new(&self.ar, &self.ma);
        let mut state = self.next_state.clone();
        let mut on_diff_scale = Vec::with_capacity(steps);
        for _ in 0..steps {
            on_diff_scale.push(state[0] + self.mean);
            state = system.advance(&state);
        }
        let point = integrate(&on_diff_scale, &self.original, self.order.d);

        let psi = psi_weights(&integrated_ar(&self.ar, self.order.d), &self.ma, steps);
        let z = two_sided_z(alpha);
        let mut cumulative = 0.0;
        let (lower, upper): (Vec<f64>, Vec<f64>) = point
            .iter()
            .zip(&psi)
            .map(|(&y, &weight)| {
                cumulative += weight * weight;
                let half_width = z * (self.sigma2 * cumulative).sqrt();
                (y - half_width, y + half_width)
            })
            .unzip();

        Forecast::from_values_with_intervals(point, lower, upper, alpha)
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    fn name(&self) -> String {
        self.order.to_string()
    }
}
