//! Exact Gaussian likelihood of a zero-mean ARMA process via a Kalman filter.
//!
//! The process is cast in Harvey's state-space form with state dimension
//! `r = max(p, q + 1)`:
//!
//! ```text
//! y_t       = Z a_t,          Z = [1, 0, ..., 0]
//! a_{t+1}   = T a_t + R e_t,  T = [phi | I; 0], R = [1, theta_1, ..., theta_{r-1}]'
//! ```
//!
//! The innovation variance is concentrated out of the likelihood, so the
//! filter runs with unit variance and returns the scale estimate.

use crate::error::{InsightError, Result};
use crate::utils::linalg::{solve, Matrix};
use std::f64::consts::PI;

/// State-space system of an ARMA(p, q) model.
#[derive(Debug, Clone)]
pub struct ArmaStateSpace {
    transition: Matrix,
    selection: Vec<f64>,
}

impl ArmaStateSpace {
    pub fn new(ar: &[f64], ma: &[f64]) -> Self {
        let r = ar.len().max(ma.len() + 1);
        let mut transition = vec![vec![0.0; r]; r];
        for (i, row) in transition.iter_mut().enumerate() {
            row[0] = ar.get(i).copied().unwrap_or(0.0);
            if i + 1 < r {
                row[i + 1] = 1.0;
            }
        }
        let selection = (0..r)
            .map(|i| if i == 0 { 1.0 } else { ma.get(i - 1).copied().unwrap_or(0.0) })
            .collect();
        Self {
            transition,
            selection,
        }
    }

    pub fn dim(&self) -> usize {
        self.selection.len()
    }

    /// `T a`.
    pub fn advance(&self, state: &[f64]) -> Vec<f64> {
        self.transition
            .iter()
            .map(|row| row.iter().zip(state).map(|(t, a)| t * a).sum())
            .collect()
    }

    /// `T P T' + R R'`.
    fn propagate(&self, cov: &Matrix) -> Matrix {
        let r = self.dim();
        let tp: Matrix = (0..r)
            .map(|i| {
                (0..r)
                    .map(|j| (0..r).map(|k| self.transition[i][k] * cov[k][j]).sum())
                    .collect()
            })
            .collect();
        (0..r)
            .map(|i| {
                (0..r)
                    .map(|j| {
                        let tpt: f64 = (0..r).map(|k| tp[i][k] * self.transition[j][k]).sum();
                        tpt + self.selection[i] * self.selection[j]
                    })
                    .collect()
            })
            .collect()
    }

    /// Unconditional state covariance: solves `P = T P T' + R R'`.
    pub fn stationary_covariance(&self) -> Result<Matrix> {
        let r = self.dim();
        let m = r * r;
        let mut system = vec![vec![0.0; m]; m];
        let mut rhs = vec![0.0; m];
        for i in 0..r {
            for j in 0..r {
                let row = i * r + j;
                rhs[row] = self.selection[i] * self.selection[j];
                system[row][row] += 1.0;
                for k in 0..r {
                    let tik = self.transition[i][k];
                    if tik == 0.0 {
                        continue;
                    }
                    for l in 0..r {
                        let tjl = self.transition[j][l];
                        if tjl != 0.0 {
                            system[row][k * r + l] -= tik * tjl;
                        }
                    }
                }
            }
        }
        let vec_p = solve(&system, &rhs)?;
        Ok((0..r).map(|i| vec_p[i * r..(i + 1) * r].to_vec()).collect())
    }
}

/// Output of one filter pass.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// One-step-ahead prediction errors `v_t`.
    pub innovations: Vec<f64>,
    /// Innovation variances `F_t` relative to `sigma2`.
    pub variances: Vec<f64>,
    /// ML estimate of the innovation variance.
    pub sigma2: f64,
    /// Concentrated log-likelihood.
    pub log_likelihood: f64,
    /// Predicted state for the first out-of-sample period.
    pub next_state: Vec<f64>,
}

/// Run the Kalman filter over a zero-mean series.
pub fn filter(system: &ArmaStateSpace, y: &[f64]) -> Result<FilterOutput> {
    let n = y.len();
    if n == 0 {
        return Err(InsightError::EmptyData);
    }
    let r = system.dim();
    let mut state = vec![0.0; r];
    let mut cov = system.stationary_covariance()?;
    let mut steady = false;

    let mut innovations = Vec::with_capacity(n);
    let mut variances = Vec::with_capacity(n);
    let mut sum_log_f = 0.0;
    let mut sum_scaled = 0.0;

    for &obs in y {
        let f = cov[0][0];
        if !f.is_finite() || f <= 0.0 {
            return Err(InsightError::Computation(
                "non-positive innovation variance in Kalman filter".to_string(),
            ));
        }
        let v = obs - state[0];
        innovations.push(v);
        variances.push(f);
        sum_log_f += f.ln();
        sum_scaled += v * v / f;

        let gain: Vec<f64> = (0..r).map(|i| cov[i][0] / f).collect();
        let updated: Vec<f64> = state.iter().zip(&gain).map(|(a, k)| a + k * v).collect();
        state = system.advance(&updated);

        if !steady {
            let filtered: Matrix = (0..r)
                .map(|i| (0..r).map(|j| cov[i][j] - gain[i] * gain[j] * f).collect())
                .collect();
            let next = system.propagate(&filtered);
            let change = next
                .iter()
                .zip(&cov)
                .flat_map(|(a, b)| a.iter().zip(b).map(|(x, y)| (x - y).abs()))
                .fold(0.0, f64::max);
            steady = change < 1e-12;
            cov = next;
        }
    }

    let nf = n as f64;
    let sigma2 = sum_scaled / nf;
    if !sigma2.is_finite() || sigma2 <= 0.0 {
        return Err(InsightError::Computation(
            "degenerate innovation variance".to_string(),
        ));
    }
    let log_likelihood = -0.5 * nf * ((2.0 * PI).ln() + 1.0 + sigma2.ln()) - 0.5 * sum_log_f;

    Ok(FilterOutput {
        innovations,
        variances,
        sigma2,
        log_likelihood,
        next_state: state,
    })
}
