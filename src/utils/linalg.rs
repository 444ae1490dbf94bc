//! Small dense linear algebra: linear solves, inversion and least squares.
//!
//! Matrices are row-major `Vec<Vec<f64>>`. Everything here is sized for
//! ARIMA work (a few dozen unknowns at most).

use crate::error::{InsightError, Result};

/// Row-major dense matrix.
pub type Matrix = Vec<Vec<f64>>;

const PIVOT_EPS: f64 = 1e-12;

/// Solve `A x = b` by Gaussian elimination with partial pivoting.
///
/// Fails with [`InsightError::Computation`] when `A` is (numerically) singular.
pub fn solve(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = b.len();
    check_square(a, n)?;

    let mut m: Matrix = a.to_vec();
    let mut rhs = b.to_vec();
    let scale = max_abs(a).max(1.0);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))
            .unwrap_or(col);
        if m[pivot][col].abs() <= PIVOT_EPS * scale {
            return Err(InsightError::Computation("singular matrix".to_string()));
        }
        m.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = m[row][col] / m[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[row][k] -= factor * m[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| m[i][j] * x[j]).sum();
        x[i] = (rhs[i] - tail) / m[i][i];
    }
    Ok(x)
}

/// Solve a symmetric positive definite system using Cholesky decomposition.
///
/// Returns `None` if the matrix is not positive definite.
pub fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum = a[i][j] - (0..j).map(|k| l[i][k] * l[j][k]).sum::<f64>();
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum = b[i] - (0..i).map(|j| l[i][j] * y[j]).sum::<f64>();
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum = y[i] - ((i + 1)..n).map(|j| l[j][i] * x[j]).sum::<f64>();
        x[i] = sum / l[i][i];
    }
    Some(x)
}

/// Invert a square matrix by Gauss-Jordan elimination.
pub fn invert(a: &[Vec<f64>]) -> Result<Matrix> {
    let n = a.len();
    check_square(a, n)?;

    let mut m: Matrix = a.to_vec();
    let mut inv: Matrix = identity(n);
    let scale = max_abs(a).max(1.0);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))
            .unwrap_or(col);
        if m[pivot][col].abs() <= PIVOT_EPS * scale {
            return Err(InsightError::Computation("singular matrix".to_string()));
        }
        m.swap(col, pivot);
        inv.swap(col, pivot);

        let p = m[col][col];
        for k in 0..n {
            m[col][k] /= p;
            inv[col][k] /= p;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                m[row][k] -= factor * m[col][k];
                inv[row][k] -= factor * inv[col][k];
            }
        }
    }
    Ok(inv)
}

/// Identity matrix of size `n`.
pub fn identity(n: usize) -> Matrix {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

/// Ordinary least squares fit with coefficient standard errors.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Residual sum of squares.
    pub sse: f64,
}

impl LeastSquares {
    /// Number of observations used in the fit.
    pub fn nobs(&self) -> usize {
        self.residuals.len()
    }

    /// t statistic of coefficient `i`.
    pub fn t_stat(&self, i: usize) -> f64 {
        self.coefficients[i] / self.std_errors[i]
    }

    /// Gaussian log-likelihood with the ML variance estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs() as f64;
        -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.sse / n).ln() + 1.0)
    }
}

/// Fit `y = X beta` by least squares through the normal equations.
///
/// `rows` holds one design row per observation; include a column of ones for
/// an intercept. A tiny ridge keeps near-collinear designs solvable.
pub fn least_squares(rows: &[Vec<f64>], y: &[f64]) -> Result<LeastSquares> {
    let n = y.len();
    if rows.len() != n {
        return Err(InsightError::InvalidInput(format!(
            "design has {} rows for {} observations",
            rows.len(),
            n
        )));
    }
    let k = rows.first().map_or(0, |r| r.len());
    if k == 0 || n < k {
        return Err(InsightError::InsufficientData { needed: k.max(1), got: n });
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &yi) in rows.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * yi;
            for j in 0..=i {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
        xtx[i][i] += 1e-10;
    }

    let beta = match solve_symmetric(&xtx, &xty) {
        Some(beta) => beta,
        None => solve(&xtx, &xty)?,
    };

    let residuals: Vec<f64> = rows
        .iter()
        .zip(y)
        .map(|(row, &yi)| yi - row.iter().zip(&beta).map(|(x, b)| x * b).sum::<f64>())
        .collect();
    let sse: f64 = residuals.iter().map(|r| r * r).sum();

    let dof = n.saturating_sub(k).max(1) as f64;
    let s2 = sse / dof;
    let std_errors = match invert(&xtx) {
        Ok(inv) => (0..k).map(|i| (s2 * inv[i][i]).max(0.0).sqrt()).collect(),
        Err(_) => vec![f64::NAN; k],
    };

    Ok(LeastSquares {
        coefficients: beta,
        std_errors,
        residuals,
        sse,
    })
}

fn check_square(a: &[Vec<f64>], n: usize) -> Result<()> {
    if n == 0 || a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(InsightError::InvalidInput(format!(
            "expected a non-empty {}x{} matrix",
            n, n
        )));
    }
    Ok(())
}

fn max_abs(a: &[Vec<f64>]) -> f64 {
    a.iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
}
