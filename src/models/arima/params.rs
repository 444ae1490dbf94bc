//! Coefficient transforms and lag-polynomial helpers for ARMA models.
//!
//! Coefficients follow the sign convention
//! `y_t = phi_1 y_{t-1} + ... + e_t + theta_1 e_{t-1} + ...`.

/// AR coefficients from partial autocorrelations (Durbin-Levinson).
///
/// Any `r` with all `|r_k| < 1` yields a stationary AR polynomial.
pub fn pacf_to_ar(r: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(r.len());
    for (k, &rk) in r.iter().enumerate() {
        let prev = phi.clone();
        for j in 0..k {
            phi[j] = prev[j] - rk * prev[k - 1 - j];
        }
        phi.push(rk);
    }
    phi
}

/// Partial autocorrelations of a stationary AR polynomial.
///
/// Returns `None` when `phi` is not stationary.
pub fn ar_to_pacf(phi: &[f64]) -> Option<Vec<f64>> {
    let p = phi.len();
    let mut current = phi.to_vec();
    let mut r = vec![0.0; p];
    for k in (0..p).rev() {
        let rk = current[k];
        if !rk.is_finite() || rk.abs() >= 1.0 {
            return None;
        }
        r[k] = rk;
        let denom = 1.0 - rk * rk;
        current = (0..k)
            .map(|j| (current[j] + rk * current[k - 1 - j]) / denom)
            .collect();
    }
    Some(r)
}

/// Map unconstrained reals to stationary AR coefficients.
pub fn constrain_ar(unconstrained: &[f64]) -> Vec<f64> {
    let r: Vec<f64> = unconstrained
        .iter()
        .map(|x| x / (1.0 + x * x).sqrt())
        .collect();
    pacf_to_ar(&r)
}

/// Inverse of [`constrain_ar`]. `None` for non-stationary input.
pub fn unconstrain_ar(phi: &[f64]) -> Option<Vec<f64>> {
    let r = ar_to_pacf(phi)?;
    Some(r.iter().map(|rk| rk / (1.0 - rk * rk).sqrt()).collect())
}

/// Map unconstrained reals to invertible MA coefficients.
pub fn constrain_ma(unconstrained: &[f64]) -> Vec<f64> {
    constrain_ar(unconstrained).iter().map(|c| -c).collect()
}

/// Inverse of [`constrain_ma`]. `None` for non-invertible input.
pub fn unconstrain_ma(theta: &[f64]) -> Option<Vec<f64>> {
    let negated: Vec<f64> = theta.iter().map(|c| -c).collect();
    unconstrain_ar(&negated)
}

/// Whether the AR polynomial `1 - phi_1 z - ...` has all roots outside the unit circle.
pub fn is_stationary(phi: &[f64]) -> bool {
    ar_to_pacf(phi).is_some()
}

/// Whether the MA polynomial `1 + theta_1 z + ...` has all roots outside the unit circle.
pub fn is_invertible(theta: &[f64]) -> bool {
    let negated: Vec<f64> = theta.iter().map(|c| -c).collect();
    ar_to_pacf(&negated).is_some()
}

/// Coefficients of the integrated AR operator `phi(L) (1 - L)^d`,
/// returned as `phi*` with `phi*(L) = 1 - phi*_1 L - ...`.
pub fn integrated_ar(phi: &[f64], d: usize) -> Vec<f64> {
    // Lag polynomial 1 - phi_1 L - ... as plain coefficients.
    let mut poly: Vec<f64> = std::iter::once(1.0).chain(phi.iter().map(|c| -c)).collect();
    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }
    poly[1..].iter().map(|c| -c).collect()
}

/// First `n` psi-weights of the MA(infinity) form of `phi*(L) y = theta(L) e`.
pub fn psi_weights(phi_star: &[f64], theta: &[f64], n: usize) -> Vec<f64> {
    let mut psi = Vec::with_capacity(n);
    for j in 0..n {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let ma = theta.get(j - 1).copied().unwrap_or(0.0);
        let ar: f64 = (1..=j.min(phi_star.len()))
            .map(|i| phi_star[i - 1] * psi[j - i])
            .sum();
        psi.push(ma + ar);
    }
    psi
}
