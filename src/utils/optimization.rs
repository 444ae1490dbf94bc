//! Derivative-free optimisation and numerical differentiation.

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The optimal point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at the optimal point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the simplex met the tolerance before `max_iter`.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations. Guarantees termination.
    pub max_iter: usize,
    /// Convergence tolerance on both the objective spread and the simplex size.
    pub tolerance: f64,
    /// Reflection coefficient (default: 1.0).
    pub alpha: f64,
    /// Expansion coefficient (default: 2.0).
    pub gamma: f64,
    /// Contraction coefficient (default: 0.5).
    pub rho: f64,
    /// Shrinkage coefficient (default: 0.5).
    pub sigma: f64,
    /// Initial simplex step, scaled by `max(|x_i|, 1)`.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.1,
        }
    }
}

impl NelderMeadConfig {
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Simplex vertices with their objective values.
struct Simplex<'a> {
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
    bounds: Option<&'a [(f64, f64)]>,
}

impl<'a> Simplex<'a> {
    fn new<F>(objective: &F, initial: &[f64], bounds: Option<&'a [(f64, f64)]>, step: f64) -> Self
    where
        F: Fn(&[f64]) -> f64,
    {
        let start = clamp_to_bounds(initial, bounds);
        let mut vertices = vec![start.clone()];
        for i in 0..start.len() {
            let mut vertex = start.clone();
            let delta = step * start[i].abs().max(1.0);
            vertex[i] += delta;
            // Step inward when the bound would collapse the vertex onto the start.
            let clamped = clamp_to_bounds(&vertex, bounds);
            if (clamped[i] - start[i]).abs() < f64::EPSILON {
                vertex[i] = start[i] - delta;
            }
            vertices.push(clamp_to_bounds(&vertex, bounds));
        }
        let values = vertices.iter().map(|v| evaluate(objective, v)).collect();
        Self {
            vertices,
            values,
            bounds,
        }
    }

    /// Indices sorted by ascending objective value.
    fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| self.values[a].total_cmp(&self.values[b]));
        order
    }

    fn centroid_without(&self, exclude: usize) -> Vec<f64> {
        let dim = self.vertices[0].len();
        let count = (self.vertices.len() - 1) as f64;
        let mut centroid = vec![0.0; dim];
        for (i, vertex) in self.vertices.iter().enumerate() {
            if i == exclude {
                continue;
            }
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x;
            }
        }
        centroid.iter_mut().for_each(|c| *c /= count);
        centroid
    }

    /// Point `centroid + coef * (towards - centroid)`, clamped to bounds.
    fn along(&self, centroid: &[f64], towards: &[f64], coef: f64) -> Vec<f64> {
        let point: Vec<f64> = centroid
            .iter()
            .zip(towards)
            .map(|(c, t)| c + coef * (t - c))
            .collect();
        clamp_to_bounds(&point, self.bounds)
    }

    fn replace(&mut self, idx: usize, vertex: Vec<f64>, value: f64) {
        self.vertices[idx] = vertex;
        self.values[idx] = value;
    }

    fn shrink_towards<F>(&mut self, objective: &F, best: usize, sigma: f64)
    where
        F: Fn(&[f64]) -> f64,
    {
        let anchor = self.vertices[best].clone();
        for i in 0..self.vertices.len() {
            if i == best {
                continue;
            }
            let shrunk = self.along(&anchor, &self.vertices[i], sigma);
            let value = evaluate(objective, &shrunk);
            self.replace(i, shrunk, value);
        }
    }

    fn diameter(&self, centroid: &[f64]) -> f64 {
        self.vertices
            .iter()
            .map(|v| euclidean_distance(v, centroid))
            .fold(0.0, f64::max)
    }
}

/// Minimise `objective` with the Nelder-Mead simplex method.
///
/// Non-finite objective values are treated as `+inf`, so an objective may
/// signal an infeasible region by returning NaN. Bounds, when given, clamp
/// every trial point.
///
/// # Example
/// ```
/// use arima_insight::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// assert!((result.optimal_point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut simplex = Simplex::new(&objective, initial, bounds, config.initial_step);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        let ranking = simplex.ranking();
        let best = ranking[0];
        let worst = ranking[n];
        let second_worst = ranking[n - 1];

        let centroid = simplex.centroid_without(worst);
        let spread = simplex.values[worst] - simplex.values[best];
        if (spread.is_finite() && spread < config.tolerance)
            || simplex.diameter(&centroid) < config.tolerance
        {
            converged = true;
            break;
        }
        iterations += 1;

        let reflected = simplex.along(&centroid, &simplex.vertices[worst], -config.alpha);
        let reflected_value = evaluate(&objective, &reflected);

        if reflected_value < simplex.values[best] {
            let expanded = simplex.along(&centroid, &reflected, config.gamma);
            let expanded_value = evaluate(&objective, &expanded);
            if expanded_value < reflected_value {
                simplex.replace(worst, expanded, expanded_value);
            } else {
                simplex.replace(worst, reflected, reflected_value);
            }
            continue;
        }

        if reflected_value < simplex.values[second_worst] {
            simplex.replace(worst, reflected, reflected_value);
            continue;
        }

        let (target, threshold) = if reflected_value < simplex.values[worst] {
            (reflected.clone(), reflected_value)
        } else {
            (simplex.vertices[worst].clone(), simplex.values[worst])
        };
        let contracted = simplex.along(&centroid, &target, config.rho);
        let contracted_value = evaluate(&objective, &contracted);
        if contracted_value < threshold {
            simplex.replace(worst, contracted, contracted_value);
            continue;
        }

        simplex.shrink_towards(&objective, best, config.sigma);
    }

    let best = simplex.ranking()[0];
    NelderMeadResult {
        optimal_point: simplex.vertices[best].clone(),
        optimal_value: simplex.values[best],
        iterations,
        converged,
    }
}

/// Central-difference Hessian of `f` at `x`.
///
/// Step sizes scale with `max(|x_i|, 1)`. Non-finite evaluations propagate
/// into the corresponding entries.
pub fn numerical_hessian<F>(f: F, x: &[f64]) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let n = x.len();
    let h: Vec<f64> = x.iter().map(|xi| 1e-4 * xi.abs().max(1.0)).collect();
    let f0 = f(x);
    let mut hessian = vec![vec![0.0; n]; n];
    let mut point = x.to_vec();

    for i in 0..n {
        point[i] = x[i] + h[i];
        let fp = f(&point);
        point[i] = x[i] - h[i];
        let fm = f(&point);
        point[i] = x[i];
        hessian[i][i] = (fp - 2.0 * f0 + fm) / (h[i] * h[i]);

        for j in (i + 1)..n {
            let mut corner = |si: f64, sj: f64| {
                point[i] = x[i] + si * h[i];
                point[j] = x[j] + sj * h[j];
                let v = f(&point);
                point[i] = x[i];
                point[j] = x[j];
                v
            };
            let value = (corner(1.0, 1.0) - corner(1.0, -1.0) - corner(-1.0, 1.0)
                + corner(-1.0, -1.0))
                / (4.0 * h[i] * h[j]);
            hessian[i][j] = value;
            hessian[j][i] = value;
        }
    }

    hessian
}

fn evaluate<F>(objective: &F, point: &[f64]) -> f64
where
    F: Fn(&[f64]) -> f64,
{
    let value = objective(point);
    if value.is_finite() {
        value
    } else {
        f64::INFINITY
    }
}

fn clamp_to_bounds(point: &[f64], bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    match bounds {
        None => point.to_vec(),
        Some(b) => point
            .iter()
            .enumerate()
            .map(|(i, &x)| b.get(i).map_or(x, |&(lo, hi)| x.clamp(lo, hi)))
            .collect(),
    }
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nelder_mead_quadratic_2d() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            None,
            NelderMeadConfig::default().with_tolerance(1e-12),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], 3.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_value, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn nelder_mead_rosenbrock() {
        let config = NelderMeadConfig::default()
            .with_max_iter(5000)
            .with_tolerance(1e-12);

        let result = nelder_mead(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2),
            &[0.0, 0.0],
            None,
            config,
        );

        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-2);
        assert_relative_eq!(result.optimal_point[1], 1.0, epsilon = 1e-2);
    }

    #[test]
    fn nelder_mead_respects_bounds() {
        let result = nelder_mead(
            |x| (x[0] - 5.0).powi(2),
            &[1.0],
            Some(&[(0.0, 3.0)]),
            NelderMeadConfig::default(),
        );

        assert_relative_eq!(result.optimal_point[0], 3.0, epsilon = 1e-4);
    }

    #[test]
    fn nelder_mead_starting_on_upper_bound_still_moves() {
        let result = nelder_mead(
            |x| (x[0] - 0.2).powi(2),
            &[0.99],
            Some(&[(-0.99, 0.99)]),
            NelderMeadConfig::default(),
        );

        assert_relative_eq!(result.optimal_point[0], 0.2, epsilon = 1e-3);
    }

    #[test]
    fn nelder_mead_treats_nan_as_infeasible() {
        // Objective undefined for negative x; the minimum sits at x = 1.
        let result = nelder_mead(
            |x| {
                if x[0] < 0.0 {
                    f64::NAN
                } else {
                    (x[0] - 1.0).powi(2)
                }
            },
            &[0.5],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.optimal_value.is_finite());
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn nelder_mead_hits_iteration_cap() {
        let config = NelderMeadConfig::default()
            .with_max_iter(3)
            .with_tolerance(0.0);
        let result = nelder_mead(|x| x[0].powi(2) + x[1].powi(2), &[5.0, 5.0], None, config);

        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
    }

    #[test]
    fn nelder_mead_empty_initial() {
        let result = nelder_mead(|_| 0.0, &[], None, NelderMeadConfig::default());

        assert!(!result.converged);
        assert!(result.optimal_value.is_nan());
    }

    #[test]
    fn hessian_of_quadratic_form() {
        // f = x^2 + 3xy + 2y^2 has Hessian [[2, 3], [3, 4]].
        let h = numerical_hessian(|v| v[0] * v[0] + 3.0 * v[0] * v[1] + 2.0 * v[1] * v[1], &[0.3, -1.2]);
        assert_relative_eq!(h[0][0], 2.0, epsilon = 1e-4);
        assert_relative_eq!(h[0][1], 3.0, epsilon = 1e-4);
        assert_relative_eq!(h[1][0], 3.0, epsilon = 1e-4);
        assert_relative_eq!(h[1][1], 4.0, epsilon = 1e-4);
    }
}
