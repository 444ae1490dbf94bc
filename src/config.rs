//! Tunable settings for each analysis stage.
//!
//! Every struct has a `Default` matching the conventional values and
//! consuming `with_*` setters.

use serde::Serialize;

/// Stationarity testing and differencing search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityConfig {
    /// Significance level for both unit-root and level-stationarity tests.
    pub alpha: f64,
    /// Shortest series the tests accept.
    pub min_observations: usize,
    /// Upper bound on ordinary differences in `auto_difference`.
    pub max_diff_order: usize,
    /// Lag used for seasonal differencing.
    pub seasonal_period: usize,
}

impl Default for StationarityConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            min_observations: 20,
            max_diff_order: 3,
            seasonal_period: 12,
        }
    }
}

impl StationarityConfig {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_min_observations(mut self, n: usize) -> Self {
        self.min_observations = n;
        self
    }

    pub fn with_max_diff_order(mut self, order: usize) -> Self {
        self.max_diff_order = order;
        self
    }

    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }
}

/// Thresholds of the cutoff / tail-off pattern heuristic.
///
/// These encode a Box-Jenkins reading convention and are not fitted to data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternThresholds {
    /// Values examined when fitting the decay trend.
    pub trend_window: usize,
    /// Slope below which the trailing window counts as decaying.
    pub tail_off_slope: f64,
    /// Smallest last-significant lag that may be read as tail-off.
    pub min_tail_off_lag: usize,
    /// Last-significant lags below this are always a cutoff.
    pub short_cutoff_lag: usize,
}

impl Default for PatternThresholds {
    fn default() -> Self {
        Self {
            trend_window: 4,
            tail_off_slope: -0.01,
            min_tail_off_lag: 5,
            short_cutoff_lag: 3,
        }
    }
}

/// ACF/PACF computation and candidate generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentificationConfig {
    /// Confidence band level.
    pub alpha: f64,
    /// Cap on correlogram lags.
    pub max_lags: usize,
    /// Length cap of the candidate list.
    pub max_candidates: usize,
    pub thresholds: PatternThresholds,
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            max_lags: 20,
            max_candidates: 10,
            thresholds: PatternThresholds::default(),
        }
    }
}

impl IdentificationConfig {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_lags(mut self, max_lags: usize) -> Self {
        self.max_lags = max_lags;
        self
    }

    pub fn with_thresholds(mut self, thresholds: PatternThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// Maximum likelihood optimisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MleConfig {
    /// Iteration cap of the simplex search.
    pub max_iter: usize,
    /// Tolerance on the per-observation negative log-likelihood.
    pub tolerance: f64,
    /// Treat non-convergence as an estimation failure instead of a warning.
    pub require_convergence: bool,
}

impl Default for MleConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-9,
            require_convergence: false,
        }
    }
}

impl MleConfig {
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_require_convergence(mut self, require: bool) -> Self {
        self.require_convergence = require;
        self
    }
}

/// Method-of-moments estimation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MomentsConfig {
    /// Seed for the random start of the MA(q > 1) search. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl MomentsConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// All stage settings owned by one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightConfig {
    pub stationarity: StationarityConfig,
    pub identification: IdentificationConfig,
    pub moments: MomentsConfig,
    pub mle: MleConfig,
}

impl InsightConfig {
    pub fn with_stationarity(mut self, config: StationarityConfig) -> Self {
        self.stationarity = config;
        self
    }

    pub fn with_identification(mut self, config: IdentificationConfig) -> Self {
        self.identification = config;
        self
    }

    pub fn with_moments(mut self, config: MomentsConfig) -> Self {
        self.moments = config;
        self
    }

    pub fn with_mle(mut self, config: MleConfig) -> Self {
        self.mle = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_conventions() {
        let config = InsightConfig::default();
        assert_eq!(config.stationarity.alpha, 0.05);
        assert_eq!(config.stationarity.min_observations, 20);
        assert_eq!(config.stationarity.max_diff_order, 3);
        assert_eq!(config.identification.max_candidates, 10);
        assert_eq!(config.identification.thresholds.trend_window, 4);
        assert_eq!(config.identification.thresholds.tail_off_slope, -0.01);
        assert_eq!(config.mle.max_iter, 1000);
        assert!(!config.mle.require_convergence);
        assert!(config.moments.seed.is_none());
    }

    #[test]
    fn builders_override_fields() {
        let config = InsightConfig::default()
            .with_stationarity(
                StationarityConfig::default()
                    .with_max_diff_order(1)
                    .with_min_observations(30),
            )
            .with_identification(
                IdentificationConfig::default()
                    .with_max_lags(12)
                    .with_thresholds(PatternThresholds {
                        min_tail_off_lag: 3,
                        ..PatternThresholds::default()
                    }),
            )
            .with_moments(MomentsConfig::default().with_seed(7))
            .with_mle(MleConfig::default().with_require_convergence(true));
        assert_eq!(config.stationarity.max_diff_order, 1);
        assert_eq!(config.stationarity.min_observations, 30);
        assert_eq!(config.identification.max_lags, 12);
        assert_eq!(config.identification.thresholds.min_tail_off_lag, 3);
        assert_eq!(config.identification.thresholds.trend_window, 4);
        assert_eq!(config.moments.seed, Some(7));
        assert!(config.mle.require_convergence);
    }
}
