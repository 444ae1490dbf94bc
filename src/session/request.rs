//! Inbound request types with defensive clamping.

use serde::Serialize;

/// Parameters of [`InsightSession::analyze`](crate::session::InsightSession::analyze).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    /// Difference automatically when the series is not stationary.
    pub auto_diff: bool,
    /// Largest AR order proposed (1..=10).
    pub max_p: usize,
    /// Largest MA order proposed (1..=10).
    pub max_q: usize,
    /// Number of top candidates fitted and evaluated (1..=10).
    pub n_models: usize,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            auto_diff: true,
            max_p: 5,
            max_q: 5,
            n_models: 3,
        }
    }
}

impl AnalysisRequest {
    pub const MAX_ORDER: usize = 10;
    pub const MAX_MODELS: usize = 10;

    pub fn with_auto_diff(mut self, auto_diff: bool) -> Self {
        self.auto_diff = auto_diff;
        self
    }

    pub fn with_max_orders(mut self, max_p: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_q = max_q;
        self
    }

    pub fn with_n_models(mut self, n_models: usize) -> Self {
        self.n_models = n_models;
        self
    }

    /// Copy with every bound forced into range.
    pub fn clamped(self) -> Self {
        Self {
            auto_diff: self.auto_diff,
            max_p: self.max_p.clamp(1, Self::MAX_ORDER),
            max_q: self.max_q.clamp(1, Self::MAX_ORDER),
            n_models: self.n_models.clamp(1, Self::MAX_MODELS),
        }
    }
}

/// Parameters of [`InsightSession::predict`](crate::session::InsightSession::predict).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionRequest {
    /// Forecast horizon (1..=100).
    pub steps: usize,
    /// Interval level is `1 - alpha` (0.01..=0.5).
    pub alpha: f64,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self {
            steps: 10,
            alpha: 0.05,
        }
    }
}

impl PredictionRequest {
    pub const MAX_STEPS: usize = 100;
    pub const ALPHA_RANGE: (f64, f64) = (0.01, 0.5);

    pub fn new(steps: usize, alpha: f64) -> Self {
        Self { steps, alpha }
    }

    /// Copy with every bound forced into range; a NaN alpha becomes the default.
    pub fn clamped(self) -> Self {
        let alpha = if self.alpha.is_nan() {
            Self::default().alpha
        } else {
            self.alpha.clamp(Self::ALPHA_RANGE.0, Self::ALPHA_RANGE.1)
        };
        Self {
            steps: self.steps.clamp(1, Self::MAX_STEPS),
            alpha,
        }
    }
}
