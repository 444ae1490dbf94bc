//! Cutoff / tail-off classification of a correlogram.
//!
//! A numeric stand-in for reading an ACF or PACF plot by eye. It is a
//! heuristic, not an inference procedure: the decay check fits a line to the
//! absolute values of the last few significant lags.

use crate::config::PatternThresholds;
use crate::identification::correlogram::Correlogram;
use crate::utils::stats::{linear_slope, two_sided_z};
use serde::Serialize;
use std::fmt;

/// Shape of a correlogram beyond lag 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    /// Drops to insignificance abruptly.
    Cutoff,
    /// Decays gradually.
    TailOff,
    /// No significant lag.
    WhiteNoise,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Pattern::Cutoff => "cutoff",
            Pattern::TailOff => "tail-off",
            Pattern::WhiteNoise => "white noise",
        };
        f.write_str(label)
    }
}

/// How significance is judged.
#[derive(Debug, Clone, Copy)]
pub enum SignificanceBand<'a> {
    /// Half-width per lag, lag 0 included.
    PerLag(&'a [f64]),
    /// `|r_k| > z(alpha) / sqrt(n_obs)` at every lag.
    Uniform { n_obs: usize, alpha: f64 },
}

impl SignificanceBand<'_> {
    fn half_width(&self, lag: usize) -> f64 {
        match self {
            SignificanceBand::PerLag(widths) => widths.get(lag).copied().unwrap_or(f64::INFINITY),
            SignificanceBand::Uniform { n_obs, alpha } => {
                two_sided_z(*alpha) / (*n_obs as f64).max(1.0).sqrt()
            }
        }
    }
}

/// Classification of one correlogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternAnalysis {
    pub pattern: Pattern,
    /// Lag after which the function is read as cut off (0 for white noise).
    pub cutoff_lag: usize,
    /// Highest significant lag (0 when none).
    pub last_significant_lag: usize,
    /// All significant lags, ascending, lag 0 excluded.
    pub significant_lags: Vec<usize>,
    /// Largest `|r_k|` among the significant lags.
    pub max_significant_value: f64,
}

impl PatternAnalysis {
    pub fn is_cutoff(&self) -> bool {
        self.pattern == Pattern::Cutoff
    }

    pub fn is_tail_off(&self) -> bool {
        self.pattern == Pattern::TailOff
    }

    /// Largest `k` with every lag in `1..=k` significant (0 when lag 1 is not).
    pub fn leading_run(&self) -> usize {
        self.significant_lags
            .iter()
            .zip(1..)
            .take_while(|&(&lag, expected)| lag == expected)
            .count()
    }
}

/// Classify correlations at lags `0..` (lag 0 is ignored).
pub fn classify_pattern(
    values: &[f64],
    band: SignificanceBand<'_>,
    thresholds: &PatternThresholds,
) -> PatternAnalysis {
    let significant_lags: Vec<usize> = (1..values.len())
        .filter(|&lag| values[lag].abs() > band.half_width(lag))
        .collect();
    let max_significant_value = significant_lags
        .iter()
        .map(|&lag| values[lag].abs())
        .fold(0.0, f64::max);

    let Some(&last) = significant_lags.last() else {
        return PatternAnalysis {
            pattern: Pattern::WhiteNoise,
            cutoff_lag: 0,
            last_significant_lag: 0,
            significant_lags,
            max_significant_value,
        };
    };

    // Thresholds are expressed on the zero-based position after lag 0.
    let position = last - 1;
    let pattern = if position >= thresholds.short_cutoff_lag
        && position >= thresholds.min_tail_off_lag
        && is_decaying(values, last, thresholds)
    {
        Pattern::TailOff
    } else {
        Pattern::Cutoff
    };

    PatternAnalysis {
        pattern,
        cutoff_lag: last,
        last_significant_lag: last,
        significant_lags,
        max_significant_value,
    }
}

/// Classify a correlogram against its own band.
pub fn classify_correlogram(
    correlogram: &Correlogram,
    thresholds: &PatternThresholds,
) -> PatternAnalysis {
    classify_pattern(
        &correlogram.values,
        SignificanceBand::PerLag(&correlogram.half_widths),
        thresholds,
    )
}

fn is_decaying(values: &[f64], last: usize, thresholds: &PatternThresholds) -> bool {
    let window = thresholds.trend_window.max(1);
    let start = last.saturating_sub(window - 1).max(1);
    let recent: Vec<f64> = values[start..=last].iter().map(|v| v.abs()).collect();
    recent.len() > 1 && linear_slope(&recent) < thresholds.tail_off_slope
}
