//! Forecast result structure for holding predictions.

use crate::error::{InsightError, Result};
use serde::Serialize;

/// A univariate forecast: point predictions with optional intervals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Forecast {
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
    /// Significance level the intervals were built at.
    alpha: Option<f64>,
}

impl Forecast {
    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: None,
            upper: None,
            alpha: None,
        }
    }

    /// Create a forecast with `(1 - alpha)` prediction intervals.
    pub fn from_values_with_intervals(
        values: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
        alpha: f64,
    ) -> Result<Self> {
        if lower.len() != values.len() || upper.len() != values.len() {
            return Err(InsightError::InvalidInput(format!(
                "interval lengths ({}, {}) do not match horizon {}",
                lower.len(),
                upper.len(),
                values.len()
            )));
        }
        Ok(Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
            alpha: Some(alpha),
        })
    }

    /// Forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    pub fn point(&self) -> &[f64] {
        &self.point
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// Intervals as `[low, high]` pairs, one per step.
    pub fn intervals(&self) -> Option<Vec<[f64; 2]>> {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) => Some(
                lower
                    .iter()
                    .zip(upper.iter())
                    .map(|(&l, &u)| [l, u])
                    .collect(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_from_values_has_no_intervals() {
        let forecast = Forecast::from_values(vec![1.0, 2.0, 3.0, 4.0]);
        assert!(!forecast.is_empty());
        assert_eq!(forecast.horizon(), 4);
        assert_eq!(forecast.point(), &[1.0, 2.0, 3.0, 4.0]);
        assert!(!forecast.has_intervals());
        assert!(forecast.intervals().is_none());
        assert!(forecast.alpha().is_none());
    }

    #[test]
    fn forecast_from_values_with_intervals() {
        let forecast =
            Forecast::from_values_with_intervals(vec![2.0, 3.0], vec![1.0, 2.0], vec![3.0, 4.0], 0.05)
                .unwrap();

        assert_eq!(forecast.point(), &[2.0, 3.0]);
        assert_eq!(forecast.lower().unwrap(), &[1.0, 2.0]);
        assert_eq!(forecast.upper().unwrap(), &[3.0, 4.0]);
        assert_eq!(forecast.intervals().unwrap(), vec![[1.0, 3.0], [2.0, 4.0]]);
        assert_eq!(forecast.alpha(), Some(0.05));
    }

    #[test]
    fn mismatched_interval_lengths_are_rejected() {
        let result = Forecast::from_values_with_intervals(vec![1.0, 2.0], vec![0.0], vec![3.0, 4.0], 0.05);
        assert!(matches!(result, Err(InsightError::InvalidInput(_))));
    }

    #[test]
    fn empty_forecast() {
        let forecast = Forecast::default();
        assert!(forecast.is_empty());
        assert_eq!(forecast.horizon(), 0);
    }
}
