use crate::config::{MleConfig, MomentsConfig};
use crate::error::Result;
use crate::estimation::compare::{compare, EstimateComparison};
use crate::estimation::mle::estimate_mle;
use crate::estimation::moments::estimate_moments;
use crate::estimation::result::{EstimationMethod, EstimationResult};
use crate::models::arima::difference;
use crate::models::ModelOrder;
use log::debug;
use std::collections::BTreeMap;

/// Runs one or more estimation methods for a given order.
#[derive(Debug, Clone, Default)]
pub struct ParameterEstimator {
    moments: MomentsConfig,
    mle: MleConfig,
}

impl ParameterEstimator {
    pub fn new(moments: MomentsConfig, mle: MleConfig) -> Self {
        Self { moments, mle }
    }

    /// Estimate `order` on the undifferenced `values` with each method.
    ///
    /// Moment methods see the series differenced `d` times; maximum
    /// likelihood sees the levels and integrates internally so its
    /// forecasts come back in levels.
    pub fn estimate(
        &self,
        values: &[f64],
        order: ModelOrder,
        methods: &[EstimationMethod],
    ) -> BTreeMap<EstimationMethod, EstimationResult> {
        let mut results = BTreeMap::new();
        for &method in methods {
            if results.contains_key(&method) {
                continue;
            }
            debug!("estimating {} by {}", order, method);
            let result = match method {
                EstimationMethod::Moments => {
                    estimate_moments(&difference(values, order.d), order, &self.moments)
                }
                EstimationMethod::Mle => estimate_mle(values, order, &self.mle),
            };
            results.insert(method, result);
        }
        results
    }

    /// [`estimate`](Self::estimate) with method names parsed at the boundary.
    pub fn estimate_named(
        &self,
        values: &[f64],
        order: ModelOrder,
        methods: &[&str],
    ) -> Result<BTreeMap<EstimationMethod, EstimationResult>> {
        let methods = methods
            .iter()
            .map(|name| name.parse())
            .collect::<Result<Vec<EstimationMethod>>>()?;
        Ok(self.estimate(values, order, &methods))
    }

    /// Compare the two methods when both were run.
    pub fn compare(
        &self,
        results: &BTreeMap<EstimationMethod, EstimationResult>,
    ) -> Option<EstimateComparison> {
        let moments = results.get(&EstimationMethod::Moments)?;
        let mle = results.get(&EstimationMethod::Mle)?;
        Some(compare(moments, mle))
    }
}
