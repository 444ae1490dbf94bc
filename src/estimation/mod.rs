//! Parameter estimation for candidate orders.
//!
//! Two methods are available, selected by [`EstimationMethod`]:
//! - method of moments (Yule-Walker for AR, ACF matching for MA)
//! - exact maximum likelihood for any ARIMA(p, d, q)
//!
//! Every method returns an [`EstimationResult`]; failures are recorded in the
//! result rather than returned as errors so that one bad order never stops
//! the others.

mod compare;
mod estimator;
mod mle;
mod moments;
mod result;

pub use compare::{compare, CoefficientDifference, EstimateComparison, SelectionCriteria, VarianceDifference};
pub use estimator::ParameterEstimator;
pub use mle::estimate_mle;
pub use moments::{estimate_ar, estimate_ma, estimate_moments, ma1_from_rho, ma_theoretical_acf};
pub use result::{EstimationDetails, EstimationMethod, EstimationResult};
