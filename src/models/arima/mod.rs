//! ARIMA models fitted by exact maximum likelihood.
//!
//! This module provides:
//! - Ordinary and seasonal differencing with the matching integration
//! - Stationarity and invertibility transforms for ARMA coefficients
//! - A Kalman filter computing the exact Gaussian likelihood
//! - [`ArimaModel`] and its fitted counterpart [`FittedArima`]

mod diff;
pub mod kalman;
mod model;
pub mod params;

pub use diff::{difference, integrate, inverse_difference, seasonal_difference};
pub use model::{ArimaModel, FittedArima, ModelOrder, ParameterEstimate};
