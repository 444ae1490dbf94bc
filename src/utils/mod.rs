//! Numerical utilities shared by the analysis stages.

pub mod linalg;
pub mod optimization;
pub mod stats;

pub use linalg::{least_squares, solve, LeastSquares};
pub use optimization::{nelder_mead, numerical_hessian, NelderMeadConfig, NelderMeadResult};
pub use stats::{mean, quantile_normal, std_dev, variance};
