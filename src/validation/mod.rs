//! Statistical tests: stationarity of the input and adequacy of residuals.
//!
//! # Example
//!
//! ```
//! use arima_insight::validation::{ljung_box, adf_test, kpss_test};
//!
//! let residuals = vec![0.1, -0.2, 0.15, -0.1, 0.05, -0.08, 0.12, -0.15, 0.1, -0.05, 0.02, -0.03];
//! let lb = ljung_box(&residuals, Some(3)).unwrap();
//! println!("Ljung-Box p-value at lag 3: {}", lb.p_value);
//!
//! let series: Vec<f64> = (0..60).map(|i| ((i * 37) % 11) as f64).collect();
//! let adf = adf_test(&series, 0.05).unwrap();
//! let kpss = kpss_test(&series, 0.05).unwrap();
//! println!("ADF stationary: {}, KPSS stationary: {}", adf.is_stationary, kpss.is_stationary);
//! ```

pub mod residual_tests;
pub mod stationarity;

pub use residual_tests::{
    heteroskedasticity_test, jarque_bera, ljung_box, shapiro_wilk, HeteroskedasticityTest,
    LjungBoxLag, LjungBoxResult, NormalityTest,
};
pub use stationarity::{
    adf_test, combine, kpss_test, DifferencingOutcome, OverallStationarity,
    StationarityConclusion, StationarityTest, StationarityTester, StationarityVerdict,
    TestSelection,
};
