//! Model identification from autocorrelation structure.
//!
//! Computes the sample ACF and PACF, reads each as cutoff, tail-off or
//! white noise, and turns the pair into a ranked list of candidate orders.
//!
//! # Example
//!
//! ```
//! use arima_insight::identification::OrderIdentifier;
//!
//! let values: Vec<f64> = (0..120).map(|i| ((i * 7919) % 101) as f64 / 10.0).collect();
//! let result = OrderIdentifier::default().identify_orders(&values, 3, 3, 0).unwrap();
//!
//! assert!(!result.candidates.is_empty());
//! assert!(result.candidates.len() <= 10);
//! ```

mod correlogram;
mod orders;
mod pattern;

pub use correlogram::{acf, acf_pacf, default_lags, pacf, Correlogram, CorrelogramKind};
pub use orders::{propose_candidates, CandidateModel, Identification, OrderIdentifier};
pub use pattern::{classify_correlogram, classify_pattern, Pattern, PatternAnalysis, SignificanceBand};
