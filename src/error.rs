//! Error types for the arima-insight library.

use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, InsightError>;

/// Errors that can occur while analysing a series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsightError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Missing (NaN or infinite) values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Malformed input or out-of-range parameter.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation invoked out of sequence.
    #[error("invalid session state: {0}")]
    State(String),

    /// A specific (order, method) combination could not be fitted.
    #[error("estimation of {order} by {method} failed: {message}")]
    Estimation {
        order: String,
        method: String,
        message: String,
    },

    /// Differencing could not reach stationarity within the allowed order.
    #[error("series not stationary after {max_order} differences")]
    DifferencingExhausted { max_order: usize },

    /// No fitted model is available for the requested operation.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Unknown estimation method name at the boundary.
    #[error("unknown estimation method: {0}")]
    UnknownMethod(String),

    /// Numerical failure (singular matrix, non-finite likelihood, ...).
    #[error("computation error: {0}")]
    Computation(String),
}

impl InsightError {
    /// Whether the pipeline may record this error and continue.
    ///
    /// Input and sequencing errors are always surfaced to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            InsightError::Estimation { .. }
                | InsightError::DifferencingExhausted { .. }
                | InsightError::Computation(_)
        )
    }

    pub(crate) fn estimation(
        order: impl ToString,
        method: impl ToString,
        message: impl ToString,
    ) -> Self {
        InsightError::Estimation {
            order: order.to_string(),
            method: method.to_string(),
            message: message.to_string(),
        }
    }
}
