//! Time series models.

mod traits;

pub mod arima;

pub use arima::{ArimaModel, FittedArima, ModelOrder};
pub use traits::{FittedModel, FittedModelHandle};
