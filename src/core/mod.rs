//! Core data structures: series and forecasts.

mod forecast;
mod series;

pub use forecast::Forecast;
pub use series::{DataSummary, IndexLabel, MissingValuePolicy, Series, SeriesIndex};
