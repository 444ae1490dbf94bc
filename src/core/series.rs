//! Series data structure: an ordered, NaN-free sequence of observations.

use crate::error::{InsightError, Result};
use crate::utils::stats::{mean, std_dev};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Policy for handling missing values (NaN/Inf) at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingValuePolicy {
    /// Drop observations with missing values (and their index entries).
    Drop,
    /// Return an error if missing values are found.
    #[default]
    Error,
}

/// Index attached to a series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesIndex {
    /// Integer positions or integer labels, strictly increasing.
    Integer(Vec<i64>),
    /// Timestamps, strictly increasing.
    Dates(Vec<DateTime<Utc>>),
}

impl SeriesIndex {
    /// Default integer index `0..n`.
    pub fn range(n: usize) -> Self {
        SeriesIndex::Integer((0..n as i64).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesIndex::Integer(v) => v.len(),
            SeriesIndex::Dates(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the entry at `position`.
    pub fn label(&self, position: usize) -> Option<IndexLabel> {
        match self {
            SeriesIndex::Integer(v) => v.get(position).copied().map(IndexLabel::Integer),
            SeriesIndex::Dates(v) => v.get(position).copied().map(IndexLabel::Date),
        }
    }

    fn validate(&self) -> Result<()> {
        let increasing = match self {
            SeriesIndex::Integer(v) => v.windows(2).all(|w| w[1] > w[0]),
            SeriesIndex::Dates(v) => v.windows(2).all(|w| w[1] > w[0]),
        };
        if increasing {
            Ok(())
        } else {
            Err(InsightError::InvalidInput(
                "index must be strictly increasing without duplicates".to_string(),
            ))
        }
    }

    fn select(&self, keep: &[usize]) -> SeriesIndex {
        match self {
            SeriesIndex::Integer(v) => SeriesIndex::Integer(keep.iter().map(|&i| v[i]).collect()),
            SeriesIndex::Dates(v) => SeriesIndex::Dates(keep.iter().map(|&i| v[i]).collect()),
        }
    }

    fn tail_from(&self, start: usize) -> SeriesIndex {
        match self {
            SeriesIndex::Integer(v) => SeriesIndex::Integer(v[start.min(v.len())..].to_vec()),
            SeriesIndex::Dates(v) => SeriesIndex::Dates(v[start.min(v.len())..].to_vec()),
        }
    }
}

/// A single rendered index entry: an integer or a timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexLabel {
    Integer(i64),
    Date(DateTime<Utc>),
}

impl std::fmt::Display for IndexLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexLabel::Integer(i) => write!(f, "{}", i),
            IndexLabel::Date(d) => write!(f, "{}", d.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

impl Serialize for IndexLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            IndexLabel::Integer(i) => serializer.serialize_i64(*i),
            IndexLabel::Date(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

/// Descriptive summary of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub length: usize,
    pub start: Option<IndexLabel>,
    pub end: Option<IndexLabel>,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// An ordered sequence of finite observations with an integer or date index.
///
/// A `Series` never contains NaN or infinite values. Every transformation
/// (differencing, trimming) produces a new `Series`.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    index: SeriesIndex,
    values: Vec<f64>,
}

impl Series {
    /// Create a series with the default integer index `0..n`.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        let n = values.len();
        Self::new(SeriesIndex::range(n), values, MissingValuePolicy::Error)
    }

    /// Create a series with explicit integer labels.
    pub fn with_integer_index(index: Vec<i64>, values: Vec<f64>) -> Result<Self> {
        Self::new(SeriesIndex::Integer(index), values, MissingValuePolicy::Error)
    }

    /// Create a date-indexed series.
    pub fn with_dates(dates: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        Self::new(SeriesIndex::Dates(dates), values, MissingValuePolicy::Error)
    }

    /// Create a series, handling non-finite values according to `policy`.
    pub fn new(index: SeriesIndex, values: Vec<f64>, policy: MissingValuePolicy) -> Result<Self> {
        if index.len() != values.len() {
            return Err(InsightError::InvalidInput(format!(
                "index length {} does not match value length {}",
                index.len(),
                values.len()
            )));
        }
        index.validate()?;

        let has_missing = values.iter().any(|v| !v.is_finite());
        if !has_missing {
            return Ok(Self { index, values });
        }

        match policy {
            MissingValuePolicy::Error => Err(InsightError::MissingValues),
            MissingValuePolicy::Drop => {
                let keep: Vec<usize> = (0..values.len())
                    .filter(|&i| values[i].is_finite())
                    .collect();
                let index = index.select(&keep);
                let values = keep.iter().map(|&i| values[i]).collect();
                Ok(Self { index, values })
            }
        }
    }

    /// Create a series from loader output, dropping non-finite observations.
    pub fn sanitized(index: SeriesIndex, values: Vec<f64>) -> Result<Self> {
        Self::new(index, values, MissingValuePolicy::Drop)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn index(&self) -> &SeriesIndex {
        &self.index
    }

    pub fn is_date_indexed(&self) -> bool {
        matches!(self.index, SeriesIndex::Dates(_))
    }

    pub fn index_label(&self, position: usize) -> Option<IndexLabel> {
        self.index.label(position)
    }

    /// Replace the values with a shorter sequence aligned to the end of this
    /// series' index (the leading `len - values.len()` entries are dropped).
    pub(crate) fn with_trailing_values(&self, values: Vec<f64>) -> Series {
        let start = self.len().saturating_sub(values.len());
        Series {
            index: self.index.tail_from(start),
            values,
        }
    }

    /// Index entries continuing this series for `steps` periods.
    ///
    /// Date indices step by the spacing between the last two observations;
    /// integer indices step by one.
    pub fn future_index(&self, steps: usize) -> Result<Vec<IndexLabel>> {
        match &self.index {
            SeriesIndex::Integer(v) => {
                let last = v.last().copied().unwrap_or(-1);
                Ok((1..=steps as i64).map(|k| IndexLabel::Integer(last + k)).collect())
            }
            SeriesIndex::Dates(v) => {
                if v.len() < 2 {
                    return Err(InsightError::InsufficientData {
                        needed: 2,
                        got: v.len(),
                    });
                }
                let last = v[v.len() - 1];
                let step: Duration = last - v[v.len() - 2];
                Ok((1..=steps as i32)
                    .map(|k| IndexLabel::Date(last + step * k))
                    .collect())
            }
        }
    }

    /// Descriptive statistics of the values.
    pub fn summary(&self) -> DataSummary {
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        DataSummary {
            length: self.len(),
            start: self.index_label(0),
            end: self.len().checked_sub(1).and_then(|i| self.index_label(i)),
            mean: mean(&self.values),
            std: std_dev(&self.values),
            min,
            max,
        }
    }
}
