//! Error types for metric computation.

use crate::group::RateMetric;
use fairway_data::DataError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Result type for metric computation.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors raised by the fairness-metric engine.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A column is missing or not of the required type
    #[error("Invalid column '{column}': {reason}")]
    InvalidColumn {
        /// Column that was requested
        column: String,
        /// Why the column was rejected
        reason: String,
    },

    /// The sensitive attribute does not have exactly two categories
    #[error(
        "Sensitive attribute '{column}' must have exactly two categories, found {}: [{}]",
        .found.len(),
        .found.join(", ")
    )]
    NonBinaryAttribute {
        /// Sensitive attribute column
        column: String,
        /// Distinct values found, in sorted order
        found: Vec<String>,
    },

    /// A rate has a zero denominator for some category
    #[error("{metric} is undefined for category '{category}': no rows in its denominator")]
    UndefinedRate {
        /// Category whose rate is undefined
        category: String,
        /// Rate that could not be computed
        metric: RateMetric,
    },

    /// Fewer than two groups are available to compare
    #[error("At least two groups are required for a disparity, found {found}")]
    InsufficientGroups {
        /// Number of groups available
        found: usize,
    },

    /// Per-row inputs disagree on the number of rows
    #[error("Length mismatch: {what} has {actual} rows, expected {expected}")]
    LengthMismatch {
        /// Input with the wrong length
        what: &'static str,
        /// Expected row count
        expected: usize,
        /// Actual row count
        actual: usize,
    },

    /// A per-group aggregate came back null or negative
    #[error("Aggregate '{column}' has no valid value in group row {row}")]
    InvalidAggregate {
        /// Aggregated column
        column: &'static str,
        /// Row of the grouped frame
        row: usize,
    },

    /// Data access error other than an invalid column
    #[error("Data error: {0}")]
    Data(DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl MetricsError {
    /// Build an [`MetricsError::InvalidColumn`] for `column`.
    pub fn invalid_column(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidColumn {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

impl From<DataError> for MetricsError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::InvalidColumn { column, reason } => Self::InvalidColumn { column, reason },
            DataError::Polars(err) => Self::Polars(err),
            other => Self::Data(other),
        }
    }
}
