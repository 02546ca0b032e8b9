//! Outcome Label
//!
//! Turns a continuous numeric column into a binary outcome by thresholding at
//! the column median. A row is labelled `1` iff its value is strictly greater
//! than the median, so a column where every value equals the median yields an
//! all-zero label. Missing values are labelled `0`.

use crate::error::{MetricsError, Result};
use fairway_data::RecordSet;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the derived label column in the labelled record set.
pub const DEFAULT_LABEL_COLUMN: &str = "HighSalary";

/// Binary outcome derived from a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeLabel {
    /// Column the label was derived from
    pub source_column: String,
    /// Median of the source column over the whole record set
    pub threshold: f64,
    /// One entry per row, `true` iff the value is above the threshold
    pub values: Vec<bool>,
}

impl OutcomeLabel {
    /// Derive the label for `column` of `records`.
    ///
    /// Fails with [`MetricsError::InvalidColumn`] when the column is missing,
    /// not numeric, or has no non-missing values to take a median of.
    pub fn derive(records: &RecordSet, column: &str) -> Result<Self> {
        let values = records.numeric(column)?;
        let threshold = median_threshold(&values, column)?;

        let labels: Vec<bool> = values
            .into_iter()
            .map(|value| value.is_some_and(|v| v > threshold))
            .collect();

        debug!(
            column,
            threshold,
            positives = labels.iter().filter(|&&l| l).count(),
            rows = labels.len(),
            "Derived outcome label"
        );

        Ok(Self {
            source_column: column.to_string(),
            threshold,
            values: labels,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the label covers no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of rows labelled `1`.
    pub fn positives(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }

    /// The label as an integer 0/1 column named `name`.
    pub fn to_column(&self, name: &str) -> Column {
        let values: Vec<i32> = self.values.iter().map(|&v| i32::from(v)).collect();
        Column::new(name.into(), values)
    }
}

/// Median of `values`, ignoring missing entries.
///
/// Even-sized inputs take the mean of the two middle values.
pub fn median_threshold(values: &Float64Chunked, column: &str) -> Result<f64> {
    values
        .median()
        .filter(|m| !m.is_nan())
        .ok_or_else(|| MetricsError::invalid_column(column, "no numeric values to take a median of"))
}
