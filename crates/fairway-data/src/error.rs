//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// A column is missing or cannot be read as the requested type
    #[error("Invalid column '{column}': {reason}")]
    InvalidColumn {
        /// Column that was requested
        column: String,
        /// Why the column was rejected
        reason: String,
    },

    /// A required column selection was left empty
    #[error("No column selected for {role}")]
    UnselectedColumn {
        /// Role the column was meant to play (salary, gender, ...)
        role: String,
    },

    /// The record set has no rows
    #[error("Record set is empty")]
    EmptyRecordSet,

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Build an [`DataError::InvalidColumn`] for `column`.
    pub fn invalid_column(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidColumn {
            column: column.into(),
            reason: reason.into(),
        }
    }
}
