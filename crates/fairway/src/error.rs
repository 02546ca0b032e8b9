//! Error types for the audit orchestrator.

use fairway_data::DataError;
use fairway_metrics::MetricsError;
use fairway_output::{ExportError, ReportError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Errors raised while configuring or running an audit.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Loading or validating the record set failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// The audit pipeline failed.
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// Report assembly failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Export failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The configuration file could not be parsed.
    #[error("Invalid config file {}: {source}", path.display())]
    ConfigParse {
        /// Config file path
        path: PathBuf,
        /// Parser error
        source: serde_json::Error,
    },

    /// A configuration value is out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
