//! Export functionality for Fairway audit results.
//!
//! CSV and JSON export for the group metrics table, the disparity summary and
//! full reports.

use crate::report::{AuditReport, format_value};
use fairway_metrics::{DisparitySummary, GroupMetricsTable};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while exporting audit results.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing a CSV row failed
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// Serializing to JSON failed
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The CSV writer produced bytes that are not UTF-8
    #[error("CSV export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Writing the output file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested format name is not one of `csv`, `json`, `pretty-json`
    #[error("Unknown export format '{0}' (expected csv, json or pretty-json)")]
    UnknownFormat(String),
}

/// Output format for audit results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One row per group, or per disparity
    Csv,
    /// Compact JSON
    Json,
    /// Indented JSON
    PrettyJson,
}

impl ExportFormat {
    /// File extension used for this format.
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    fn to_json<T: Serialize>(self, value: &T) -> Result<String, ExportError> {
        Ok(match self {
            Self::PrettyJson => serde_json::to_string_pretty(value)?,
            _ => serde_json::to_string(value)?,
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// One row of the group metrics table.
#[derive(Debug, Serialize)]
struct GroupMetricsRow {
    category: String,
    rows: usize,
    selection_rate: f64,
    true_positive_rate: f64,
    false_positive_rate: f64,
}

/// One disparity as a name/value pair.
#[derive(Debug, Serialize)]
struct DisparityRow {
    metric: &'static str,
    value: f64,
}

fn to_csv<S: Serialize>(records: impl IntoIterator<Item = S>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for GroupMetricsTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(self.groups().iter().map(|g| GroupMetricsRow {
                category: g.category.to_string(),
                rows: g.counts.rows,
                selection_rate: g.selection_rate,
                true_positive_rate: g.true_positive_rate,
                false_positive_rate: g.false_positive_rate,
            })),
            ExportFormat::Json | ExportFormat::PrettyJson => format.to_json(self),
        }
    }
}

impl Exporter for DisparitySummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv([
                DisparityRow {
                    metric: "demographic_parity_difference",
                    value: self.demographic_parity_difference,
                },
                DisparityRow {
                    metric: "equalized_odds_difference",
                    value: self.equalized_odds_difference,
                },
            ]),
            ExportFormat::Json | ExportFormat::PrettyJson => format.to_json(self),
        }
    }
}

impl Exporter for AuditReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut output = String::new();

                // Audit context as comment lines ahead of the group rows
                output.push_str(&format!("# Dataset: {}\n", self.dataset));
                output.push_str(&format!("# Records: {}\n", self.records));
                output.push_str(&format!(
                    "# Demographic Parity Difference: {}\n",
                    format_value(self.disparities.demographic_parity_difference)
                ));
                output.push_str(&format!(
                    "# Equalized Odds Difference: {}\n",
                    format_value(self.disparities.equalized_odds_difference)
                ));

                output.push_str(&self.group_metrics.export_to_string(ExportFormat::Csv)?);
                Ok(output)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => format.to_json(self),
        }
    }
}
