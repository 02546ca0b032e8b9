//! Audit configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "undefined_rates": "reject", "bias_threshold": 0.05 }
//! ```

use crate::error::{AuditError, Result};
use fairway_metrics::{CanonicalLabels, DEFAULT_LABEL_COLUMN, PipelineOptions, UndefinedRatePolicy};
use fairway_output::DEFAULT_BIAS_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Audit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Name of the derived label column (default: `HighSalary`)
    pub label_column: String,

    /// Labels for the two values of a numeric sensitive column
    /// (default: `Female` for the smaller, `Male` for the larger)
    pub canonical_labels: CanonicalLabels,

    /// What to do with a zero-denominator rate (default: propagate)
    pub undefined_rates: UndefinedRatePolicy,

    /// Disparity above which bias is reported as significant (default: 0.1)
    pub bias_threshold: f64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            canonical_labels: CanonicalLabels::default(),
            undefined_rates: UndefinedRatePolicy::default(),
            bias_threshold: DEFAULT_BIAS_THRESHOLD,
        }
    }
}

impl AuditConfig {
    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if a value
    /// is out of range.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| AuditError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    /// Returns [`AuditError::InvalidConfig`] for an empty label column, equal
    /// canonical labels, or a negative or non-finite bias threshold.
    pub fn validate(&self) -> Result<()> {
        if self.label_column.trim().is_empty() {
            return Err(AuditError::InvalidConfig(
                "label_column must not be empty".to_string(),
            ));
        }
        if self.canonical_labels.lower == self.canonical_labels.upper {
            return Err(AuditError::InvalidConfig(format!(
                "canonical labels must differ, both are '{}'",
                self.canonical_labels.lower
            )));
        }
        if !self.bias_threshold.is_finite() || self.bias_threshold < 0.0 {
            return Err(AuditError::InvalidConfig(format!(
                "bias_threshold must be a non-negative number, got {}",
                self.bias_threshold
            )));
        }
        Ok(())
    }

    /// The subset of the configuration the audit pipeline reads.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            label_column: self.label_column.clone(),
            canonical_labels: self.canonical_labels.clone(),
            undefined_rates: self.undefined_rates,
        }
    }
}
