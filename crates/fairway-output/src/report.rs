//! Report generation for Fairway audits.
//!
//! A report is a stateless rendering of an already-computed audit: no metric
//! is derived here.

use crate::assessment::{BiasAssessment, DEFAULT_BIAS_THRESHOLD};
use chrono::{DateTime, Utc};
use fairway_data::ColumnMapping;
use fairway_metrics::{AuditOutcome, DisparitySummary, GroupMetricsTable, RateMetric};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Dataset name used when none is given.
pub const DEFAULT_DATASET_NAME: &str = "Default HRDataset";

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A required builder field was not set.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Format a rate or disparity to three decimals, spelling out `NaN`.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "undefined".to_string()
    } else {
        format!("{value:.3}")
    }
}

/// A fairness audit report.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Dataset name or file.
    pub dataset: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Number of records audited.
    pub records: usize,

    /// Selected columns.
    pub columns: ColumnMapping,

    /// Median threshold of the salary column.
    pub label_threshold: f64,

    /// Per-group rates.
    pub group_metrics: GroupMetricsTable,

    /// Scalar disparities.
    pub disparities: DisparitySummary,

    /// Verdict against the bias threshold.
    pub assessment: BiasAssessment,
}

impl AuditReport {
    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// By-group rate table as Markdown.
    pub fn group_table_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("| {} |", self.columns.gender));
        for metric in RateMetric::all() {
            output.push_str(&format!(" {} |", metric.header()));
        }
        output.push('\n');
        output.push_str("|---|");
        for _ in RateMetric::all() {
            output.push_str("---:|");
        }
        output.push('\n');

        for group in self.group_metrics.groups() {
            output.push_str(&format!("| {} |", group.category));
            for metric in RateMetric::all() {
                output.push_str(&format!(" {} |", format_value(group.rate(metric))));
            }
            output.push('\n');
        }

        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Fairness Audit Report\n\n");

        output.push_str("### Dataset Info\n");
        output.push_str(&format!("- File: `{}`\n", self.dataset));
        output.push_str(&format!("- Records: `{}`\n", self.records));
        output.push_str(&format!(
            "- Generated: `{}`\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output.push_str("### Selected Columns\n");
        output.push_str(&format!("- Salary: `{}`\n", self.columns.salary));
        output.push_str(&format!("- Gender: `{}`\n", self.columns.gender));
        output.push_str(&format!("- Performance: `{}`\n", self.columns.performance));
        output.push_str(&format!("- Absences: `{}`\n\n", self.columns.absences));

        output.push_str("### Fairness Metrics\n");
        output.push_str(&format!(
            "- High salary threshold (median): `{:.2}`\n",
            self.label_threshold
        ));
        output.push_str(&format!(
            "- Demographic Parity Difference: `{}`\n",
            format_value(self.disparities.demographic_parity_difference)
        ));
        output.push_str(&format!(
            "- Equalized Odds Difference: `{}`\n\n",
            format_value(self.disparities.equalized_odds_difference)
        ));

        output.push_str("#### By Gender Group:\n");
        output.push_str(&self.group_table_markdown());

        if !self.disparities.undefined_rates.is_empty() {
            output.push_str("\n#### Undefined Rates:\n");
            for undefined in &self.disparities.undefined_rates {
                output.push_str(&format!(
                    "- `{}` for `{}`: no rows in its denominator\n",
                    undefined.metric, undefined.category
                ));
            }
        }

        output.push_str("\n### Assessment\n");
        output.push_str(&self.assessment.to_markdown());

        output.push_str("\n---\n\n*This audit was generated automatically.*\n");

        output
    }

    /// Write the Markdown rendering to `path`.
    pub fn write_markdown(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_markdown())?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    dataset: Option<String>,
    columns: Option<ColumnMapping>,
    bias_threshold: Option<f64>,
    records: Option<usize>,
    label_threshold: Option<f64>,
    group_metrics: Option<GroupMetricsTable>,
    disparities: Option<DisparitySummary>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dataset name.
    pub fn dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    /// Set the selected columns.
    pub fn columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Set the bias threshold.
    pub const fn bias_threshold(mut self, threshold: f64) -> Self {
        self.bias_threshold = Some(threshold);
        self
    }

    /// Take record count, threshold, group metrics and disparities from an audit.
    pub fn outcome(mut self, outcome: &AuditOutcome) -> Self {
        self.records = Some(outcome.labelled.height());
        self.label_threshold = Some(outcome.label.threshold);
        self.group_metrics = Some(outcome.group_metrics.clone());
        self.disparities = Some(outcome.disparities.clone());
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<AuditReport, ReportError> {
        let columns = self.columns.ok_or(ReportError::MissingField("columns"))?;
        let group_metrics = self
            .group_metrics
            .ok_or(ReportError::MissingField("outcome"))?;
        let disparities = self
            .disparities
            .ok_or(ReportError::MissingField("outcome"))?;
        let assessment = BiasAssessment::from_disparities(
            &disparities,
            self.bias_threshold.unwrap_or(DEFAULT_BIAS_THRESHOLD),
        );

        Ok(AuditReport {
            dataset: self
                .dataset
                .unwrap_or_else(|| DEFAULT_DATASET_NAME.to_string()),
            timestamp: Utc::now(),
            records: self.records.unwrap_or_default(),
            columns,
            label_threshold: self.label_threshold.unwrap_or(f64::NAN),
            group_metrics,
            disparities,
            assessment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportFormat, Exporter};
    use fairway_data::RecordSet;
    use fairway_metrics::{PipelineOptions, audit};
    use polars::prelude::*;

    fn outcome() -> AuditOutcome {
        let records = RecordSet::new(
            df!(
                "Salary" => [50.0, 50.0, 150.0, 150.0],
                "Sex" => ["F", "F", "M", "M"],
            )
            .unwrap(),
        );
        audit(&records, "Salary", "Sex", &PipelineOptions::default()).unwrap()
    }

    fn mapping() -> ColumnMapping {
        ColumnMapping::new("Salary", "Sex", "PerformanceScore", "Absences")
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .dataset("hr.csv")
            .columns(mapping())
            .outcome(&outcome())
            .build()
            .unwrap();

        assert_eq!(report.dataset, "hr.csv");
        assert_eq!(report.records, 4);
        assert_eq!(report.group_metrics.len(), 2);
        assert!(report.assessment.is_significant());
    }

    #[test]
    fn test_report_builder_requires_outcome() {
        let err = ReportBuilder::new().columns(mapping()).build().unwrap_err();
        assert!(matches!(err, ReportError::MissingField("outcome")));
    }

    #[test]
    fn test_default_dataset_name() {
        let report = ReportBuilder::new()
            .columns(mapping())
            .outcome(&outcome())
            .build()
            .unwrap();
        assert_eq!(report.dataset, DEFAULT_DATASET_NAME);
    }

    #[test]
    fn test_markdown_sections() {
        let report = ReportBuilder::new()
            .dataset("hr.csv")
            .columns(mapping())
            .outcome(&outcome())
            .build()
            .unwrap();
        let markdown = report.to_markdown();

        assert!(markdown.starts_with("# Fairness Audit Report"));
        assert!(markdown.contains("- Records: `4`"));
        assert!(markdown.contains("- Gender: `Sex`"));
        assert!(markdown.contains("- Demographic Parity Difference: `1.000`"));
        assert!(markdown.contains("- Equalized Odds Difference: `undefined`"));
        assert!(markdown.contains("| Sex | Selection Rate | TPR | FPR |"));
        assert!(markdown.contains("| F | 0.000 | undefined | 0.000 |"));
        assert!(markdown.contains("| M | 1.000 | 1.000 | undefined |"));
        assert!(markdown.contains("#### Undefined Rates:"));
        assert!(markdown.ends_with("*This audit was generated automatically.*\n"));
    }

    #[test]
    fn test_report_json() {
        let report = ReportBuilder::new()
            .columns(mapping())
            .outcome(&outcome())
            .build()
            .unwrap();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"demographic_parity_difference\": 1.0"));
        assert!(json.contains("\"verdict\": \"significant\""));
    }

    #[test]
    fn test_undefined_disparity_is_null_in_json() {
        let report = ReportBuilder::new()
            .columns(mapping())
            .outcome(&outcome())
            .build()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert!(value["disparities"]["equalized_odds_difference"].is_null());
        assert_eq!(value["disparities"]["undefined_rates"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_csv_header_spells_out_undefined() {
        let report = ReportBuilder::new()
            .columns(mapping())
            .outcome(&outcome())
            .build()
            .unwrap();
        let csv = report.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("# Equalized Odds Difference: undefined\n"));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.12345), "0.123");
        assert_eq!(format_value(f64::NAN), "undefined");
    }
}
