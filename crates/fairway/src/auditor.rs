//! Audit orchestration.
//!
//! [`Auditor`] is the single entry point the binary uses: it checks the
//! column selection, runs the pure pipeline, profiles the groups and builds
//! the report. Nothing is printed here.

use crate::config::AuditConfig;
use crate::error::Result;
use fairway_data::{ColumnMapping, RecordSet};
use fairway_metrics::{AuditOutcome, GroupProfile, audit, profile_groups};
use fairway_output::{AuditReport, ReportBuilder};
use std::path::Path;
use tracing::{debug, info};

/// Everything an audit produces.
#[derive(Debug, Clone)]
pub struct AuditRun {
    /// Label, normalized attribute, group metrics and disparities
    pub outcome: AuditOutcome,
    /// Descriptive statistics per category
    pub profiles: Vec<GroupProfile>,
    /// The assembled report
    pub report: AuditReport,
}

/// Runs fairness audits with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Auditor {
    config: AuditConfig,
}

impl Auditor {
    /// Create an auditor, rejecting invalid configuration values.
    ///
    /// # Errors
    /// Returns [`crate::AuditError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: AuditConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub const fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Audit an in-memory record set.
    ///
    /// `dataset` only names the data in the report.
    pub fn run(
        &self,
        records: &RecordSet,
        columns: &ColumnMapping,
        dataset: &str,
    ) -> Result<AuditRun> {
        columns.validate(records)?;
        debug!(
            salary = %columns.salary,
            gender = %columns.gender,
            performance = %columns.performance,
            absences = %columns.absences,
            "Column selection validated"
        );

        let outcome = audit(
            records,
            &columns.salary,
            &columns.gender,
            &self.config.pipeline_options(),
        )?;
        let profiles = profile_groups(records, &outcome.attribute, columns)?;

        let report = ReportBuilder::new()
            .dataset(dataset)
            .columns(columns.clone())
            .bias_threshold(self.config.bias_threshold)
            .outcome(&outcome)
            .build()?;

        info!(
            dataset,
            groups = profiles.len(),
            verdict = %report.assessment.verdict,
            "Report assembled"
        );

        Ok(AuditRun {
            outcome,
            profiles,
            report,
        })
    }

    /// Load a CSV file and audit it, naming the report after the file.
    pub fn run_csv(&self, path: impl AsRef<Path>, columns: &ColumnMapping) -> Result<AuditRun> {
        let path = path.as_ref();
        let records = RecordSet::from_csv_path(path)?;
        let dataset = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        self.run(&records, columns, &dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use approx::assert_relative_eq;
    use fairway_data::DataError;
    use fairway_metrics::{MetricsError, UndefinedRatePolicy};
    use fairway_output::BiasVerdict;
    use std::io::Write;

    const HR_CSV: &str = "\
Employee_Name,Salary,GenderID,PerformanceScore,Absences
Ada,50,0,Fully Meets,1
Bea,50,0,Exceeds,3
Carl,150,1,Fully Meets,2
Dan,150,1,PIP,8
";

    fn columns() -> ColumnMapping {
        ColumnMapping::new("Salary", "GenderID", "PerformanceScore", "Absences")
    }

    fn records() -> RecordSet {
        RecordSet::from_csv_bytes(HR_CSV).unwrap()
    }

    #[test]
    fn test_run() {
        let run = Auditor::default()
            .run(&records(), &columns(), "hr.csv")
            .unwrap();

        assert_relative_eq!(run.outcome.disparities.demographic_parity_difference, 1.0);
        assert_eq!(run.report.assessment.verdict, BiasVerdict::Significant);
        assert_eq!(run.report.dataset, "hr.csv");

        assert_eq!(run.profiles.len(), 2);
        assert_eq!(run.profiles[0].category.as_str(), "Female");
        assert_relative_eq!(run.profiles[0].mean_salary, 50.0);
        assert_relative_eq!(run.profiles[1].mean_salary, 150.0);
    }

    #[test]
    fn test_bias_threshold_reaches_report() {
        let config = AuditConfig {
            bias_threshold: 0.25,
            ..AuditConfig::default()
        };
        let run = Auditor::new(config)
            .unwrap()
            .run(&records(), &columns(), "hr.csv")
            .unwrap();
        assert_relative_eq!(run.report.assessment.threshold, 0.25);
    }

    #[test]
    fn test_reject_policy() {
        let config = AuditConfig {
            undefined_rates: UndefinedRatePolicy::Reject,
            ..AuditConfig::default()
        };
        let err = Auditor::new(config)
            .unwrap()
            .run(&records(), &columns(), "hr.csv")
            .unwrap_err();
        assert!(matches!(
            err,
            AuditError::Metrics(MetricsError::UndefinedRate { .. })
        ));
    }

    #[test]
    fn test_missing_column_fails_before_audit() {
        let columns = ColumnMapping::new("Salary", "Gender", "PerformanceScore", "Absences");
        let err = Auditor::default()
            .run(&records(), &columns, "hr.csv")
            .unwrap_err();
        assert!(matches!(
            err,
            AuditError::Data(DataError::InvalidColumn { ref column, .. }) if column == "Gender"
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AuditConfig {
            bias_threshold: f64::NAN,
            ..AuditConfig::default()
        };
        assert!(matches!(
            Auditor::new(config),
            Err(AuditError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_run_csv_names_report_after_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(HR_CSV.as_bytes()).unwrap();

        let run = Auditor::default().run_csv(file.path(), &columns()).unwrap();
        let name = file.path().file_name().unwrap().to_string_lossy();
        assert_eq!(run.report.dataset, name);
        assert_eq!(run.report.records, 4);
    }
}
