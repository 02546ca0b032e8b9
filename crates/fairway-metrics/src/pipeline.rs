//! Audit pipeline
//!
//! `records -> labelled records -> group metrics -> disparities`, as a single
//! pure function. Nothing is cached between calls: changing the selected
//! columns means calling [`audit`] again.
//!
//! The prediction fed to the aggregator is the derived label itself. The audit
//! looks at how the actual outcome is distributed across groups; there is no
//! model whose predictions could differ from it.

use crate::disparity::{DisparitySummary, UndefinedRatePolicy};
use crate::error::{MetricsError, Result};
use crate::group::GroupMetricsTable;
use crate::label::{DEFAULT_LABEL_COLUMN, OutcomeLabel};
use crate::sensitive::{CanonicalLabels, SensitiveAttribute};
use fairway_data::RecordSet;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Knobs for [`audit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Name of the derived label column
    pub label_column: String,
    /// Labels for the two values of a numeric sensitive column
    pub canonical_labels: CanonicalLabels,
    /// Handling of zero-denominator rates
    pub undefined_rates: UndefinedRatePolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            canonical_labels: CanonicalLabels::default(),
            undefined_rates: UndefinedRatePolicy::default(),
        }
    }
}

/// Everything an audit computes.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    /// Input columns, the normalized sensitive column, and the label column
    pub labelled: RecordSet,
    /// Derived outcome label
    pub label: OutcomeLabel,
    /// Normalized sensitive attribute
    pub attribute: SensitiveAttribute,
    /// Per-category rates
    pub group_metrics: GroupMetricsTable,
    /// Scalar disparities
    pub disparities: DisparitySummary,
}

/// Run the full audit on `records`.
///
/// `outcome_column` is thresholded at its median into the label;
/// `sensitive_column` must hold exactly two distinct values. The sensitive
/// attribute is checked before any rate is computed.
pub fn audit(
    records: &RecordSet,
    outcome_column: &str,
    sensitive_column: &str,
    options: &PipelineOptions,
) -> Result<AuditOutcome> {
    if options.label_column == outcome_column || options.label_column == sensitive_column {
        return Err(MetricsError::invalid_column(
            options.label_column.as_str(),
            "label column would overwrite an input column",
        ));
    }

    let attribute =
        SensitiveAttribute::normalize(records, sensitive_column, &options.canonical_labels)?;
    let label = OutcomeLabel::derive(records, outcome_column)?;

    let prediction = &label.values;
    let group_metrics = GroupMetricsTable::aggregate(&label.values, prediction, &attribute)?;
    let disparities = DisparitySummary::from_table(&group_metrics, options.undefined_rates)?;

    let labelled = records
        .with_column(attribute.to_column(sensitive_column))?
        .with_column(label.to_column(&options.label_column))?;

    info!(
        rows = records.height(),
        threshold = label.threshold,
        demographic_parity_difference = disparities.demographic_parity_difference,
        equalized_odds_difference = disparities.equalized_odds_difference,
        undefined_rates = disparities.undefined_rates.len(),
        "Audit complete"
    );

    Ok(AuditOutcome {
        labelled,
        label,
        attribute,
        group_metrics,
        disparities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensitive::Category;
    use approx::assert_relative_eq;
    use polars::prelude::*;

    #[test]
    fn test_four_row_scenario() {
        let records = RecordSet::new(
            df!(
                "Salary" => [50.0, 50.0, 150.0, 150.0],
                "Sex" => ["F", "F", "M", "M"],
            )
            .unwrap(),
        );
        let outcome = audit(&records, "Salary", "Sex", &PipelineOptions::default()).unwrap();

        assert_relative_eq!(outcome.label.threshold, 100.0);
        assert_eq!(outcome.label.values, vec![false, false, true, true]);

        let female = outcome.group_metrics.get(&Category::from("F")).unwrap();
        let male = outcome.group_metrics.get(&Category::from("M")).unwrap();
        assert_relative_eq!(female.selection_rate, 0.0);
        assert_relative_eq!(male.selection_rate, 1.0);
        assert_relative_eq!(outcome.disparities.demographic_parity_difference, 1.0);
    }

    #[test]
    fn test_labelled_record_set_columns() {
        let records = RecordSet::new(
            df!(
                "Salary" => [1.0, 2.0, 3.0, 4.0],
                "GenderID" => [0i64, 1, 0, 1],
            )
            .unwrap(),
        );
        let outcome = audit(&records, "Salary", "GenderID", &PipelineOptions::default()).unwrap();

        assert_eq!(
            outcome.labelled.column_names(),
            vec!["Salary", "GenderID", "HighSalary"]
        );
        assert_eq!(
            outcome.labelled.categorical("GenderID").unwrap(),
            vec![
                Some("Female".to_string()),
                Some("Male".to_string()),
                Some("Female".to_string()),
                Some("Male".to_string())
            ]
        );
        assert_eq!(records.column_names(), vec!["Salary", "GenderID"]);
    }

    #[test]
    fn test_non_binary_stops_before_aggregation() {
        let records = RecordSet::new(
            df!(
                "Salary" => ["not", "a", "number"],
                "Sex" => ["F", "M", "X"],
            )
            .unwrap(),
        );
        let err = audit(&records, "Salary", "Sex", &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, MetricsError::NonBinaryAttribute { .. }));
    }

    #[test]
    fn test_label_column_collision() {
        let records = RecordSet::new(df!("Salary" => [1.0, 2.0], "Sex" => ["F", "M"]).unwrap());
        let options = PipelineOptions {
            label_column: "Salary".to_string(),
            ..PipelineOptions::default()
        };
        let err = audit(&records, "Salary", "Sex", &options).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidColumn { .. }));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: PipelineOptions =
            serde_json::from_str(r#"{"undefined_rates": "reject"}"#).unwrap();
        assert_eq!(options.undefined_rates, UndefinedRatePolicy::Reject);
        assert_eq!(options.label_column, DEFAULT_LABEL_COLUMN);
    }
}
