//! Disparity summaries
//!
//! Reduces a [`GroupMetricsTable`] to two scalars:
//!
//! - demographic parity difference: the selection-rate gap between groups,
//! - equalized odds difference: the larger of the true-positive-rate gap and
//!   the false-positive-rate gap.
//!
//! A gap is `max - min` over groups, which is `|A - B|` for the two-group
//! tables the pipeline produces. Any `NaN` rate makes the gaps it feeds `NaN`.

use crate::error::{MetricsError, Result};
use crate::group::{GroupMetricsTable, RateMetric, UndefinedRate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do when a rate has a zero denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedRatePolicy {
    /// Carry `NaN` through the disparities and list the undefined rates
    #[default]
    Propagate,
    /// Fail with [`MetricsError::UndefinedRate`] on the first undefined rate
    Reject,
}

impl fmt::Display for UndefinedRatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Propagate => f.write_str("propagate"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Scalar fairness summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisparitySummary {
    /// Selection-rate gap between groups
    pub demographic_parity_difference: f64,
    /// Larger of the TPR gap and the FPR gap
    pub equalized_odds_difference: f64,
    /// Rates that were undefined when the summary was computed
    pub undefined_rates: Vec<UndefinedRate>,
}

impl DisparitySummary {
    /// Compute both disparities from `table`.
    ///
    /// Fails with [`MetricsError::InsufficientGroups`] when the table has fewer
    /// than two groups, and under [`UndefinedRatePolicy::Reject`] with
    /// [`MetricsError::UndefinedRate`] when any rate is undefined.
    pub fn from_table(table: &GroupMetricsTable, policy: UndefinedRatePolicy) -> Result<Self> {
        let undefined_rates = table.undefined_rates();
        if let (UndefinedRatePolicy::Reject, Some(first)) = (policy, undefined_rates.first()) {
            return Err(first.clone().into());
        }

        Ok(Self {
            demographic_parity_difference: demographic_parity_difference(table)?,
            equalized_odds_difference: equalized_odds_difference(table)?,
            undefined_rates,
        })
    }

    /// Whether both disparities are defined numbers.
    pub fn is_defined(&self) -> bool {
        !self.demographic_parity_difference.is_nan() && !self.equalized_odds_difference.is_nan()
    }

    /// The larger defined disparity, if any.
    pub fn max_defined(&self) -> Option<f64> {
        [
            self.demographic_parity_difference,
            self.equalized_odds_difference,
        ]
        .into_iter()
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
    }
}

/// Gap in `metric` between the highest and lowest group.
pub fn between_groups(table: &GroupMetricsTable, metric: RateMetric) -> Result<f64> {
    if table.len() < 2 {
        return Err(MetricsError::InsufficientGroups { found: table.len() });
    }

    let rates = table.rates(metric);
    if rates.iter().any(|r| r.is_nan()) {
        return Ok(f64::NAN);
    }

    let max = rates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = rates.iter().copied().fold(f64::INFINITY, f64::min);
    Ok(max - min)
}

/// Selection-rate gap between groups.
pub fn demographic_parity_difference(table: &GroupMetricsTable) -> Result<f64> {
    between_groups(table, RateMetric::SelectionRate)
}

/// Larger of the true-positive-rate and false-positive-rate gaps.
///
/// `NaN` if either gap is `NaN`.
pub fn equalized_odds_difference(table: &GroupMetricsTable) -> Result<f64> {
    let tpr_gap = between_groups(table, RateMetric::TruePositiveRate)?;
    let fpr_gap = between_groups(table, RateMetric::FalsePositiveRate)?;

    if tpr_gap.is_nan() || fpr_gap.is_nan() {
        Ok(f64::NAN)
    } else {
        Ok(tpr_gap.max(fpr_gap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{ConfusionCounts, GroupMetrics};
    use crate::sensitive::Category;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn group(
        category: &str,
        rows: usize,
        predicted_positive: usize,
        actual_positive: usize,
        true_positive: usize,
    ) -> GroupMetrics {
        GroupMetrics::from_counts(
            Category::from(category),
            ConfusionCounts {
                rows,
                predicted_positive,
                actual_positive,
                true_positive,
                false_positive: predicted_positive - true_positive,
            },
        )
    }

    #[test]
    fn test_two_group_disparities() {
        // a: sel 0.5, tpr 1.0, fpr 0.0 / b: sel 0.25, tpr 0.5, fpr 0.0
        let table = GroupMetricsTable::new(vec![group("a", 4, 2, 2, 2), group("b", 4, 1, 2, 1)]);
        let summary = DisparitySummary::from_table(&table, UndefinedRatePolicy::Propagate).unwrap();

        assert_relative_eq!(summary.demographic_parity_difference, 0.25);
        assert_relative_eq!(summary.equalized_odds_difference, 0.5);
        assert!(summary.is_defined());
        assert!(summary.undefined_rates.is_empty());
    }

    #[test]
    fn test_fpr_gap_can_dominate() {
        // a: fpr 0.5 / b: fpr 0.0, equal tpr
        let table = GroupMetricsTable::new(vec![group("a", 4, 2, 2, 1), group("b", 4, 1, 2, 1)]);
        assert_relative_eq!(equalized_odds_difference(&table).unwrap(), 0.5);
    }

    #[test]
    fn test_identical_groups_are_zero() {
        let table = GroupMetricsTable::new(vec![group("a", 6, 3, 3, 2), group("b", 6, 3, 3, 2)]);
        let summary = DisparitySummary::from_table(&table, UndefinedRatePolicy::Propagate).unwrap();
        assert_eq!(summary.demographic_parity_difference, 0.0);
        assert_eq!(summary.equalized_odds_difference, 0.0);
    }

    #[test]
    fn test_order_of_groups_does_not_matter() {
        let forward = GroupMetricsTable::new(vec![group("a", 5, 1, 2, 1), group("b", 3, 3, 1, 1)]);
        let backward = GroupMetricsTable::new(vec![group("b", 3, 3, 1, 1), group("a", 5, 1, 2, 1)]);
        assert_eq!(
            DisparitySummary::from_table(&forward, UndefinedRatePolicy::Propagate).unwrap(),
            DisparitySummary::from_table(&backward, UndefinedRatePolicy::Propagate).unwrap()
        );
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![group("a", 2, 1, 1, 1)])]
    fn test_insufficient_groups(#[case] groups: Vec<GroupMetrics>) {
        let found = groups.len();
        let table = GroupMetricsTable::new(groups);
        let err = DisparitySummary::from_table(&table, UndefinedRatePolicy::Propagate).unwrap_err();
        assert!(matches!(err, MetricsError::InsufficientGroups { found: f } if f == found));
    }

    #[test]
    fn test_undefined_rate_propagates_as_nan() {
        // b has no truth-1 rows: tpr undefined
        let table = GroupMetricsTable::new(vec![group("a", 4, 2, 2, 2), group("b", 4, 0, 0, 0)]);
        let summary = DisparitySummary::from_table(&table, UndefinedRatePolicy::Propagate).unwrap();

        assert_relative_eq!(summary.demographic_parity_difference, 0.5);
        assert!(summary.equalized_odds_difference.is_nan());
        assert!(!summary.is_defined());
        assert_eq!(summary.max_defined(), Some(0.5));
        assert_eq!(summary.undefined_rates.len(), 1);
        assert_eq!(summary.undefined_rates[0].metric, RateMetric::TruePositiveRate);
    }

    #[test]
    fn test_undefined_rate_rejected() {
        let table = GroupMetricsTable::new(vec![group("a", 4, 2, 2, 2), group("b", 4, 0, 0, 0)]);
        let err = DisparitySummary::from_table(&table, UndefinedRatePolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            MetricsError::UndefinedRate { ref category, metric: RateMetric::TruePositiveRate }
                if category == "b"
        ));
    }

    #[test]
    fn test_more_than_two_groups_use_extremes() {
        let table = GroupMetricsTable::new(vec![
            group("a", 4, 1, 1, 1),
            group("b", 4, 2, 2, 2),
            group("c", 4, 4, 4, 4),
        ]);
        assert_relative_eq!(demographic_parity_difference(&table).unwrap(), 0.75);
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(UndefinedRatePolicy::default().to_string(), "propagate");
        assert_eq!(UndefinedRatePolicy::Reject.to_string(), "reject");
    }
}
