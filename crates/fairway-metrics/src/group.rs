//! Group Metrics
//!
//! Partitions rows by sensitive-attribute category and computes, per category:
//!
//! - selection rate: share of rows predicted `1`,
//! - true-positive rate: share of truth-`1` rows also predicted `1`,
//! - false-positive rate: share of truth-`0` rows predicted `1`.
//!
//! A rate whose denominator is zero is `NaN` and is listed by
//! [`GroupMetricsTable::undefined_rates`]; it is never reported as `0.0`.
//! Groups are sorted by category so the table does not depend on row order.

use crate::error::{MetricsError, Result};
use crate::sensitive::{Category, SensitiveAttribute};
use derive_more::Display;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

const GROUP: &str = "group";
const TRUTH: &str = "truth";
const PREDICTION: &str = "prediction";

/// The per-group rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateMetric {
    /// P(prediction = 1)
    #[display("selection_rate")]
    SelectionRate,
    /// P(prediction = 1 | truth = 1)
    #[display("true_positive_rate")]
    TruePositiveRate,
    /// P(prediction = 1 | truth = 0)
    #[display("false_positive_rate")]
    FalsePositiveRate,
}

impl RateMetric {
    /// All rates, in table column order.
    pub const fn all() -> [Self; 3] {
        [
            Self::SelectionRate,
            Self::TruePositiveRate,
            Self::FalsePositiveRate,
        ]
    }

    /// Short column header.
    pub const fn header(&self) -> &'static str {
        match self {
            Self::SelectionRate => "Selection Rate",
            Self::TruePositiveRate => "TPR",
            Self::FalsePositiveRate => "FPR",
        }
    }
}

/// Confusion counts for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionCounts {
    /// Rows in the group
    pub rows: usize,
    /// Rows predicted `1`
    pub predicted_positive: usize,
    /// Rows with truth `1`
    pub actual_positive: usize,
    /// Rows predicted `1` with truth `1`
    pub true_positive: usize,
    /// Rows predicted `1` with truth `0`
    pub false_positive: usize,
}

impl ConfusionCounts {
    /// Rows with truth `0`.
    pub const fn actual_negative(&self) -> usize {
        self.rows - self.actual_positive
    }
}

/// Ratio of two counts, `NaN` when the denominator is zero.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        f64::NAN
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Rates for one sensitive-attribute category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMetrics {
    /// Category
    pub category: Category,
    /// Underlying counts
    pub counts: ConfusionCounts,
    /// Selection rate
    pub selection_rate: f64,
    /// True-positive rate, `NaN` when the group has no truth-`1` rows
    pub true_positive_rate: f64,
    /// False-positive rate, `NaN` when the group has no truth-`0` rows
    pub false_positive_rate: f64,
}

impl GroupMetrics {
    /// Compute the rates from confusion counts.
    pub fn from_counts(category: Category, counts: ConfusionCounts) -> Self {
        Self {
            category,
            counts,
            selection_rate: ratio(counts.predicted_positive, counts.rows),
            true_positive_rate: ratio(counts.true_positive, counts.actual_positive),
            false_positive_rate: ratio(counts.false_positive, counts.actual_negative()),
        }
    }

    /// Value of `metric`.
    pub const fn rate(&self, metric: RateMetric) -> f64 {
        match metric {
            RateMetric::SelectionRate => self.selection_rate,
            RateMetric::TruePositiveRate => self.true_positive_rate,
            RateMetric::FalsePositiveRate => self.false_positive_rate,
        }
    }
}

/// A rate that could not be computed for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndefinedRate {
    /// Category with the zero denominator
    pub category: Category,
    /// Affected rate
    pub metric: RateMetric,
}

impl From<UndefinedRate> for MetricsError {
    fn from(undefined: UndefinedRate) -> Self {
        Self::UndefinedRate {
            category: undefined.category.to_string(),
            metric: undefined.metric,
        }
    }
}

/// Rates for every category, sorted by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMetricsTable {
    groups: Vec<GroupMetrics>,
}

impl GroupMetricsTable {
    /// Build a table, sorting groups by category.
    pub fn new(mut groups: Vec<GroupMetrics>) -> Self {
        groups.sort_by(|a, b| a.category.cmp(&b.category));
        Self { groups }
    }

    /// Compute the table from per-row truth, prediction and attribute.
    ///
    /// All three inputs must have the same number of rows.
    pub fn aggregate(
        truth: &[bool],
        prediction: &[bool],
        attribute: &SensitiveAttribute,
    ) -> Result<Self> {
        check_len("prediction", truth.len(), prediction.len())?;
        check_len("sensitive attribute", truth.len(), attribute.len())?;

        let as_int = |values: &[bool]| values.iter().map(|&v| i32::from(v)).collect::<Vec<i32>>();
        let frame = DataFrame::new(vec![
            attribute.to_column(GROUP),
            Column::new(TRUTH.into(), as_int(truth)),
            Column::new(PREDICTION.into(), as_int(prediction)),
        ])?;

        let counted = frame
            .lazy()
            .group_by([col(GROUP)])
            .agg([
                len().cast(DataType::Int64).alias("rows"),
                col(PREDICTION)
                    .sum()
                    .cast(DataType::Int64)
                    .alias("predicted_positive"),
                col(TRUTH).sum().cast(DataType::Int64).alias("actual_positive"),
                (col(PREDICTION) * col(TRUTH))
                    .sum()
                    .cast(DataType::Int64)
                    .alias("true_positive"),
                (col(PREDICTION) * (lit(1) - col(TRUTH)))
                    .sum()
                    .cast(DataType::Int64)
                    .alias("false_positive"),
            ])
            .sort([GROUP], Default::default())
            .collect()?;

        let categories = counted.column(GROUP)?.str()?;
        let rows = counted.column("rows")?.i64()?;
        let predicted_positive = counted.column("predicted_positive")?.i64()?;
        let actual_positive = counted.column("actual_positive")?.i64()?;
        let true_positive = counted.column("true_positive")?.i64()?;
        let false_positive = counted.column("false_positive")?.i64()?;

        let mut groups = Vec::with_capacity(counted.height());
        for idx in 0..counted.height() {
            let category = categories.get(idx).ok_or(MetricsError::InvalidAggregate {
                column: GROUP,
                row: idx,
            })?;
            let counts = ConfusionCounts {
                rows: count_at(rows, "rows", idx)?,
                predicted_positive: count_at(predicted_positive, "predicted_positive", idx)?,
                actual_positive: count_at(actual_positive, "actual_positive", idx)?,
                true_positive: count_at(true_positive, "true_positive", idx)?,
                false_positive: count_at(false_positive, "false_positive", idx)?,
            };
            groups.push(GroupMetrics::from_counts(Category::from(category), counts));
        }

        let table = Self::new(groups);
        for undefined in table.undefined_rates() {
            warn!(
                category = %undefined.category,
                metric = %undefined.metric,
                "Rate has a zero denominator"
            );
        }
        Ok(table)
    }

    /// Groups in category order.
    pub fn groups(&self) -> &[GroupMetrics] {
        &self.groups
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the table has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Metrics for `category`, if present.
    pub fn get(&self, category: &Category) -> Option<&GroupMetrics> {
        self.groups.iter().find(|g| &g.category == category)
    }

    /// Values of `metric` in category order.
    pub fn rates(&self, metric: RateMetric) -> Vec<f64> {
        self.groups.iter().map(|g| g.rate(metric)).collect()
    }

    /// Every (category, rate) pair whose denominator was zero.
    pub fn undefined_rates(&self) -> Vec<UndefinedRate> {
        self.groups
            .iter()
            .flat_map(|group| {
                RateMetric::all()
                    .into_iter()
                    .filter(|&metric| group.rate(metric).is_nan())
                    .map(|metric| UndefinedRate {
                        category: group.category.clone(),
                        metric,
                    })
            })
            .collect()
    }

    /// Whether every rate of every group is defined.
    pub fn is_fully_defined(&self) -> bool {
        self.undefined_rates().is_empty()
    }

    /// The table as a DataFrame with one row per category.
    pub fn to_frame(&self, category_column: &str) -> PolarsResult<DataFrame> {
        let categories: Vec<&str> = self.groups.iter().map(|g| g.category.as_str()).collect();
        let mut columns = vec![Column::new(category_column.into(), categories)];
        for metric in RateMetric::all() {
            columns.push(Column::new(metric.header().into(), self.rates(metric)));
        }
        DataFrame::new(columns)
    }
}

/// Non-negative count at `row` of an aggregated column.
fn count_at(values: &Int64Chunked, column: &'static str, row: usize) -> Result<usize> {
    values
        .get(row)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or(MetricsError::InvalidAggregate { column, row })
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(MetricsError::LengthMismatch {
            what,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensitive::CanonicalLabels;
    use approx::assert_relative_eq;
    use fairway_data::RecordSet;
    use rstest::rstest;

    fn attribute(values: &[&str]) -> SensitiveAttribute {
        let records = RecordSet::new(df!("g" => values).unwrap());
        SensitiveAttribute::normalize(&records, "g", &CanonicalLabels::default()).unwrap()
    }

    #[test]
    fn test_rates_per_group() {
        let truth = [true, false, true, true, false, false];
        let prediction = [true, true, false, true, false, true];
        let groups = attribute(&["a", "a", "a", "b", "b", "b"]);

        let table = GroupMetricsTable::aggregate(&truth, &prediction, &groups).unwrap();
        assert_eq!(table.len(), 2);

        let a = table.get(&Category::from("a")).unwrap();
        assert_relative_eq!(a.selection_rate, 2.0 / 3.0);
        assert_relative_eq!(a.true_positive_rate, 0.5);
        assert_relative_eq!(a.false_positive_rate, 1.0);

        let b = table.get(&Category::from("b")).unwrap();
        assert_eq!(
            b.counts,
            ConfusionCounts {
                rows: 3,
                predicted_positive: 2,
                actual_positive: 1,
                true_positive: 1,
                false_positive: 1,
            }
        );
        assert_relative_eq!(b.true_positive_rate, 1.0);
        assert_relative_eq!(b.false_positive_rate, 0.5);
        assert!(table.is_fully_defined());
    }

    #[test]
    fn test_groups_sorted_by_category() {
        let truth = [true, false, true];
        let groups = attribute(&["zeta", "alpha", "zeta"]);
        let table = GroupMetricsTable::aggregate(&truth, &truth, &groups).unwrap();

        let order: Vec<&str> = table.groups().iter().map(|g| g.category.as_str()).collect();
        assert_eq!(order, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_zero_denominator_is_flagged_not_zero() {
        let truth = [false, false, true, false];
        let groups = attribute(&["F", "F", "M", "M"]);
        let table = GroupMetricsTable::aggregate(&truth, &truth, &groups).unwrap();

        let female = table.get(&Category::from("F")).unwrap();
        assert!(female.true_positive_rate.is_nan());
        assert_relative_eq!(female.false_positive_rate, 0.0);

        assert_eq!(
            table.undefined_rates(),
            vec![UndefinedRate {
                category: Category::from("F"),
                metric: RateMetric::TruePositiveRate,
            }]
        );
        assert!(!table.is_fully_defined());
    }

    #[rstest]
    #[case(Some(3), Some(3))]
    #[case(Some(0), Some(0))]
    #[case(None, None)]
    #[case(Some(-1), None)]
    fn test_count_at(#[case] stored: Option<i64>, #[case] expected: Option<usize>) {
        let values = Int64Chunked::from_slice_options("rows".into(), &[stored]);
        match (count_at(&values, "rows", 0), expected) {
            (Ok(count), Some(expected)) => assert_eq!(count, expected),
            (Err(MetricsError::InvalidAggregate { column, row }), None) => {
                assert_eq!(column, "rows");
                assert_eq!(row, 0);
            }
            (other, _) => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_length_mismatch() {
        let groups = attribute(&["F", "M"]);
        let err = GroupMetricsTable::aggregate(&[true], &[true], &groups).unwrap_err();
        assert!(matches!(
            err,
            MetricsError::LengthMismatch {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_to_frame() {
        let truth = [true, false];
        let groups = attribute(&["F", "M"]);
        let table = GroupMetricsTable::aggregate(&truth, &truth, &groups).unwrap();
        let frame = table.to_frame("Sex").unwrap();

        assert_eq!(frame.shape(), (2, 4));
        let selection: Vec<Option<f64>> =
            frame.column("Selection Rate").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(selection, vec![Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_undefined_rate_converts_to_error() {
        let err: MetricsError = UndefinedRate {
            category: Category::from("M"),
            metric: RateMetric::FalsePositiveRate,
        }
        .into();
        assert!(matches!(
            err,
            MetricsError::UndefinedRate {
                metric: RateMetric::FalsePositiveRate,
                ..
            }
        ));
    }
}
