//! Group profiles
//!
//! Descriptive per-category summaries that sit next to the fairness metrics:
//! mean salary, performance-score counts, and the five-number summary of
//! absences. They are computed from the same normalized sensitive attribute
//! as the rates, so categories line up one to one.

use crate::error::Result;
use crate::sensitive::{Category, SensitiveAttribute};
use fairway_data::{ColumnMapping, RecordSet};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const GROUP: &str = "group";
const SALARY: &str = "salary";
const PERFORMANCE: &str = "performance";

/// Rendering of a missing performance score.
pub const MISSING_SCORE: &str = "(missing)";

/// Minimum, quartiles and maximum of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    /// Smallest value
    pub min: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Largest value
    pub max: f64,
}

impl FiveNumberSummary {
    /// Summarize `values`, ignoring `NaN`. Returns `None` for an empty sample.
    ///
    /// Quartiles interpolate linearly between closest ranks.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }

    /// Distance between the third and first quartile.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Linear-interpolated quantile of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Descriptive summary of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupProfile {
    /// Category
    pub category: Category,
    /// Rows in the category
    pub rows: usize,
    /// Mean salary, `NaN` when every salary is missing
    pub mean_salary: f64,
    /// Row count per performance score, keyed by score
    pub performance_counts: BTreeMap<String, usize>,
    /// Absences summary, `None` when every value is missing
    pub absences: Option<FiveNumberSummary>,
}

/// Profile every category of `attribute`, in category order.
pub fn profile_groups(
    records: &RecordSet,
    attribute: &SensitiveAttribute,
    mapping: &ColumnMapping,
) -> Result<Vec<GroupProfile>> {
    let salary = records.numeric(&mapping.salary)?;
    let absences = records.numeric(&mapping.absences)?;
    let performance = records.categorical(&mapping.performance)?;

    let frame = DataFrame::new(vec![
        attribute.to_column(GROUP),
        salary.into_series().with_name(SALARY.into()).into(),
        Column::new(PERFORMANCE.into(), performance),
    ])?;

    let salary_stats = frame
        .clone()
        .lazy()
        .group_by([col(GROUP)])
        .agg([
            len().cast(DataType::Int64).alias("rows"),
            col(SALARY).mean().alias("mean_salary"),
        ])
        .sort([GROUP], Default::default())
        .collect()?;

    let score_counts = frame
        .lazy()
        .group_by([col(GROUP), col(PERFORMANCE)])
        .agg([len().cast(DataType::Int64).alias("count")])
        .collect()?;

    let mut performance_counts: BTreeMap<&str, BTreeMap<String, usize>> = BTreeMap::new();
    {
        let groups = score_counts.column(GROUP)?.str()?;
        let scores = score_counts.column(PERFORMANCE)?.str()?;
        let counts = score_counts.column("count")?.i64()?;
        for idx in 0..score_counts.height() {
            let (Some(group), Some(count)) = (groups.get(idx), counts.get(idx)) else {
                continue;
            };
            let score = scores.get(idx).unwrap_or(MISSING_SCORE).to_string();
            performance_counts
                .entry(group)
                .or_default()
                .insert(score, usize::try_from(count).unwrap_or(0));
        }
    }

    let mut absence_values: BTreeMap<&Category, Vec<f64>> = BTreeMap::new();
    for (category, value) in attribute.values.iter().zip(absences.into_iter()) {
        let entry = absence_values.entry(category).or_default();
        if let Some(v) = value {
            entry.push(v);
        }
    }

    let groups = salary_stats.column(GROUP)?.str()?;
    let rows = salary_stats.column("rows")?.i64()?;
    let means = salary_stats.column("mean_salary")?.f64()?;

    let mut profiles = Vec::with_capacity(salary_stats.height());
    for idx in 0..salary_stats.height() {
        let Some(group) = groups.get(idx) else {
            continue;
        };
        let category = Category::from(group);
        let absences = absence_values
            .get(&category)
            .and_then(|values| FiveNumberSummary::from_values(values));

        profiles.push(GroupProfile {
            rows: rows
                .get(idx)
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(0),
            mean_salary: means.get(idx).unwrap_or(f64::NAN),
            performance_counts: performance_counts.remove(group).unwrap_or_default(),
            absences,
            category,
        });
    }

    Ok(profiles)
}
