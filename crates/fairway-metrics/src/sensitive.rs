//! Sensitive Attribute
//!
//! Maps an arbitrary two-valued column into a canonical two-category form.
//! Numeric columns have their two values renamed by ascending numeric order
//! (smaller to [`CanonicalLabels::lower`], larger to [`CanonicalLabels::upper`]).
//! Any other column passes through with its values rendered as strings.
//! Missing values count as a distinct value of their own.

use crate::error::{MetricsError, Result};
use derive_more::{Display, From, Into};
use fairway_data::RecordSet;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Rendering of a missing value in error reports.
const MISSING: &str = "null";

/// A sensitive-attribute category.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Create a category from its label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The category label.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Labels given to the two values of a numeric sensitive column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalLabels {
    /// Label for the numerically smaller value
    pub lower: String,
    /// Label for the numerically larger value
    pub upper: String,
}

impl Default for CanonicalLabels {
    fn default() -> Self {
        Self {
            lower: "Female".to_string(),
            upper: "Male".to_string(),
        }
    }
}

/// How the raw column values were turned into categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Normalization {
    /// Numeric values renamed by ascending order
    Numeric {
        /// Raw value mapped to the lower label
        lower: f64,
        /// Raw value mapped to the upper label
        upper: f64,
    },
    /// Values used as-is
    PassThrough,
}

/// A sensitive attribute with exactly two categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitiveAttribute {
    /// Source column
    pub column: String,
    /// The two categories. For numeric columns the lower-valued category comes
    /// first; otherwise categories are in lexicographic order.
    pub categories: [Category; 2],
    /// Category of every row
    pub values: Vec<Category>,
    /// How the categories were obtained
    pub normalization: Normalization,
}

impl SensitiveAttribute {
    /// Normalize `column` of `records` into two categories.
    ///
    /// Fails with [`MetricsError::NonBinaryAttribute`] when the column does not
    /// hold exactly two distinct values, and with
    /// [`MetricsError::InvalidColumn`] when it does not exist.
    pub fn normalize(records: &RecordSet, column: &str, labels: &CanonicalLabels) -> Result<Self> {
        let attribute = if records.is_numeric(column)? {
            Self::from_numeric(column, &records.numeric(column)?, labels)?
        } else {
            Self::from_categorical(column, records.categorical(column)?)?
        };

        debug!(
            column,
            first = %attribute.categories[0],
            second = %attribute.categories[1],
            normalization = ?attribute.normalization,
            "Normalized sensitive attribute"
        );
        Ok(attribute)
    }

    fn from_numeric(column: &str, values: &Float64Chunked, labels: &CanonicalLabels) -> Result<Self> {
        let mut distinct: Vec<f64> = values.into_iter().flatten().collect();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup_by(|a, b| a.total_cmp(b).is_eq());

        let has_missing = values.null_count() > 0;
        if distinct.len() != 2 || has_missing {
            let mut found: Vec<String> = distinct.iter().map(f64::to_string).collect();
            if has_missing {
                found.push(MISSING.to_string());
            }
            return Err(MetricsError::NonBinaryAttribute {
                column: column.to_string(),
                found,
            });
        }

        let (lower, upper) = (distinct[0], distinct[1]);
        let lower_label = Category::new(labels.lower.clone());
        let upper_label = Category::new(labels.upper.clone());

        let mapped = values
            .into_iter()
            .flatten()
            .map(|v| {
                if v == lower {
                    lower_label.clone()
                } else {
                    upper_label.clone()
                }
            })
            .collect();

        Ok(Self {
            column: column.to_string(),
            categories: [lower_label, upper_label],
            values: mapped,
            normalization: Normalization::Numeric { lower, upper },
        })
    }

    fn from_categorical(column: &str, values: Vec<Option<String>>) -> Result<Self> {
        let distinct: BTreeSet<&str> = values
            .iter()
            .map(|v| v.as_deref().unwrap_or(MISSING))
            .collect();
        let has_missing = values.iter().any(Option::is_none);
        let non_binary = |found: Vec<String>| MetricsError::NonBinaryAttribute {
            column: column.to_string(),
            found,
        };

        let found: Vec<String> = distinct.into_iter().map(str::to_owned).collect();
        if has_missing {
            return Err(non_binary(found));
        }
        let [first, second]: [String; 2] = found.try_into().map_err(non_binary)?;

        Ok(Self {
            column: column.to_string(),
            categories: [Category::new(first), Category::new(second)],
            values: values.into_iter().flatten().map(Category::from).collect(),
            normalization: Normalization::PassThrough,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the attribute covers no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of rows in `category`.
    pub fn count(&self, category: &Category) -> usize {
        self.values.iter().filter(|&v| v == category).count()
    }

    /// The normalized attribute as a string column named `name`.
    pub fn to_column(&self, name: &str) -> Column {
        let values: Vec<&str> = self.values.iter().map(Category::as_str).collect();
        Column::new(name.into(), values)
    }
}
