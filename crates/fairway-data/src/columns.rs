//! Column selections for an audit.
//!
//! An audit reads four columns by name. They are validated once, at the
//! boundary, so that downstream computation can assume they exist and carry
//! the right kind of values.

use crate::error::{DataError, Result};
use crate::records::RecordSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a selected column plays in an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Continuous outcome thresholded into the binary label
    Salary,
    /// Two-valued sensitive attribute
    Gender,
    /// Categorical performance score, profiled per group
    Performance,
    /// Numeric absence count, profiled per group
    Absences,
}

impl ColumnRole {
    /// All roles, in selection order.
    pub const fn all() -> [Self; 4] {
        [Self::Salary, Self::Gender, Self::Performance, Self::Absences]
    }

    /// Human-readable role name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Gender => "gender",
            Self::Performance => "performance",
            Self::Absences => "absences",
        }
    }

    /// Whether the column must be readable as numbers.
    pub const fn requires_numeric(&self) -> bool {
        matches!(self, Self::Salary | Self::Absences)
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names of the columns selected for each [`ColumnRole`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Salary column (numeric)
    pub salary: String,
    /// Gender column (binary)
    pub gender: String,
    /// Performance score column (categorical)
    pub performance: String,
    /// Absences column (numeric)
    pub absences: String,
}

impl ColumnMapping {
    /// Create a new column mapping.
    pub fn new(
        salary: impl Into<String>,
        gender: impl Into<String>,
        performance: impl Into<String>,
        absences: impl Into<String>,
    ) -> Self {
        Self {
            salary: salary.into(),
            gender: gender.into(),
            performance: performance.into(),
            absences: absences.into(),
        }
    }

    /// Column selected for `role`.
    pub fn column(&self, role: ColumnRole) -> &str {
        match role {
            ColumnRole::Salary => &self.salary,
            ColumnRole::Gender => &self.gender,
            ColumnRole::Performance => &self.performance,
            ColumnRole::Absences => &self.absences,
        }
    }

    /// Check every selection against `records`.
    ///
    /// Fails on the first empty selection, missing column, or numeric role
    /// whose column cannot be read as numbers, and on an empty record set.
    pub fn validate(&self, records: &RecordSet) -> Result<()> {
        for role in ColumnRole::all() {
            let name = self.column(role);
            if name.trim().is_empty() {
                return Err(DataError::UnselectedColumn {
                    role: role.to_string(),
                });
            }

            if role.requires_numeric() {
                records.numeric(name)?;
            } else {
                records.column(name)?;
            }
        }

        if records.is_empty() {
            return Err(DataError::EmptyRecordSet);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn records() -> RecordSet {
        RecordSet::new(
            df!(
                "Salary" => [62_506.0, 104_437.0, 64_955.0],
                "Sex" => ["M", "F", "F"],
                "PerformanceScore" => ["Exceeds", "Fully Meets", "Fully Meets"],
                "Absences" => [1i64, 17, 3],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_valid_mapping() {
        let mapping = ColumnMapping::new("Salary", "Sex", "PerformanceScore", "Absences");
        assert!(mapping.validate(&records()).is_ok());
    }

    #[test]
    fn test_unselected_column() {
        let mapping = ColumnMapping::new("Salary", "", "PerformanceScore", "Absences");
        let err = mapping.validate(&records()).unwrap_err();
        assert!(matches!(err, DataError::UnselectedColumn { ref role } if role == "gender"));
    }

    #[test]
    fn test_missing_column() {
        let mapping = ColumnMapping::new("Salary", "Sex", "Rating", "Absences");
        let err = mapping.validate(&records()).unwrap_err();
        assert!(matches!(err, DataError::InvalidColumn { ref column, .. } if column == "Rating"));
    }

    #[test]
    fn test_numeric_role_rejects_text() {
        let mapping = ColumnMapping::new("Sex", "Sex", "PerformanceScore", "Absences");
        let err = mapping.validate(&records()).unwrap_err();
        assert!(matches!(err, DataError::InvalidColumn { ref column, .. } if column == "Sex"));
    }

    #[test]
    fn test_empty_record_set() {
        let empty = RecordSet::new(records().frame().head(Some(0)));
        let mapping = ColumnMapping::new("Salary", "Sex", "PerformanceScore", "Absences");
        assert!(matches!(
            mapping.validate(&empty),
            Err(DataError::EmptyRecordSet)
        ));
    }

    #[test]
    fn test_role_metadata() {
        assert_eq!(ColumnRole::all().len(), 4);
        assert!(ColumnRole::Salary.requires_numeric());
        assert!(!ColumnRole::Performance.requires_numeric());
        assert_eq!(ColumnRole::Absences.to_string(), "absences");
    }
}
