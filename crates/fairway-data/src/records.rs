//! In-memory record set backed by a polars `DataFrame`.
//!
//! Every row shares the same column set. Columns are looked up by name and
//! read through typed accessors that coerce once and fail with
//! [`DataError::InvalidColumn`] instead of producing half-typed data.

use crate::error::{DataError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// An ordered set of rows addressed by column name.
#[derive(Debug, Clone)]
pub struct RecordSet {
    frame: DataFrame,
}

impl RecordSet {
    /// Wrap an existing DataFrame.
    pub const fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Read a headered CSV file, inferring column types from the whole file.
    ///
    /// A file that cannot be opened is [`DataError::Io`]; malformed content
    /// is [`DataError::Polars`].
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .into_reader_with_file_handle(file)
            .finish()?;

        debug!(
            path = %path.display(),
            rows = frame.height(),
            columns = frame.width(),
            "Loaded record set"
        );
        Ok(Self::new(frame))
    }

    /// Read headered CSV content held in memory.
    pub fn from_csv_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .into_reader_with_file_handle(Cursor::new(bytes.into()))
            .finish()?;
        Ok(Self::new(frame))
    }

    /// Borrow the underlying DataFrame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consume the record set and return the underlying DataFrame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Whether the record set has no rows.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Whether a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| DataError::invalid_column(name, "column not found"))
    }

    /// Whether the column holds integer or floating point values.
    pub fn is_numeric(&self, name: &str) -> Result<bool> {
        let dtype = self.column(name)?.dtype();
        Ok(dtype.is_integer() || dtype.is_float())
    }

    /// Read a column as `f64` values.
    ///
    /// Integer and float columns are cast directly. String columns are parsed
    /// strictly: a single unparseable value rejects the whole column. Nulls
    /// and `NaN` are both returned as missing values.
    pub fn numeric(&self, name: &str) -> Result<Float64Chunked> {
        let column = self.column(name)?;
        let series = column.as_materialized_series();
        let dtype = series.dtype();

        let values = if dtype.is_integer() || dtype.is_float() {
            series.cast(&DataType::Float64)?
        } else if matches!(dtype, DataType::String) {
            series.strict_cast(&DataType::Float64).map_err(|_| {
                DataError::invalid_column(name, "string values could not be parsed as numbers")
            })?
        } else {
            return Err(DataError::invalid_column(
                name,
                format!("expected a numeric column, found {dtype}"),
            ));
        };

        // NaN is a missing value, like null
        Ok(values
            .f64()?
            .into_iter()
            .map(|value| value.filter(|v| !v.is_nan()))
            .collect::<Float64Chunked>()
            .with_name(series.name().clone()))
    }

    /// Read a column as its string rendering, one entry per row.
    pub fn categorical(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self.column(name)?;
        let rendered = column.as_materialized_series().cast(&DataType::String)?;
        Ok(rendered
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_owned))
            .collect())
    }

    /// First `rows` rows of the record set.
    pub fn preview(&self, rows: usize) -> DataFrame {
        self.frame.head(Some(rows))
    }

    /// Return a copy with `column` added, replacing any column of the same name.
    ///
    /// The receiver is left untouched.
    pub fn with_column(&self, column: Column) -> Result<Self> {
        let mut frame = self.frame.clone();
        frame.with_column(column)?;
        Ok(Self::new(frame))
    }
}

impl From<DataFrame> for RecordSet {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}
