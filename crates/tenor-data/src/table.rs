//! Table types shared by the pipeline.
//!
//! [`TimeSeriesTable`] holds date-indexed series in a polars `DataFrame`: a
//! `date` column followed by one `Float64` column per series. [`LabeledMatrix`]
//! holds cross-sectional data such as key-rate sensitivities, keyed by asset
//! identifier (rows) and tenor (columns).

use chrono::{Duration, NaiveDate};
use ndarray::Array2;
use polars::prelude::*;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashSet;
use thiserror::Error;

/// Name of the date index column in every [`TimeSeriesTable`].
pub const DATE_COLUMN: &str = "date";

/// Errors raised while building or reading tables.
#[derive(Debug, Error)]
pub enum TableError {
    /// Labels do not match the value matrix
    #[error("Shape mismatch: {rows} row labels and {columns} column labels for shape {shape:?}")]
    Shape {
        /// Number of row labels
        rows: usize,
        /// Number of column labels
        columns: usize,
        /// Shape of the values
        shape: (usize, usize),
    },

    /// A value column does not match the date index length
    #[error("Column {name} has {actual} values, expected {expected}")]
    Length {
        /// Column name
        name: String,
        /// Number of dates
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// The same label appears twice on one axis
    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    /// The frame has no leading `date` column
    #[error("Missing leading `date` column")]
    MissingDateColumn,

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Convert a calendar date to days since 1970-01-01, the physical
/// representation of polars `Date`.
pub fn to_epoch_days(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

/// Inverse of [`to_epoch_days`].
pub fn from_epoch_days(days: i32) -> NaiveDate {
    NaiveDate::default() + Duration::days(i64::from(days))
}

fn ensure_unique<'a>(labels: impl IntoIterator<Item = &'a str>) -> Result<(), TableError> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(TableError::DuplicateLabel(label.to_string()));
        }
    }
    Ok(())
}

/// Date-indexed table of `f64` series.
///
/// Rows are kept in whatever order the producer chose; derived return tables
/// are stored newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    frame: DataFrame,
}

impl TimeSeriesTable {
    /// Build a table from a date index and named value columns.
    ///
    /// Missing observations are `None` and become nulls.
    pub fn new(
        dates: &[NaiveDate],
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, TableError> {
        ensure_unique(
            std::iter::once(DATE_COLUMN).chain(columns.iter().map(|(name, _)| name.as_str())),
        )?;

        let days: Vec<i32> = dates.iter().copied().map(to_epoch_days).collect();
        let mut frame_columns =
            vec![Column::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?];

        for (name, values) in columns {
            if values.len() != dates.len() {
                return Err(TableError::Length {
                    name,
                    expected: dates.len(),
                    actual: values.len(),
                });
            }
            frame_columns.push(Column::new(name.as_str().into(), values));
        }

        Ok(Self {
            frame: DataFrame::new(frame_columns)?,
        })
    }

    /// Wrap an existing frame.
    ///
    /// The first column must be `date`; every other column is cast to `Float64`.
    pub fn from_frame(frame: DataFrame) -> Result<Self, TableError> {
        let mut columns = frame.get_columns().iter();
        match columns.next() {
            Some(first) if first.name().as_str() == DATE_COLUMN => {}
            _ => return Err(TableError::MissingDateColumn),
        }

        let mut normalized = vec![frame.column(DATE_COLUMN)?.cast(&DataType::Date)?];
        for column in columns {
            normalized.push(column.cast(&DataType::Float64)?);
        }

        Ok(Self {
            frame: DataFrame::new(normalized)?,
        })
    }

    /// Lazy view of the frame for further transformation.
    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    /// Number of dates.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    /// Names of the value columns, in order, excluding `date`.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names_str()
            .into_iter()
            .skip(1)
            .map(str::to_string)
            .collect()
    }

    /// Whether a value column exists.
    pub fn has_column(&self, name: &str) -> bool {
        name != DATE_COLUMN && self.frame.column(name).is_ok()
    }

    /// Date index in row order.
    pub fn dates(&self) -> Result<Vec<NaiveDate>, TableError> {
        let days = self.frame.column(DATE_COLUMN)?.cast(&DataType::Int32)?;
        Ok(days
            .i32()?
            .into_iter()
            .flatten()
            .map(from_epoch_days)
            .collect())
    }

    /// Values of one column in row order.
    pub fn values(&self, name: &str) -> Result<Vec<Option<f64>>, TableError> {
        Ok(self.frame.column(name)?.f64()?.into_iter().collect())
    }

    /// Dense `(dates x columns)` matrix of the value columns; nulls become NaN.
    pub fn to_matrix(&self) -> Result<Array2<f64>, TableError> {
        let names = self.column_names();
        let mut matrix = Array2::<f64>::from_elem((self.height(), names.len()), f64::NAN);
        for (j, name) in names.iter().enumerate() {
            for (i, value) in self.values(name)?.into_iter().enumerate() {
                if let Some(v) = value {
                    matrix[[i, j]] = v;
                }
            }
        }
        Ok(matrix)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Self {
        Self {
            frame: self.frame.head(Some(n)),
        }
    }

    /// Earliest and latest date, `None` for an empty table.
    pub fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>, TableError> {
        let dates = self.dates()?;
        Ok(dates
            .iter()
            .min()
            .copied()
            .zip(dates.iter().max().copied()))
    }
}

/// Dense matrix with row and column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    rows: Vec<String>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl LabeledMatrix {
    /// Create a labeled matrix, checking that labels match the value shape.
    pub fn new(
        rows: Vec<String>,
        columns: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self, TableError> {
        if values.dim() != (rows.len(), columns.len()) {
            return Err(TableError::Shape {
                rows: rows.len(),
                columns: columns.len(),
                shape: values.dim(),
            });
        }
        ensure_unique(rows.iter().map(String::as_str))?;
        ensure_unique(columns.iter().map(String::as_str))?;

        Ok(Self {
            rows,
            columns,
            values,
        })
    }

    /// Row labels.
    pub fn row_labels(&self) -> &[String] {
        &self.rows
    }

    /// Column labels.
    pub fn column_labels(&self) -> &[String] {
        &self.columns
    }

    /// Values as an `(rows x columns)` array.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Position of a row label.
    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|r| r == label)
    }

    /// Value at a labeled cell.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.row_index(row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[[i, j]])
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }
}

/// Serialized as `{ "rows": [..], "columns": [..], "values": [[..], ..] }`.
impl Serialize for LabeledMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values: Vec<Vec<f64>> = self.values.rows().into_iter().map(|r| r.to_vec()).collect();
        let mut state = serializer.serialize_struct("LabeledMatrix", 3)?;
        state.serialize_field("rows", &self.rows)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("values", &values)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> TimeSeriesTable {
        TimeSeriesTable::new(
            &[date(2024, 1, 3), date(2024, 1, 2)],
            vec![
                ("A".to_string(), vec![Some(1.0), Some(2.0)]),
                ("B".to_string(), vec![None, Some(4.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_epoch_days_roundtrip() {
        assert_eq!(to_epoch_days(date(1970, 1, 1)), 0);
        assert_eq!(to_epoch_days(date(1970, 1, 11)), 10);
        assert_eq!(from_epoch_days(19_723), date(2024, 1, 1));
    }

    #[test]
    fn test_time_series_accessors() {
        let table = sample();

        assert_eq!(table.height(), 2);
        assert_eq!(table.column_names(), vec!["A", "B"]);
        assert!(table.has_column("A"));
        assert!(!table.has_column(DATE_COLUMN));
        assert_eq!(table.dates().unwrap(), vec![date(2024, 1, 3), date(2024, 1, 2)]);
        assert_eq!(table.values("B").unwrap(), vec![None, Some(4.0)]);
        assert_eq!(
            table.date_range().unwrap(),
            Some((date(2024, 1, 2), date(2024, 1, 3)))
        );
    }

    #[test]
    fn test_to_matrix_maps_nulls_to_nan() {
        let matrix = sample().to_matrix().unwrap();
        assert_eq!(matrix.dim(), (2, 2));
        assert_eq!(matrix[[1, 1]], 4.0);
        assert!(matrix[[0, 1]].is_nan());
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = TimeSeriesTable::new(
            &[date(2024, 1, 2)],
            vec![
                ("A".to_string(), vec![Some(1.0)]),
                ("A".to_string(), vec![Some(2.0)]),
            ],
        );
        assert!(matches!(result, Err(TableError::DuplicateLabel(l)) if l == "A"));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = TimeSeriesTable::new(
            &[date(2024, 1, 2)],
            vec![("A".to_string(), vec![Some(1.0), Some(2.0)])],
        );
        assert!(matches!(result, Err(TableError::Length { .. })));
    }

    #[test]
    fn test_empty_table() {
        let table = TimeSeriesTable::new(&[], vec![("A".to_string(), Vec::new())]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_names(), vec!["A"]);
        assert_eq!(table.date_range().unwrap(), None);
    }

    #[test]
    fn test_from_frame_requires_leading_date() {
        let frame = DataFrame::new(vec![Column::new("A".into(), vec![1.0])]).unwrap();
        assert!(matches!(
            TimeSeriesTable::from_frame(frame),
            Err(TableError::MissingDateColumn)
        ));

        let roundtrip = TimeSeriesTable::from_frame(sample().lazy().collect().unwrap()).unwrap();
        assert_eq!(roundtrip, sample());
    }

    #[test]
    fn test_head() {
        let head = sample().head(1);
        assert_eq!(head.height(), 1);
        assert_eq!(head.dates().unwrap(), vec![date(2024, 1, 3)]);
    }

    #[test]
    fn test_labeled_matrix() {
        let m = LabeledMatrix::new(
            vec!["X".to_string(), "Y".to_string()],
            vec!["2Y".to_string(), "10Y".to_string()],
            array![[1.0, 2.0], [3.0, 4.0]],
        )
        .unwrap();

        assert_eq!(m.get("Y", "2Y"), Some(3.0));
        assert_eq!(m.get("Z", "2Y"), None);
        assert_eq!(m.row_index("X"), Some(0));
        assert_eq!((m.nrows(), m.ncols()), (2, 2));
    }

    #[test]
    fn test_labeled_matrix_shape_checked() {
        let result = LabeledMatrix::new(
            vec!["X".to_string()],
            vec!["2Y".to_string(), "10Y".to_string()],
            array![[1.0, 2.0], [3.0, 4.0]],
        );
        assert!(matches!(result, Err(TableError::Shape { .. })));
    }

    #[test]
    fn test_labeled_matrix_serializes_by_label() {
        let m = LabeledMatrix::new(
            vec!["X".to_string()],
            vec!["2Y".to_string(), "10Y".to_string()],
            array![[1.5, -2.0]],
        )
        .unwrap();

        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"rows":["X"],"columns":["2Y","10Y"],"values":[[1.5,-2.0]]}"#);
    }
}
