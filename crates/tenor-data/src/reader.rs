//! Readers for tabular input files.
//!
//! Workbooks (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`) are read through calamine,
//! using the first worksheet. Plain `csv` files are accepted as well. In both
//! cases the first row holds column labels and the first column holds row
//! labels, as the inputs are laid out by the desks that produce them.

use crate::table::{LabeledMatrix, TableError, TimeSeriesTable};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use ndarray::Array2;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Errors from reading an input file.
///
/// Row numbers are 1-based sheet rows, counting the header row.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Workbook could not be opened or decoded
    #[error("Workbook error: {0}")]
    Calamine(#[from] calamine::Error),

    /// CSV file could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook without a worksheet
    #[error("workbook has no worksheets")]
    NoWorksheet,

    /// No non-blank rows at all
    #[error("sheet is empty")]
    EmptySheet,

    /// Header row has nothing after the index column
    #[error("no value columns in header row")]
    NoValueColumns,

    /// Blank label between value columns
    #[error("blank column label at column {column}")]
    BlankColumnLabel {
        /// 1-based column position
        column: usize,
    },

    /// Row label that is not a recognizable date
    #[error("row {row}: cannot parse date {raw:?}")]
    BadDate {
        /// Sheet row
        row: usize,
        /// Label as found
        raw: String,
    },

    /// Second occurrence of a date
    #[error("row {row}: duplicate date {date}")]
    DuplicateDate {
        /// Sheet row
        row: usize,
        /// Repeated date
        date: NaiveDate,
    },

    /// Row without an identifier
    #[error("row {row}: blank row label")]
    BlankRowLabel {
        /// Sheet row
        row: usize,
    },

    /// Value cell that is neither blank nor a number
    #[error("row {row}, column {column}: non-numeric value {raw:?}")]
    NonNumeric {
        /// Sheet row
        row: usize,
        /// Column label
        column: String,
        /// Cell content as found
        raw: String,
    },

    /// Parsed values did not form a valid table
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Date formats accepted for text row labels.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Date-time formats accepted for text row labels; the time part is dropped.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A single cell read from an input file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank or error cell
    Empty,
    /// Numeric cell
    Number(f64),
    /// Text cell
    Text(String),
    /// Date cell
    Date(NaiveDate),
}

impl Cell {
    /// Parse a raw text field, as found in CSV input.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else if let Ok(value) = trimmed.parse::<f64>() {
            Self::Number(value)
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// Numeric value of the cell; `None` for blanks, text and dates.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.parse::<f64>().ok(),
            Self::Empty | Self::Date(_) => None,
        }
    }

    /// Date value of the cell.
    ///
    /// Numbers are treated as Excel serial dates (1900 date system).
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Number(serial) => excel_serial_to_date(*serial),
            Self::Text(s) => parse_date(s),
            Self::Empty => None,
        }
    }

    /// Label text of the cell, used for row and column headers.
    pub fn label(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
            Self::Number(v) => v.to_string(),
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(v) => Self::Number(*v as f64),
            Data::Float(v) => Self::Number(*v),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Self::parse(s),
            Data::Bool(b) => Self::Text(b.to_string()),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map_or_else(|| Self::Number(dt.as_f64()), |d| Self::Date(d.date())),
            Data::Error(_) | Data::Empty => Self::Empty,
        }
    }
}

/// Convert an Excel serial date (1900 system) to a calendar date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // Serials below 61 predate Excel's phantom 1900-02-29.
    let days = if serial < 61.0 { serial + 1.0 } else { serial };
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(days.floor() as i64))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// A rectangular sheet: a header row followed by body rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSheet {
    /// Header labels, including the (often blank) index header in position 0
    pub header: Vec<String>,
    /// Body rows; each row may be shorter than the header
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    /// Read the first sheet of a workbook, or a CSV file, depending on the
    /// file extension.
    pub fn read(path: &Path) -> Result<Self, ReadError> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            Self::read_csv(path)
        } else {
            Self::read_workbook(path)
        }
    }

    fn read_workbook(path: &Path) -> Result<Self, ReadError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range_at(0).ok_or(ReadError::NoWorksheet)??;

        let rows: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();
        Self::from_rows(rows)
    }

    fn read_csv(path: &Path) -> Result<Self, ReadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::parse).collect());
        }
        Self::from_rows(rows)
    }

    /// Split raw rows into header and body, skipping blank rows.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, ReadError> {
        let mut rows = rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| *cell != Cell::Empty));

        let header = rows
            .next()
            .ok_or(ReadError::EmptySheet)?
            .iter()
            .map(Cell::label)
            .collect();

        Ok(Self {
            header,
            rows: rows.collect(),
        })
    }

    /// Column labels after the index column, with trailing blank headers removed.
    fn value_labels(&self) -> Result<Vec<String>, ReadError> {
        let mut labels: Vec<String> = self.header.iter().skip(1).cloned().collect();
        while labels.last().is_some_and(String::is_empty) {
            labels.pop();
        }
        if labels.is_empty() {
            return Err(ReadError::NoValueColumns);
        }
        if let Some(pos) = labels.iter().position(String::is_empty) {
            return Err(ReadError::BlankColumnLabel { column: pos + 2 });
        }
        Ok(labels)
    }

    /// Value in column `column` (after the index) of body row `n`.
    fn value_at(
        row: &[Cell],
        n: usize,
        column: usize,
        label: &str,
    ) -> Result<Option<f64>, ReadError> {
        match row.get(column + 1) {
            None | Some(Cell::Empty) => Ok(None),
            Some(cell) => cell.as_number().map(Some).ok_or_else(|| ReadError::NonNumeric {
                row: n + 2,
                column: label.to_string(),
                raw: cell.label(),
            }),
        }
    }

    /// Interpret the sheet as a date-indexed table, dividing every value by
    /// `scale`.
    pub fn to_time_series(&self, scale: f64) -> Result<TimeSeriesTable, ReadError> {
        let labels = self.value_labels()?;
        let mut dates = Vec::with_capacity(self.rows.len());
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); labels.len()];
        let mut seen = HashSet::new();

        for (n, row) in self.rows.iter().enumerate() {
            let index = row.first().cloned().unwrap_or(Cell::Empty);
            let date = index.to_date().ok_or_else(|| ReadError::BadDate {
                row: n + 2,
                raw: index.label(),
            })?;
            if !seen.insert(date) {
                return Err(ReadError::DuplicateDate { row: n + 2, date });
            }
            dates.push(date);

            for (j, column) in columns.iter_mut().enumerate() {
                let value = Self::value_at(row, n, j, &labels[j])?;
                column.push(value.map(|v| v / scale));
            }
        }

        Ok(TimeSeriesTable::new(
            &dates,
            labels.into_iter().zip(columns).collect(),
        )?)
    }

    /// Interpret the sheet as an identifier-indexed matrix; blanks become NaN.
    pub fn to_matrix(&self) -> Result<LabeledMatrix, ReadError> {
        let labels = self.value_labels()?;
        let mut row_labels = Vec::with_capacity(self.rows.len());
        let mut values = Array2::<f64>::from_elem((self.rows.len(), labels.len()), f64::NAN);

        for (i, row) in self.rows.iter().enumerate() {
            let label = row.first().map(Cell::label).unwrap_or_default();
            if label.is_empty() {
                return Err(ReadError::BlankRowLabel { row: i + 2 });
            }
            row_labels.push(label);

            for (j, column) in labels.iter().enumerate() {
                if let Some(v) = Self::value_at(row, i, j, column)? {
                    values[[i, j]] = v;
                }
            }
        }

        Ok(LabeledMatrix::new(row_labels, labels, values)?)
    }
}
