//! CSV and JSON export of filtered returns.

use crate::table::NumberFormat;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tenor_data::{TableError, TimeSeriesTable};
use thiserror::Error;

/// Default file name of the filtered returns export.
pub const FILTERED_RETURNS_FILE: &str = "filtered_returns.csv";

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized CSV was not valid UTF-8.
    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Source table could not be read.
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Returns of every exported asset on one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnRow {
    /// Observation date
    pub date: NaiveDate,
    /// One value per exported asset, in `assets` order
    pub values: Vec<Option<f64>>,
}

/// The filtered returns table in export form.
///
/// Rows keep the order of the source table, which is newest date first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilteredReturnsExport {
    /// Asset identifiers, in column order
    pub assets: Vec<String>,
    /// One row per date
    pub rows: Vec<ReturnRow>,
}

impl FilteredReturnsExport {
    /// Build the export from a date-indexed returns table.
    pub fn from_table(table: &TimeSeriesTable) -> Result<Self, ExportError> {
        let assets = table.column_names();
        let dates = table.dates()?;
        let columns = assets
            .iter()
            .map(|asset| table.values(asset))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| ReturnRow {
                date,
                values: columns.iter().map(|column| column[i]).collect(),
            })
            .collect();

        Ok(Self { assets, rows })
    }

    /// Whether there are no rows to export.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn to_csv(&self) -> Result<String, ExportError> {
        let mut wtr = csv::Writer::from_writer(vec![]);

        let header: Vec<&str> = std::iter::once("Date")
            .chain(self.assets.iter().map(String::as_str))
            .collect();
        wtr.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.date.format("%Y-%m-%d").to_string()];
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|v| NumberFormat::PERCENT_4.format(v)).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }

        let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl Exporter for FilteredReturnsExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> FilteredReturnsExport {
        let table = TimeSeriesTable::new(
            &[date(2024, 1, 4), date(2024, 1, 3)],
            vec![
                (
                    "BOND_A".to_string(),
                    vec![Some(-0.0294117647), Some(0.02)],
                ),
                ("BOND_B".to_string(), vec![Some(0.012345), Some(-0.001)]),
            ],
        )
        .unwrap();
        FilteredReturnsExport::from_table(&table).unwrap()
    }

    #[test]
    fn test_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[test]
    fn test_from_table_keeps_row_order() {
        let export = sample();
        assert_eq!(export.assets, vec!["BOND_A", "BOND_B"]);
        assert_eq!(export.rows[0].date, date(2024, 1, 4));
        assert_eq!(export.rows[1].values, vec![Some(0.02), Some(-0.001)]);
    }

    #[test]
    fn test_csv_is_percent_formatted() {
        let csv = sample().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,BOND_A,BOND_B");
        assert_eq!(lines[1], "2024-01-04,-2.9412%,1.2345%");
        assert_eq!(lines[2], "2024-01-03,2.0000%,-0.1000%");
    }

    #[test]
    fn test_json_carries_fractions() {
        let json = sample().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"assets\":[\"BOND_A\",\"BOND_B\"]"));
        assert!(json.contains("\"date\":\"2024-01-03\""));
        assert!(json.contains("0.02"));
        assert!(!json.contains('%'));

        let pretty = sample().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(pretty.contains("  "));
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let table = TimeSeriesTable::new(&[], vec![("BOND_A".to_string(), Vec::new())]).unwrap();
        let export = FilteredReturnsExport::from_table(&table).unwrap();
        assert!(export.is_empty());
        assert_eq!(
            export.export_to_string(ExportFormat::Csv).unwrap(),
            "Date,BOND_A\n"
        );
    }
}
