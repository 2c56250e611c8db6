//! Plain-text tables for terminal and Markdown output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for missing or undefined values.
pub const MISSING: &str = "-";

/// How numbers in a table are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberFormat {
    /// Fraction shown as a percentage, e.g. `0.0123` -> `1.23%`
    Percent(usize),
    /// Plain decimal
    Plain(usize),
}

impl NumberFormat {
    /// Percent with two decimals.
    pub const PERCENT_2: Self = Self::Percent(2);
    /// Percent with four decimals.
    pub const PERCENT_4: Self = Self::Percent(4);
    /// Plain with four decimals.
    pub const PLAIN_4: Self = Self::Plain(4);

    /// Format a value; non-finite values become an empty string.
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return String::new();
        }
        match *self {
            Self::Percent(decimals) => format!("{:.*}%", decimals, value * 100.0),
            Self::Plain(decimals) => format!("{value:.decimals$}"),
        }
    }

    /// Format an optional value, writing [`MISSING`] for absent or undefined ones.
    pub fn cell(&self, value: Option<f64>) -> String {
        match value {
            Some(v) if v.is_finite() => self.format(v),
            _ => MISSING.to_string(),
        }
    }
}

/// A titled table of pre-formatted cells.
///
/// The first column is left-aligned (labels); the rest are right-aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTable {
    /// Table title
    pub title: String,
    /// Column headers
    pub headers: Vec<String>,
    /// Rows of cells, each as wide as `headers`
    pub rows: Vec<Vec<String>>,
}

impl TextTable {
    /// Create an empty table.
    pub fn new<S: Into<String>>(title: impl Into<String>, headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            title: title.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Two-column `Metric | Value` table.
    pub fn key_value<K, V>(title: impl Into<String>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::new(title, ["Metric", "Value"]);
        for (key, value) in pairs {
            table.push_row(vec![key.into(), value.into()]);
        }
        table
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Append a labeled row of numbers.
    pub fn push_values(
        &mut self,
        label: impl Into<String>,
        values: impl IntoIterator<Item = Option<f64>>,
        format: NumberFormat,
    ) {
        let mut row = vec![label.into()];
        row.extend(values.into_iter().map(|v| format.cell(v)));
        self.push_row(row);
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn ascii_line(cells: &[String], widths: &[usize]) -> String {
        cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, width))| {
                if i == 0 {
                    format!("{cell:<width$}")
                } else {
                    format!("{cell:>width$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let widths = self.widths();
        let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let rule = total.max(self.title.chars().count());

        let mut output = String::new();
        output.push_str(&format!("\n{}\n", self.title));
        output.push_str(&"=".repeat(rule));
        output.push('\n');
        output.push_str(&Self::ascii_line(&self.headers, &widths));
        output.push('\n');
        output.push_str(&"-".repeat(rule));
        output.push('\n');

        if self.rows.is_empty() {
            output.push_str("(no rows)\n");
        }
        for row in &self.rows {
            output.push_str(&Self::ascii_line(row, &widths));
            output.push('\n');
        }

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("## {}\n\n", self.title));
        output.push_str(&format!("| {} |\n", self.headers.join(" | ")));
        let separator: Vec<&str> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, _)| if i == 0 { "---" } else { "---:" })
            .collect();
        output.push_str(&format!("|{}|\n", separator.join("|")));

        for row in &self.rows {
            output.push_str(&format!("| {} |\n", row.join(" | ")));
        }
        output.push('\n');

        output
    }
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(NumberFormat::PERCENT_2, 0.0123, "1.23%")]
    #[case(NumberFormat::PERCENT_4, 0.02, "2.0000%")]
    #[case(NumberFormat::PERCENT_4, -0.0294117647, "-2.9412%")]
    #[case(NumberFormat::PLAIN_4, -1.8, "-1.8000")]
    #[case(NumberFormat::PLAIN_4, f64::NAN, "")]
    fn test_number_format(#[case] format: NumberFormat, #[case] value: f64, #[case] expected: &str) {
        assert_eq!(format.format(value), expected);
    }

    #[test]
    fn test_missing_cell() {
        assert_eq!(NumberFormat::PLAIN_4.cell(None), MISSING);
        assert_eq!(NumberFormat::PLAIN_4.cell(Some(f64::INFINITY)), MISSING);
    }

    #[test]
    fn test_ascii_alignment() {
        let mut table = TextTable::new("Durations", ["Asset", "2Y", "10Y"]);
        table.push_values("BOND_A", [Some(1.8), Some(0.2)], NumberFormat::PLAIN_4);
        table.push_values("B", [Some(10.25), None], NumberFormat::PLAIN_4);

        let ascii = table.to_ascii_table();
        let lines: Vec<&str> = ascii.lines().collect();
        assert_eq!(lines[1], "Durations");
        assert_eq!(lines[3], "Asset        2Y     10Y");
        assert_eq!(lines[5], "BOND_A   1.8000  0.2000");
        assert_eq!(lines[6], "B       10.2500       -");
    }

    #[test]
    fn test_markdown() {
        let table = TextTable::key_value("Metrics", [("Risk Level", "Low")]);
        let md = table.to_markdown();
        assert!(md.starts_with("## Metrics\n\n| Metric | Value |\n|---|---:|\n"));
        assert!(md.contains("| Risk Level | Low |"));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = TextTable::new("T", ["a", "b", "c"]);
        table.push_row(vec!["x".to_string()]);
        assert_eq!(table.rows[0], vec!["x", "", ""]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_table() {
        let table = TextTable::new("Empty", ["Date"]);
        assert!(table.is_empty());
        assert!(table.to_ascii_table().contains("(no rows)"));
    }
}
