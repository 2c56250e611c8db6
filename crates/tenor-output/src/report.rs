//! JSON report envelope for dashboard views.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Assets and date window a report was produced for.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSelection {
    /// Selected asset identifiers
    pub assets: Vec<String>,
    /// First date of the window
    pub start: Option<NaiveDate>,
    /// Last date of the window
    pub end: Option<NaiveDate>,
}

/// A rendered dashboard view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Section the contents belong to.
    pub section: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Selection the view was computed for.
    pub selection: ReportSelection,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub fn new(section: String, selection: ReportSelection, contents: serde_json::Value) -> Self {
        Self {
            section,
            timestamp: Utc::now(),
            selection,
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    section: Option<String>,
    selection: Option<ReportSelection>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the section name.
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Set the selection.
    pub fn selection(mut self, selection: ReportSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Serialize any view into the report contents.
    pub fn contents<T: Serialize>(mut self, contents: &T) -> Result<Self, ReportError> {
        self.contents = Some(serde_json::to_value(contents)?);
        Ok(self)
    }

    /// Build the report.
    pub fn build(self) -> Report {
        Report::new(
            self.section.unwrap_or_default(),
            self.selection.unwrap_or_default(),
            self.contents.unwrap_or(serde_json::Value::Null),
        )
    }
}
