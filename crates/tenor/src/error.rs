//! Error types for the pipeline.

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use tenor_data::{DataError, TableError};
use tenor_output::{ExportError, ReportError};
use tenor_risk::{LoadingsError, StatsError};
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised while deriving, filtering or presenting tables.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input files missing or unreadable
    #[error(transparent)]
    Data(#[from] DataError),

    /// Loadings or factor design could not be built
    #[error("Loadings error: {0}")]
    Loadings(#[from] LoadingsError),

    /// Table construction error
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Polars error during derivation
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Statistics error
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    /// Table conversion for presentation failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Report envelope could not be built
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Date window with its start after its end
    #[error("Invalid date window: start {start} is after end {end}")]
    InvalidWindow {
        /// First date requested
        start: NaiveDate,
        /// Last date requested
        end: NaiveDate,
    },
}
