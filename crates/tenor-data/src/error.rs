//! Error types for input operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for input operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while locating and reading the input tables.
///
/// Both kinds are fatal for a run: nothing downstream is computed once
/// either is returned.
#[derive(Debug, Error)]
pub enum DataError {
    /// One or more required input files are absent
    #[error("Missing files: {missing:?} (available in {}: {available:?})", .directory.display())]
    MissingInput {
        /// File names that were not found
        missing: Vec<String>,
        /// Directory that was searched
        directory: PathBuf,
        /// Entries observed in that directory
        available: Vec<String>,
    },

    /// A file exists but could not be parsed as a table
    #[error("Error reading {file}: {reason}")]
    UnreadableInput {
        /// File that failed to parse
        file: String,
        /// Underlying parse failure
        reason: String,
    },
}

impl DataError {
    /// Build an [`DataError::UnreadableInput`] from any displayable failure.
    pub fn unreadable(file: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::UnreadableInput {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// Names of the missing files, empty for other error kinds.
    pub fn missing_files(&self) -> &[String] {
        match self {
            Self::MissingInput { missing, .. } => missing,
            Self::UnreadableInput { .. } => &[],
        }
    }
}
