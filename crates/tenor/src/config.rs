//! Dashboard configuration.
//!
//! Read from TOML. Every field is optional; a missing file means defaults.
//!
//! ```toml
//! data_dir = "/srv/bonds"
//! default_asset_count = 8
//!
//! [files]
//! assets = "prices.xlsx"
//!
//! [risk]
//! medium = 0.015
//! high = 0.04
//! ```

use crate::section::ViewOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tenor_data::{InputFiles, InputKind};
use tenor_output::FILTERED_RETURNS_FILE;
use tenor_risk::RiskThresholds;
use thiserror::Error;
use tracing::debug;

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Cannot read config {}: {source}", .path.display())]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for this schema
    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },
}

/// Input file names inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNames {
    /// Rate curve workbook
    pub key_rates: String,
    /// Asset price workbook
    pub assets: String,
    /// Key-rate duration workbook
    pub durations: String,
    /// Convexity workbook
    pub convexity: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            key_rates: InputKind::KeyRates.default_file_name().to_string(),
            assets: InputKind::Assets.default_file_name().to_string(),
            durations: InputKind::Durations.default_file_name().to_string(),
            convexity: InputKind::Convexity.default_file_name().to_string(),
        }
    }
}

/// Dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding the input files
    pub data_dir: PathBuf,

    /// Input file names
    pub files: FileNames,

    /// Assets selected when none are requested
    pub default_asset_count: usize,

    /// Rows shown in data previews
    pub preview_rows: usize,

    /// Risk level thresholds
    pub risk: RiskThresholds,

    /// Where `export` writes the filtered returns
    pub export_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            files: FileNames::default(),
            default_asset_count: 5,
            preview_rows: 15,
            risk: RiskThresholds::default(),
            export_path: PathBuf::from(FILTERED_RETURNS_FILE),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Platform config location.
    ///
    /// - Linux: `~/.config/tenor/config.toml`
    /// - macOS: `~/Library/Application Support/tenor/config.toml`
    /// - Windows: `%APPDATA%\tenor\config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tenor").join("config.toml"))
    }

    /// Load from `explicit` if given, else from [`Self::default_path`] if that
    /// file exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path().filter(|path| path.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// The input files this configuration points at.
    pub fn input_files(&self) -> InputFiles {
        InputFiles::new(&self.data_dir)
            .with_file_name(InputKind::KeyRates, &self.files.key_rates)
            .with_file_name(InputKind::Assets, &self.files.assets)
            .with_file_name(InputKind::Durations, &self.files.durations)
            .with_file_name(InputKind::Convexity, &self.files.convexity)
    }

    /// Options for building section views.
    pub const fn view_options(&self) -> ViewOptions {
        ViewOptions {
            thresholds: self.risk,
            preview_rows: self.preview_rows,
        }
    }
}
