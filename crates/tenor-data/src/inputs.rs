//! The four required input files and their loading.

use crate::error::{DataError, Result};
use crate::reader::RawSheet;
use crate::table::{LabeledMatrix, TimeSeriesTable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rate levels are quoted in percentage points and stored as fractions.
pub const RATE_SCALE: f64 = 100.0;

/// One of the required input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Interest-rate curve levels by date and tenor
    KeyRates,
    /// Asset prices by date and asset identifier
    Assets,
    /// Key-rate durations by asset and tenor
    Durations,
    /// Convexities by asset and tenor
    Convexity,
}

impl InputKind {
    /// All inputs, in load order.
    pub const ALL: [Self; 4] = [Self::KeyRates, Self::Assets, Self::Durations, Self::Convexity];

    /// File name used when none is configured.
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::KeyRates => "KeyRates.xlsx",
            Self::Assets => "Assets.xlsx",
            Self::Durations => "durations.xlsx",
            Self::Convexity => "convexity.xlsx",
        }
    }

    /// Human-readable description.
    pub const fn description(self) -> &'static str {
        match self {
            Self::KeyRates => "key rate levels",
            Self::Assets => "asset prices",
            Self::Durations => "key rate durations",
            Self::Convexity => "convexities",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Location of the input files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFiles {
    directory: PathBuf,
    key_rates: String,
    assets: String,
    durations: String,
    convexity: String,
}

impl Default for InputFiles {
    fn default() -> Self {
        Self::new(".")
    }
}

/// The raw input tables, as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTables {
    /// Rate levels as fractions
    pub rate_curve: TimeSeriesTable,
    /// Asset prices or levels
    pub asset_prices: TimeSeriesTable,
    /// Key-rate durations, asset x tenor
    pub durations: LabeledMatrix,
    /// Convexities, asset x tenor
    pub convexity: LabeledMatrix,
}

impl InputFiles {
    /// Input files with their default names inside `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            key_rates: InputKind::KeyRates.default_file_name().to_string(),
            assets: InputKind::Assets.default_file_name().to_string(),
            durations: InputKind::Durations.default_file_name().to_string(),
            convexity: InputKind::Convexity.default_file_name().to_string(),
        }
    }

    /// Override the file name for one input.
    pub fn with_file_name(mut self, kind: InputKind, name: impl Into<String>) -> Self {
        let name = name.into();
        match kind {
            InputKind::KeyRates => self.key_rates = name,
            InputKind::Assets => self.assets = name,
            InputKind::Durations => self.durations = name,
            InputKind::Convexity => self.convexity = name,
        }
        self
    }

    /// Directory holding the inputs.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Configured file name for one input.
    pub fn file_name(&self, kind: InputKind) -> &str {
        match kind {
            InputKind::KeyRates => &self.key_rates,
            InputKind::Assets => &self.assets,
            InputKind::Durations => &self.durations,
            InputKind::Convexity => &self.convexity,
        }
    }

    /// Full path of one input.
    pub fn path(&self, kind: InputKind) -> PathBuf {
        self.directory.join(self.file_name(kind))
    }

    /// Entries of the input directory, sorted; empty if it cannot be listed.
    pub fn directory_listing(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.directory)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Verify that every input exists.
    ///
    /// All absent files are reported together.
    pub fn check(&self) -> Result<()> {
        let missing: Vec<String> = InputKind::ALL
            .iter()
            .filter(|kind| !self.path(**kind).is_file())
            .map(|kind| self.file_name(*kind).to_string())
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        Err(DataError::MissingInput {
            missing,
            directory: self.directory.clone(),
            available: self.directory_listing(),
        })
    }

    fn read(&self, kind: InputKind) -> Result<RawSheet> {
        let path = self.path(kind);
        debug!(file = %path.display(), "reading {}", kind);
        RawSheet::read(&path).map_err(|err| DataError::unreadable(self.file_name(kind), err))
    }

    fn read_time_series(&self, kind: InputKind, scale: f64) -> Result<TimeSeriesTable> {
        self.read(kind)?
            .to_time_series(scale)
            .map_err(|err| DataError::unreadable(self.file_name(kind), err))
    }

    fn read_matrix(&self, kind: InputKind) -> Result<LabeledMatrix> {
        self.read(kind)?
            .to_matrix()
            .map_err(|err| DataError::unreadable(self.file_name(kind), err))
    }

    /// Check and read all inputs.
    pub fn load(&self) -> Result<InputTables> {
        self.load_with(|_| {})
    }

    /// Check and read all inputs, calling `on_read` before each file is read.
    pub fn load_with<F>(&self, mut on_read: F) -> Result<InputTables>
    where
        F: FnMut(InputKind),
    {
        self.check()?;

        on_read(InputKind::KeyRates);
        let rate_curve = self.read_time_series(InputKind::KeyRates, RATE_SCALE)?;
        on_read(InputKind::Assets);
        let asset_prices = self.read_time_series(InputKind::Assets, 1.0)?;
        on_read(InputKind::Durations);
        let durations = self.read_matrix(InputKind::Durations)?;
        on_read(InputKind::Convexity);
        let convexity = self.read_matrix(InputKind::Convexity)?;

        info!(
            rate_dates = rate_curve.height(),
            tenors = rate_curve.column_names().len(),
            price_dates = asset_prices.height(),
            assets = asset_prices.column_names().len(),
            "loaded inputs from {}",
            self.directory.display()
        );

        Ok(InputTables {
            rate_curve,
            asset_prices,
            durations,
            convexity,
        })
    }
}
