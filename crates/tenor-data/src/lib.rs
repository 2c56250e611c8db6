#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tenor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod inputs;
pub mod reader;
pub mod table;

pub use error::{DataError, Result};
pub use inputs::{InputFiles, InputKind, InputTables, RATE_SCALE};
pub use reader::{Cell, RawSheet, ReadError};
pub use table::{DATE_COLUMN, LabeledMatrix, TableError, TimeSeriesTable};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
