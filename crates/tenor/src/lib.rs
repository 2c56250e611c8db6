#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tenor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod section;

// Re-export sub-crates
pub use tenor_data as data;
pub use tenor_output as output;
pub use tenor_risk as risk;

pub use config::{ConfigError, DashboardConfig, FileNames};
pub use error::{PipelineError, Result};
pub use filter::{DateWindow, FilteredReturns, Selection};
pub use pipeline::Snapshot;
pub use section::{Section, SectionView, ViewOptions};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
