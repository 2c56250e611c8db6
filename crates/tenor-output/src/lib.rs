#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tenor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod summary;
pub mod table;

pub use export::{
    ExportError, ExportFormat, Exporter, FILTERED_RETURNS_FILE, FilteredReturnsExport, ReturnRow,
};
pub use report::{Report, ReportBuilder, ReportError, ReportSelection};
pub use summary::{
    AssetSummary, asset_summaries, correlation_table, distribution_table, matrix_table,
    metrics_table, summary_table,
};
pub use table::{MISSING, NumberFormat, TextTable};
