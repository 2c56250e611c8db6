#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tenor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod distribution;
pub mod loadings;
pub mod metrics;
pub mod stats;

pub use distribution::{BoxSummary, cumulative_returns, quantile};
pub use loadings::{
    CONVEXITY_MULTIPLIER, DURATION_MULTIPLIER, LoadingsError, build_loadings, factor_design,
};
pub use metrics::{PortfolioMetrics, RiskLevel, RiskThresholds};
pub use stats::{ReturnStatistics, StatsError};
