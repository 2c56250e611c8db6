//! Summary tables for return statistics and portfolio metrics.

use crate::table::{MISSING, NumberFormat, TextTable};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use tenor_data::LabeledMatrix;
use tenor_risk::{BoxSummary, PortfolioMetrics, ReturnStatistics};

/// Average return and volatility of one asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetSummary {
    /// Asset identifier
    pub asset: String,
    /// Mean periodic return
    pub average_return: f64,
    /// Sample standard deviation of returns
    pub volatility: f64,
}

impl fmt::Display for AssetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.4}% average return, {:.4}% volatility",
            self.asset,
            self.average_return * 100.0,
            self.volatility * 100.0
        )
    }
}

/// One [`AssetSummary`] per series, in column order.
pub fn asset_summaries(stats: &ReturnStatistics) -> Vec<AssetSummary> {
    stats
        .names()
        .iter()
        .zip(stats.mean().iter().zip(stats.std_dev().iter()))
        .map(|(asset, (mean, std))| AssetSummary {
            asset: asset.clone(),
            average_return: *mean,
            volatility: *std,
        })
        .collect()
}

/// `Asset | Average Return | Volatility` table.
pub fn summary_table(summaries: &[AssetSummary]) -> TextTable {
    let mut table = TextTable::new("Summary Statistics", ["Asset", "Average Return", "Volatility"]);
    for summary in summaries {
        table.push_values(
            summary.asset.clone(),
            [Some(summary.average_return), Some(summary.volatility)],
            NumberFormat::PERCENT_4,
        );
    }
    table
}

/// Square table of a correlation matrix labeled by `names`.
pub fn correlation_table(names: &[String], correlation: &Array2<f64>) -> TextTable {
    let mut table = TextTable::new(
        "Correlation Matrix",
        std::iter::once(String::new()).chain(names.iter().cloned()),
    );
    for (name, row) in names.iter().zip(correlation.rows()) {
        table.push_values(name.clone(), row.iter().map(|v| Some(*v)), NumberFormat::PLAIN_4);
    }
    table
}

/// Asset x column table of a labeled matrix.
pub fn matrix_table(title: impl Into<String>, matrix: &LabeledMatrix) -> TextTable {
    let mut table = TextTable::new(
        title,
        std::iter::once("Asset".to_string()).chain(matrix.column_labels().iter().cloned()),
    );
    for (label, row) in matrix.row_labels().iter().zip(matrix.values().rows()) {
        table.push_values(label.clone(), row.iter().map(|v| Some(*v)), NumberFormat::PLAIN_4);
    }
    table
}

/// Headline risk metrics as a two-column table.
pub fn metrics_table(metrics: &PortfolioMetrics) -> TextTable {
    TextTable::key_value(
        "Risk Metrics",
        [
            (
                "Average Volatility",
                NumberFormat::PERCENT_2.cell(Some(metrics.average_volatility)),
            ),
            (
                "Average Return",
                NumberFormat::PERCENT_4.cell(Some(metrics.average_return)),
            ),
            (
                "Worst Period Return",
                NumberFormat::PERCENT_2.cell(Some(metrics.worst_return)),
            ),
            (
                "Sharpe Ratio",
                NumberFormat::PLAIN_4.cell(metrics.sharpe_ratio),
            ),
            (
                "Risk Level",
                metrics
                    .risk_level
                    .map_or_else(|| MISSING.to_string(), |level| level.to_string()),
            ),
        ],
    )
}

/// Quartile summary per asset.
pub fn distribution_table(summaries: &[BoxSummary]) -> TextTable {
    let mut table = TextTable::new(
        "Return Distributions",
        [
            "Asset", "Min", "Lower", "Q1", "Median", "Q3", "Upper", "Max", "Outliers",
        ],
    );
    for summary in summaries {
        let mut row = vec![summary.name.clone()];
        row.extend(
            [
                summary.min,
                summary.lower_whisker,
                summary.q1,
                summary.median,
                summary.q3,
                summary.upper_whisker,
                summary.max,
            ]
            .iter()
            .map(|v| NumberFormat::PERCENT_2.cell(Some(*v))),
        );
        row.push(summary.outliers.to_string());
        table.push_row(row);
    }
    table
}
