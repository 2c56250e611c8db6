//! Dashboard sections.
//!
//! Each [`Section`] builds one view from the snapshot and the filtered
//! returns. Views serialize to JSON for reports and render to [`TextTable`]s
//! for the terminal.

use crate::error::Result;
use crate::filter::FilteredReturns;
use crate::pipeline::Snapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tenor_data::{LabeledMatrix, TimeSeriesTable};
use tenor_output::{
    AssetSummary, FilteredReturnsExport, MISSING, NumberFormat, Report, ReportBuilder, ReturnRow,
    TextTable, asset_summaries, correlation_table, distribution_table, matrix_table,
    metrics_table, summary_table,
};
use tenor_risk::{
    BoxSummary, PortfolioMetrics, ReturnStatistics, RiskLevel, RiskThresholds, cumulative_returns,
};

/// The four dashboard sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Headline figures
    Overview,
    /// Raw and derived tables
    DataExplorer,
    /// Statistics, correlations and risk metrics
    AnalyticsAndRisk,
    /// Chart data
    ChartsAndVisualization,
}

impl Section {
    /// All sections, in menu order.
    pub const ALL: [Self; 4] = [
        Self::Overview,
        Self::DataExplorer,
        Self::AnalyticsAndRisk,
        Self::ChartsAndVisualization,
    ];

    /// Display title.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::DataExplorer => "Data Explorer",
            Self::AnalyticsAndRisk => "Analytics & Risk",
            Self::ChartsAndVisualization => "Charts & Visualization",
        }
    }

    /// Machine-readable name used in reports.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::DataExplorer => "data_explorer",
            Self::AnalyticsAndRisk => "analytics_and_risk",
            Self::ChartsAndVisualization => "charts_and_visualization",
        }
    }

    /// Build this section's view.
    pub fn build(
        self,
        snapshot: &Snapshot,
        filtered: &FilteredReturns,
        options: &ViewOptions,
    ) -> Result<SectionView> {
        Ok(match self {
            Self::Overview => {
                SectionView::Overview(OverviewView::build(snapshot, filtered, options)?)
            }
            Self::DataExplorer => {
                SectionView::DataExplorer(ExplorerView::build(snapshot, filtered, options)?)
            }
            Self::AnalyticsAndRisk => {
                SectionView::AnalyticsAndRisk(AnalyticsView::build(filtered, options)?)
            }
            Self::ChartsAndVisualization => {
                SectionView::ChartsAndVisualization(ChartsView::build(filtered)?)
            }
        })
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Settings shared by the view builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    /// Risk level thresholds
    pub thresholds: RiskThresholds,
    /// Rows shown in data previews
    pub preview_rows: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            preview_rows: 15,
        }
    }
}

/// A built section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionView {
    /// Overview figures
    Overview(OverviewView),
    /// Table previews
    DataExplorer(ExplorerView),
    /// Statistics and metrics
    AnalyticsAndRisk(AnalyticsView),
    /// Chart data
    ChartsAndVisualization(ChartsView),
}

impl SectionView {
    /// Section this view belongs to.
    pub const fn section(&self) -> Section {
        match self {
            Self::Overview(_) => Section::Overview,
            Self::DataExplorer(_) => Section::DataExplorer,
            Self::AnalyticsAndRisk(_) => Section::AnalyticsAndRisk,
            Self::ChartsAndVisualization(_) => Section::ChartsAndVisualization,
        }
    }

    /// Render as tables.
    pub fn tables(&self) -> Vec<TextTable> {
        match self {
            Self::Overview(view) => view.tables(),
            Self::DataExplorer(view) => view.tables(),
            Self::AnalyticsAndRisk(view) => view.tables(),
            Self::ChartsAndVisualization(view) => view.tables(),
        }
    }

    /// Wrap in a JSON report envelope.
    pub fn report(&self, filtered: &FilteredReturns) -> Result<Report> {
        Ok(ReportBuilder::new()
            .section(self.section().key())
            .selection(filtered.report_selection()?)
            .contents(self)?
            .build())
    }
}

/// A date-indexed table in presentation form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesView {
    /// Table title
    pub title: String,
    /// Series names
    pub columns: Vec<String>,
    /// Rows in table order
    pub rows: Vec<ReturnRow>,
    #[serde(skip)]
    format: NumberFormat,
}

impl SeriesView {
    /// Convert a table for presentation.
    pub fn from_table(
        title: impl Into<String>,
        table: &TimeSeriesTable,
        format: NumberFormat,
    ) -> Result<Self> {
        let export = FilteredReturnsExport::from_table(table)?;
        Ok(Self {
            title: title.into(),
            columns: export.assets,
            rows: export.rows,
            format,
        })
    }

    /// Render as a `Date | series...` table.
    pub fn to_text_table(&self) -> TextTable {
        let mut table = TextTable::new(
            self.title.clone(),
            std::iter::once("Date".to_string()).chain(self.columns.iter().cloned()),
        );
        for row in &self.rows {
            table.push_values(row.date.to_string(), row.values.iter().copied(), self.format);
        }
        table
    }
}

fn statistics(filtered: &FilteredReturns) -> Result<ReturnStatistics> {
    Ok(ReturnStatistics::from_table(filtered.table())?)
}

/// Headline figures for the selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewView {
    /// Assets with loadings and prices
    pub total_assets: usize,
    /// Assets in the selection
    pub selected_assets: usize,
    /// Dates in the target returns
    pub data_points: usize,
    /// Mean volatility of the selected assets
    pub average_volatility: f64,
    /// Mean return of the selected assets
    pub average_return: f64,
    /// First selected date
    pub start: Option<NaiveDate>,
    /// Last selected date
    pub end: Option<NaiveDate>,
    /// Days between first and last selected date
    pub period_days: Option<i64>,
    /// Classification of the average volatility
    pub risk_level: Option<RiskLevel>,
}

impl OverviewView {
    /// Build from the snapshot and selection.
    pub fn build(
        snapshot: &Snapshot,
        filtered: &FilteredReturns,
        options: &ViewOptions,
    ) -> Result<Self> {
        let stats = statistics(filtered)?;
        let metrics = PortfolioMetrics::compute(&stats, &options.thresholds);
        let range = filtered.table().date_range()?;

        Ok(Self {
            total_assets: snapshot.available_assets().len(),
            selected_assets: filtered.assets().len(),
            data_points: snapshot.target_returns().height(),
            average_volatility: metrics.average_volatility,
            average_return: metrics.average_return,
            start: range.map(|r| r.0),
            end: range.map(|r| r.1),
            period_days: range.map(|(start, end)| (end - start).num_days()),
            risk_level: metrics.risk_level,
        })
    }

    /// Render as tables.
    pub fn tables(&self) -> Vec<TextTable> {
        let date_range = match (self.start, self.end) {
            (Some(start), Some(end)) => format!("{start} to {end}"),
            _ => MISSING.to_string(),
        };
        vec![TextTable::key_value(
            Section::Overview.title(),
            [
                ("Total Assets", self.total_assets.to_string()),
                ("Selected Assets", self.selected_assets.to_string()),
                ("Data Points", self.data_points.to_string()),
                (
                    "Average Volatility",
                    NumberFormat::PERCENT_2.cell(Some(self.average_volatility)),
                ),
                (
                    "Average Return",
                    NumberFormat::PERCENT_4.cell(Some(self.average_return)),
                ),
                ("Date Range", date_range),
                (
                    "Period (days)",
                    self.period_days
                        .map_or_else(|| MISSING.to_string(), |d| d.to_string()),
                ),
                (
                    "Risk Level",
                    self.risk_level
                        .map_or_else(|| MISSING.to_string(), |level| level.to_string()),
                ),
            ],
        )]
    }
}

/// Previews of the input and derived tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorerView {
    /// Leading rows of the rate changes
    pub rate_returns: SeriesView,
    /// Leading rows of the filtered returns
    pub filtered_returns: SeriesView,
    /// Key-rate durations
    pub durations: LabeledMatrix,
    /// Convexities
    pub convexity: LabeledMatrix,
    /// Risk-factor loadings
    pub loadings: LabeledMatrix,
}

impl ExplorerView {
    /// Build from the snapshot and selection.
    pub fn build(
        snapshot: &Snapshot,
        filtered: &FilteredReturns,
        options: &ViewOptions,
    ) -> Result<Self> {
        Ok(Self {
            rate_returns: SeriesView::from_table(
                "Rate Returns",
                &snapshot.rate_returns().head(options.preview_rows),
                NumberFormat::PERCENT_4,
            )?,
            filtered_returns: SeriesView::from_table(
                "Filtered Returns",
                &filtered.table().head(options.preview_rows),
                NumberFormat::PERCENT_4,
            )?,
            durations: snapshot.durations().clone(),
            convexity: snapshot.convexity().clone(),
            loadings: snapshot.loadings().clone(),
        })
    }

    /// Render as tables.
    pub fn tables(&self) -> Vec<TextTable> {
        vec![
            self.rate_returns.to_text_table(),
            self.filtered_returns.to_text_table(),
            matrix_table("Key Rate Durations", &self.durations),
            matrix_table("Convexity", &self.convexity),
            matrix_table("Risk Factor Loadings", &self.loadings),
        ]
    }
}

/// Return statistics and risk metrics for the selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsView {
    /// Average return and volatility per asset
    pub summaries: Vec<AssetSummary>,
    /// Pairwise return correlations
    pub correlation: LabeledMatrix,
    /// Headline risk metrics
    pub metrics: PortfolioMetrics,
}

impl AnalyticsView {
    /// Build from the selection.
    pub fn build(filtered: &FilteredReturns, options: &ViewOptions) -> Result<Self> {
        let stats = statistics(filtered)?;
        let names = stats.names().to_vec();
        Ok(Self {
            summaries: asset_summaries(&stats),
            correlation: LabeledMatrix::new(names.clone(), names, stats.correlation().clone())?,
            metrics: PortfolioMetrics::compute(&stats, &options.thresholds),
        })
    }

    /// Render as tables.
    pub fn tables(&self) -> Vec<TextTable> {
        vec![
            summary_table(&self.summaries),
            correlation_table(self.correlation.row_labels(), self.correlation.values()),
            metrics_table(&self.metrics),
        ]
    }
}

/// Average return of one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageReturn {
    /// Asset identifier
    pub asset: String,
    /// Mean periodic return
    pub average_return: f64,
}

/// Growth of one unit per asset over the selected dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeReturns {
    /// Dates, oldest first
    pub dates: Vec<NaiveDate>,
    /// Asset identifiers
    pub assets: Vec<String>,
    /// One growth path per asset, aligned with `dates`
    pub series: Vec<Vec<f64>>,
}

/// Data behind the dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartsView {
    /// Bar chart of average returns
    pub average_returns: Vec<AverageReturn>,
    /// Scatter of volatility against average return
    pub risk_return: Vec<AssetSummary>,
    /// Line chart of cumulative growth
    pub cumulative: CumulativeReturns,
    /// Box plot of return distributions
    pub distributions: Vec<BoxSummary>,
}

impl ChartsView {
    /// Build from the selection.
    pub fn build(filtered: &FilteredReturns) -> Result<Self> {
        let stats = statistics(filtered)?;
        let risk_return = asset_summaries(&stats);
        let average_returns = risk_return
            .iter()
            .map(|s| AverageReturn {
                asset: s.asset.clone(),
                average_return: s.average_return,
            })
            .collect();

        let returns = filtered.chronological_matrix()?;
        let columns: Vec<Vec<f64>> = returns.columns().into_iter().map(|c| c.to_vec()).collect();
        let cumulative = CumulativeReturns {
            dates: filtered.chronological_dates()?,
            assets: filtered.assets().to_vec(),
            series: columns.iter().map(|c| cumulative_returns(c)).collect(),
        };
        let distributions = filtered
            .assets()
            .iter()
            .zip(&columns)
            .filter_map(|(asset, values)| BoxSummary::from_values(asset.clone(), values))
            .collect();

        Ok(Self {
            average_returns,
            risk_return,
            cumulative,
            distributions,
        })
    }

    /// Render as tables.
    pub fn tables(&self) -> Vec<TextTable> {
        let mut averages = TextTable::new("Average Return by Asset", ["Asset", "Average Return"]);
        for item in &self.average_returns {
            averages.push_values(
                item.asset.clone(),
                [Some(item.average_return)],
                NumberFormat::PERCENT_4,
            );
        }

        let mut risk_return =
            TextTable::new("Risk vs Return", ["Asset", "Volatility", "Average Return"]);
        for point in &self.risk_return {
            risk_return.push_values(
                point.asset.clone(),
                [Some(point.volatility), Some(point.average_return)],
                NumberFormat::PERCENT_4,
            );
        }

        let mut cumulative = TextTable::new(
            "Cumulative Returns",
            std::iter::once("Date".to_string()).chain(self.cumulative.assets.iter().cloned()),
        );
        for (i, date) in self.cumulative.dates.iter().enumerate() {
            cumulative.push_values(
                date.to_string(),
                self.cumulative.series.iter().map(|s| s.get(i).copied()),
                NumberFormat::PLAIN_4,
            );
        }

        vec![
            averages,
            risk_return,
            cumulative,
            distribution_table(&self.distributions),
        ]
    }
}
