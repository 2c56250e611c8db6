//! The derived-table snapshot.
//!
//! Built once from the four inputs:
//!
//! 1. RateCurve and AssetPrices are restricted to their common dates.
//! 2. RateReturns are first differences of rate levels, AssetReturns are
//!    simple percentage changes over forward-filled prices. Both are indexed
//!    by date, newest first, and drop any row with a null or NaN (the
//!    earliest common date always).
//! 3. Loadings combine durations and convexities; FactorDesign pairs the rate
//!    changes with their squares under the loadings' column names.
//! 4. TargetReturns keeps the assets that have loadings.

use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use tenor_data::{
    DATE_COLUMN, DataError, InputFiles, InputKind, InputTables, LabeledMatrix, TimeSeriesTable,
};
use tenor_risk::{LoadingsError, build_loadings, factor_design};
use tracing::{debug, info, warn};

/// Every table the dashboard works from.
///
/// Immutable once built; share it by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    rate_returns: TimeSeriesTable,
    asset_returns: TimeSeriesTable,
    durations: LabeledMatrix,
    convexity: LabeledMatrix,
    loadings: LabeledMatrix,
    factor_design: TimeSeriesTable,
    target_returns: TimeSeriesTable,
}

/// Rows of `table` on dates that also appear in `other`, oldest first.
fn on_common_dates(table: &TimeSeriesTable, other: &TimeSeriesTable) -> LazyFrame {
    table
        .lazy()
        .join(
            other.lazy().select([col(DATE_COLUMN)]),
            [col(DATE_COLUMN)],
            [col(DATE_COLUMN)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([DATE_COLUMN], SortMultipleOptions::default())
}

/// Drop rows with a null or NaN in any of `columns`, then sort newest first.
fn newest_first(frame: LazyFrame, columns: &[String]) -> Result<TimeSeriesTable> {
    let mut frame = frame.drop_nulls(None);
    if !columns.is_empty() {
        let defined: Vec<Expr> = columns
            .iter()
            .map(|c| col(c.as_str()).is_not_nan())
            .collect();
        frame = frame.filter(all_horizontal(defined)?);
    }
    let frame = frame
        .sort(
            [DATE_COLUMN],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .collect()?;
    Ok(TimeSeriesTable::from_frame(frame)?)
}

/// First differences of every series.
fn differences(aligned: LazyFrame, columns: &[String]) -> Result<TimeSeriesTable> {
    let exprs: Vec<Expr> = columns
        .iter()
        .map(|c| (col(c.as_str()) - col(c.as_str()).shift(lit(1))).alias(c.as_str()))
        .collect();
    newest_first(aligned.with_columns(exprs), columns)
}

/// Simple percentage changes of every series.
///
/// A missing price carries the last known price forward, so the gap date
/// shows no change and the next date is measured from the last known price.
fn percentage_changes(aligned: LazyFrame, columns: &[String]) -> Result<TimeSeriesTable> {
    let exprs: Vec<Expr> = columns
        .iter()
        .map(|c| {
            let price = col(c.as_str()).forward_fill(None);
            (price.clone() / price.shift(lit(1)) - lit(1.0)).alias(c.as_str())
        })
        .collect();
    newest_first(aligned.with_columns(exprs), columns)
}

impl Snapshot {
    /// Check, read and derive everything from the input files.
    ///
    /// # Errors
    ///
    /// [`DataError::MissingInput`] naming every absent file, or
    /// [`DataError::UnreadableInput`] naming the file that could not be read
    /// or whose layout does not fit the others.
    pub fn load(files: &InputFiles) -> Result<Self> {
        Self::load_with(files, |_| {})
    }

    /// As [`Snapshot::load`], calling `on_read` before each file is read.
    pub fn load_with<F>(files: &InputFiles, on_read: F) -> Result<Self>
    where
        F: FnMut(InputKind),
    {
        let tables = files.load_with(on_read)?;
        Self::from_tables(tables).map_err(|err| {
            let kind = match &err {
                PipelineError::Loadings(LoadingsError::TenorMismatch { .. }) => {
                    InputKind::Convexity
                }
                PipelineError::Loadings(LoadingsError::FactorCount { .. }) => InputKind::KeyRates,
                _ => return err,
            };
            DataError::unreadable(files.file_name(kind), format!("unexpected schema: {err}"))
                .into()
        })
    }

    /// Derive everything from tables already in memory.
    pub fn from_tables(inputs: InputTables) -> Result<Self> {
        let tenors = inputs.rate_curve.column_names();
        let assets = inputs.asset_prices.column_names();

        let rate_returns = differences(
            on_common_dates(&inputs.rate_curve, &inputs.asset_prices),
            &tenors,
        )?;
        let asset_returns = percentage_changes(
            on_common_dates(&inputs.asset_prices, &inputs.rate_curve),
            &assets,
        )?;
        debug!(
            rate_rows = rate_returns.height(),
            asset_rows = asset_returns.height(),
            "derived period returns"
        );

        let loadings = build_loadings(&inputs.durations, &inputs.convexity)?;
        let factor_design = factor_design(&rate_returns, &loadings)?;

        let (kept, dropped): (Vec<&String>, Vec<&String>) = loadings
            .row_labels()
            .iter()
            .partition(|asset| asset_returns.has_column(asset));
        if !dropped.is_empty() {
            warn!(?dropped, "assets with loadings but no prices are excluded from target returns");
        }

        let mut exprs = vec![col(DATE_COLUMN)];
        exprs.extend(kept.iter().map(|asset| col(asset.as_str())));
        let target_returns =
            TimeSeriesTable::from_frame(asset_returns.lazy().select(exprs).collect()?)?;

        info!(
            dates = target_returns.height(),
            assets = target_returns.column_names().len(),
            tenors = tenors.len(),
            "snapshot ready"
        );

        Ok(Self {
            rate_returns,
            asset_returns,
            durations: inputs.durations,
            convexity: inputs.convexity,
            loadings,
            factor_design,
            target_returns,
        })
    }

    /// Rate changes by date and tenor, newest first.
    pub const fn rate_returns(&self) -> &TimeSeriesTable {
        &self.rate_returns
    }

    /// Asset returns by date and asset, newest first.
    pub const fn asset_returns(&self) -> &TimeSeriesTable {
        &self.asset_returns
    }

    /// Key-rate durations as read.
    pub const fn durations(&self) -> &LabeledMatrix {
        &self.durations
    }

    /// Convexities as read.
    pub const fn convexity(&self) -> &LabeledMatrix {
        &self.convexity
    }

    /// Risk-factor loadings, asset x factor.
    pub const fn loadings(&self) -> &LabeledMatrix {
        &self.loadings
    }

    /// Linear and quadratic rate factors, date x factor.
    pub const fn factor_design(&self) -> &TimeSeriesTable {
        &self.factor_design
    }

    /// Returns of the assets that have loadings.
    pub const fn target_returns(&self) -> &TimeSeriesTable {
        &self.target_returns
    }

    /// Assets that can be selected, in loadings order.
    pub fn available_assets(&self) -> Vec<String> {
        self.target_returns.column_names()
    }

    /// First and last date of the target returns.
    pub fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        Ok(self.target_returns.date_range()?)
    }
}
