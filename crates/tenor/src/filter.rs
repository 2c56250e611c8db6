//! Asset and date selection over the target returns.

use crate::error::{PipelineError, Result};
use crate::pipeline::Snapshot;
use chrono::NaiveDate;
use ndarray::{Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tenor_data::table::to_epoch_days;
use tenor_data::{DATE_COLUMN, TimeSeriesTable};
use tenor_output::ReportSelection;
use tracing::warn;

/// Inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window; `start` must not be after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(PipelineError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// First date included.
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date included.
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Window bounded by optional dates, open ends taken from `range`.
    ///
    /// `None` when both ends are open and `range` is unknown.
    pub fn from_bounds(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Option<Self>> {
        let start = start.or(range.map(|r| r.0));
        let end = end.or(range.map(|r| r.1));
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            (Some(start), None) => Self::new(start, NaiveDate::MAX).map(Some),
            (None, Some(end)) => Self::new(NaiveDate::MIN, end).map(Some),
            (None, None) => Ok(None),
        }
    }
}

/// Assets and dates to show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Requested asset identifiers
    pub assets: Vec<String>,
    /// Dates to keep; `None` keeps every date
    pub window: Option<DateWindow>,
}

impl Selection {
    /// Select `assets` over `window`.
    pub const fn new(assets: Vec<String>, window: Option<DateWindow>) -> Self {
        Self { assets, window }
    }

    /// The first `count` available assets over the full date range.
    pub fn default_for(snapshot: &Snapshot, count: usize) -> Result<Self> {
        let assets = snapshot.available_assets().into_iter().take(count).collect();
        let window = snapshot
            .date_range()?
            .map(|(start, end)| DateWindow::new(start, end))
            .transpose()?;
        Ok(Self { assets, window })
    }
}

/// Target returns restricted to a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredReturns {
    assets: Vec<String>,
    returns: TimeSeriesTable,
}

impl FilteredReturns {
    /// Selected assets that exist, in selection order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// The filtered table, newest first.
    pub const fn table(&self) -> &TimeSeriesTable {
        &self.returns
    }

    /// Number of dates kept.
    pub fn height(&self) -> usize {
        self.returns.height()
    }

    /// Whether no dates or no assets were kept.
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty() || self.assets.is_empty()
    }

    /// Dates oldest first.
    pub fn chronological_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut dates = self.returns.dates()?;
        dates.reverse();
        Ok(dates)
    }

    /// `(dates x assets)` return matrix, oldest first; missing values are NaN.
    pub fn chronological_matrix(&self) -> Result<Array2<f64>> {
        let mut matrix = self.returns.to_matrix()?;
        matrix.invert_axis(Axis(0));
        Ok(matrix)
    }

    /// Selection summary for reports.
    pub fn report_selection(&self) -> Result<ReportSelection> {
        let range = self.returns.date_range()?;
        Ok(ReportSelection {
            assets: self.assets.clone(),
            start: range.map(|r| r.0),
            end: range.map(|r| r.1),
        })
    }
}

impl Snapshot {
    /// Project the target returns onto `selection`.
    ///
    /// Unknown asset identifiers are ignored with a warning. An empty asset
    /// list or a window without dates gives an empty table, not an error.
    pub fn filter(&self, selection: &Selection) -> Result<FilteredReturns> {
        let target = self.target_returns();

        let mut seen = HashSet::new();
        let mut assets = Vec::with_capacity(selection.assets.len());
        let mut unknown = Vec::new();
        for asset in &selection.assets {
            if !seen.insert(asset.as_str()) {
                continue;
            }
            if target.has_column(asset) {
                assets.push(asset.clone());
            } else {
                unknown.push(asset.as_str());
            }
        }
        if !unknown.is_empty() {
            warn!(?unknown, "ignoring unknown assets in selection");
        }

        let mut exprs = vec![col(DATE_COLUMN)];
        exprs.extend(assets.iter().map(|asset| col(asset.as_str())));
        let mut frame = target.lazy().select(exprs);

        if let Some(window) = selection.window {
            let days = col(DATE_COLUMN).cast(DataType::Int32);
            frame = frame.filter(
                days.clone()
                    .gt_eq(lit(to_epoch_days(window.start())))
                    .and(days.lt_eq(lit(to_epoch_days(window.end())))),
            );
        }

        Ok(FilteredReturns {
            assets,
            returns: TimeSeriesTable::from_frame(frame.collect()?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_window_rejects_reversed_bounds() {
        assert!(DateWindow::new(date(3), date(3)).is_ok());
        assert!(matches!(
            DateWindow::new(date(4), date(3)),
            Err(PipelineError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_window_from_bounds() {
        let range = Some((date(2), date(9)));
        let window = DateWindow::from_bounds(Some(date(4)), None, range)
            .unwrap()
            .unwrap();
        assert_eq!((window.start(), window.end()), (date(4), date(9)));

        assert_eq!(DateWindow::from_bounds(None, None, None).unwrap(), None);
        assert!(DateWindow::from_bounds(Some(date(9)), Some(date(2)), range).is_err());

        let open = DateWindow::from_bounds(None, Some(date(4)), None)
            .unwrap()
            .unwrap();
        assert_eq!((open.start(), open.end()), (NaiveDate::MIN, date(4)));
    }
}
