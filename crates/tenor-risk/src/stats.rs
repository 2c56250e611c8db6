//! Per-asset return statistics.
//!
//! Computed as polars aggregations over a [`TimeSeriesTable`]. Nulls are
//! skipped, pairwise for correlations, so an asset with gaps still
//! contributes over the dates it has. Statistics without enough observations
//! are `NaN`.

use ndarray::{Array1, Array2};
use polars::prelude::*;
use tenor_data::{TableError, TimeSeriesTable};
use thiserror::Error;

/// Errors from statistics computation.
#[derive(Debug, Error)]
pub enum StatsError {
    /// Table access error
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Polars error during aggregation
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Mean, volatility and correlation of a set of return series.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatistics {
    names: Vec<String>,
    observations: usize,
    mean: Array1<f64>,
    std_dev: Array1<f64>,
    worst: Array1<f64>,
    correlation: Array2<f64>,
}

fn mean_alias(i: usize) -> String {
    format!("mean_{i}")
}

fn std_alias(i: usize) -> String {
    format!("std_{i}")
}

fn min_alias(i: usize) -> String {
    format!("min_{i}")
}

fn corr_alias(i: usize, j: usize) -> String {
    format!("corr_{i}_{j}")
}

fn scalar(frame: &DataFrame, name: &str) -> Result<f64, StatsError> {
    Ok(frame
        .column(name)?
        .cast(&DataType::Float64)?
        .f64()?
        .get(0)
        .unwrap_or(f64::NAN))
}

impl ReturnStatistics {
    /// Compute statistics for every value column of `returns`.
    ///
    /// Standard deviations use the sample (`n - 1`) denominator.
    pub fn from_table(returns: &TimeSeriesTable) -> Result<Self, StatsError> {
        let names = returns.column_names();
        let n = names.len();

        let mut mean = Array1::from_elem(n, f64::NAN);
        let mut std_dev = Array1::from_elem(n, f64::NAN);
        let mut worst = Array1::from_elem(n, f64::NAN);
        let mut correlation = Array2::from_elem((n, n), f64::NAN);

        if n > 0 {
            let mut exprs = Vec::with_capacity(3 * n + n * (n + 1) / 2);
            for (i, name) in names.iter().enumerate() {
                let series = col(name.as_str());
                exprs.push(series.clone().mean().alias(mean_alias(i)));
                exprs.push(series.clone().std(1).alias(std_alias(i)));
                exprs.push(series.min().alias(min_alias(i)));
                for (j, other) in names.iter().enumerate().skip(i) {
                    exprs.push(
                        pearson_corr(col(name.as_str()), col(other.as_str()))
                            .alias(corr_alias(i, j)),
                    );
                }
            }
            let summary = returns.lazy().select(exprs).collect()?;

            for i in 0..n {
                mean[i] = scalar(&summary, &mean_alias(i))?;
                std_dev[i] = scalar(&summary, &std_alias(i))?;
                worst[i] = scalar(&summary, &min_alias(i))?;
                for j in i..n {
                    let rho = scalar(&summary, &corr_alias(i, j))?;
                    correlation[[i, j]] = rho;
                    correlation[[j, i]] = rho;
                }
            }
        }

        Ok(Self {
            names,
            observations: returns.height(),
            mean,
            std_dev,
            worst,
            correlation,
        })
    }

    /// Series names, in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of dates the statistics were computed over.
    pub const fn observations(&self) -> usize {
        self.observations
    }

    /// Mean return per series.
    pub const fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Sample standard deviation per series.
    pub const fn std_dev(&self) -> &Array1<f64> {
        &self.std_dev
    }

    /// Lowest single-period return per series.
    pub const fn worst(&self) -> &Array1<f64> {
        &self.worst
    }

    /// `N x N` Pearson correlation matrix.
    pub const fn correlation(&self) -> &Array2<f64> {
        &self.correlation
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Mean return of one series.
    pub fn mean_of(&self, name: &str) -> Option<f64> {
        self.index_of(name).map(|i| self.mean[i])
    }

    /// Volatility of one series.
    pub fn std_dev_of(&self, name: &str) -> Option<f64> {
        self.index_of(name).map(|i| self.std_dev[i])
    }

    /// Correlation between two series.
    pub fn correlation_of(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.correlation[[self.index_of(a)?, self.index_of(b)?]])
    }
}
