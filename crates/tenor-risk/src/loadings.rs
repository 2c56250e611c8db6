//! Risk-factor loadings
//!
//! Projects key-rate moves onto asset price changes through a second-order
//! Taylor expansion:
//!
//! ```text
//! ΔP/P ≈ Σ_k (-D_k) Δr_k + Σ_k (½ C_k) (Δr_k)²
//! ```
//!
//! where `D_k` and `C_k` are the key-rate duration and convexity at tenor `k`.
//! The loadings are fixed coefficients, not fitted: `-1.0 × duration` for the
//! linear terms and `0.5 × convexity` for the quadratic terms.

use ndarray::Array2;
use polars::prelude::*;
use tenor_data::{DATE_COLUMN, LabeledMatrix, TableError, TimeSeriesTable};
use thiserror::Error;
use tracing::{debug, warn};

/// Coefficient applied to key-rate durations (price moves inversely to rates).
pub const DURATION_MULTIPLIER: f64 = -1.0;

/// Coefficient applied to convexities (second-order Taylor term).
pub const CONVEXITY_MULTIPLIER: f64 = 0.5;

/// Suffix of the linear loading columns.
pub const DURATION_SUFFIX: &str = "duration";

/// Suffix of the quadratic loading columns.
pub const CONVEXITY_SUFFIX: &str = "convexity";

/// Errors raised while building loadings or the factor design.
#[derive(Debug, Error)]
pub enum LoadingsError {
    /// Duration and convexity tables disagree on tenors
    #[error("Tenor mismatch: durations have {durations:?}, convexities have {convexity:?}")]
    TenorMismatch {
        /// Tenors of the duration table
        durations: Vec<String>,
        /// Tenors of the convexity table
        convexity: Vec<String>,
    },

    /// Rate curve and loadings disagree on the number of tenors
    #[error("Factor count mismatch: {rate_tenors} rate tenors for {loading_columns} loading columns")]
    FactorCount {
        /// Tenor columns in the rate returns
        rate_tenors: usize,
        /// Columns in the loadings table
        loading_columns: usize,
    },

    /// Table construction error
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Name of a loading column, e.g. `10Y_duration`.
pub fn loading_column(tenor: &str, suffix: &str) -> String {
    format!("{tenor}_{suffix}")
}

/// Build the loadings table from duration and convexity sensitivities.
///
/// Rows are the assets present in both inputs, in duration-table order.
/// Columns are `{tenor}_duration` for every tenor followed by
/// `{tenor}_convexity` for every tenor.
///
/// # Errors
///
/// Returns [`LoadingsError::TenorMismatch`] if the two tables do not carry the
/// same tenor columns in the same order.
pub fn build_loadings(
    durations: &LabeledMatrix,
    convexity: &LabeledMatrix,
) -> Result<LabeledMatrix, LoadingsError> {
    if durations.column_labels() != convexity.column_labels() {
        return Err(LoadingsError::TenorMismatch {
            durations: durations.column_labels().to_vec(),
            convexity: convexity.column_labels().to_vec(),
        });
    }

    let tenors = durations.column_labels();
    let n_tenors = tenors.len();

    // (row in durations, row in convexity) for every shared asset
    let shared: Vec<(usize, usize)> = durations
        .row_labels()
        .iter()
        .enumerate()
        .filter_map(|(i, asset)| convexity.row_index(asset).map(|j| (i, j)))
        .collect();

    if shared.len() < durations.nrows() || shared.len() < convexity.nrows() {
        warn!(
            durations = durations.nrows(),
            convexity = convexity.nrows(),
            shared = shared.len(),
            "assets without both duration and convexity are excluded from loadings"
        );
    }

    let mut values = Array2::<f64>::zeros((shared.len(), 2 * n_tenors));
    for (row, &(i, j)) in shared.iter().enumerate() {
        for k in 0..n_tenors {
            values[[row, k]] = DURATION_MULTIPLIER * durations.values()[[i, k]];
            values[[row, n_tenors + k]] = CONVEXITY_MULTIPLIER * convexity.values()[[j, k]];
        }
    }

    let rows = shared
        .iter()
        .map(|&(i, _)| durations.row_labels()[i].clone())
        .collect();
    let columns = tenors
        .iter()
        .map(|t| loading_column(t, DURATION_SUFFIX))
        .chain(tenors.iter().map(|t| loading_column(t, CONVEXITY_SUFFIX)))
        .collect();

    Ok(LabeledMatrix::new(rows, columns, values)?)
}

/// Build the factor design matrix `X` from rate returns.
///
/// The rate-change columns are followed by their element-wise squares and
/// relabeled positionally with the loadings' column names, so that `X` and
/// the loadings line up column for column.
///
/// # Errors
///
/// Returns [`LoadingsError::FactorCount`] when the loadings do not have
/// exactly two columns per rate tenor.
pub fn factor_design(
    rate_returns: &TimeSeriesTable,
    loadings: &LabeledMatrix,
) -> Result<TimeSeriesTable, LoadingsError> {
    let tenors = rate_returns.column_names();
    let columns = loadings.column_labels();

    if columns.len() != 2 * tenors.len() {
        return Err(LoadingsError::FactorCount {
            rate_tenors: tenors.len(),
            loading_columns: columns.len(),
        });
    }

    let (linear, quadratic) = columns.split_at(tenors.len());
    for (tenor, name) in tenors.iter().zip(linear) {
        if *name != loading_column(tenor, DURATION_SUFFIX) {
            debug!(tenor = %tenor, column = %name, "rate tenor relabeled positionally");
        }
    }

    let mut exprs = Vec::with_capacity(columns.len() + 1);
    exprs.push(col(DATE_COLUMN));
    exprs.extend(
        tenors
            .iter()
            .zip(linear)
            .map(|(tenor, name)| col(tenor.as_str()).alias(name.as_str())),
    );
    exprs.extend(tenors.iter().zip(quadratic).map(|(tenor, name)| {
        (col(tenor.as_str()) * col(tenor.as_str())).alias(name.as_str())
    }));

    let frame = rate_returns.lazy().select(exprs).collect()?;
    Ok(TimeSeriesTable::from_frame(frame)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ndarray::array;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn durations() -> LabeledMatrix {
        LabeledMatrix::new(
            labels(&["BOND_A", "BOND_B", "BOND_C"]),
            labels(&["2Y", "10Y"]),
            array![[1.8, 0.2], [0.3, 7.1], [0.0, 4.0]],
        )
        .unwrap()
    }

    fn convexity() -> LabeledMatrix {
        LabeledMatrix::new(
            labels(&["BOND_B", "BOND_A"]),
            labels(&["2Y", "10Y"]),
            array![[0.01, 0.6], [0.04, 0.02]],
        )
        .unwrap()
    }

    #[test]
    fn test_loadings_shape_and_values() {
        let loadings = build_loadings(&durations(), &convexity()).unwrap();

        assert_eq!(loadings.row_labels(), ["BOND_A", "BOND_B"]);
        assert_eq!(
            loadings.column_labels(),
            ["2Y_duration", "10Y_duration", "2Y_convexity", "10Y_convexity"]
        );
        assert_eq!(loadings.ncols(), 2 * durations().ncols());

        assert_relative_eq!(loadings.get("BOND_A", "2Y_duration").unwrap(), -1.8);
        assert_relative_eq!(loadings.get("BOND_B", "10Y_duration").unwrap(), -7.1);
        assert_relative_eq!(loadings.get("BOND_A", "2Y_convexity").unwrap(), 0.02);
        assert_relative_eq!(loadings.get("BOND_B", "10Y_convexity").unwrap(), 0.3);
    }

    #[test]
    fn test_every_loading_matches_its_source_cell() {
        let (d, c) = (durations(), convexity());
        let loadings = build_loadings(&d, &c).unwrap();

        for asset in loadings.row_labels() {
            for tenor in d.column_labels() {
                let dur = loadings
                    .get(asset, &loading_column(tenor, DURATION_SUFFIX))
                    .unwrap();
                let cvx = loadings
                    .get(asset, &loading_column(tenor, CONVEXITY_SUFFIX))
                    .unwrap();
                assert_eq!(dur, -1.0 * d.get(asset, tenor).unwrap());
                assert_eq!(cvx, 0.5 * c.get(asset, tenor).unwrap());
            }
        }
    }

    #[test]
    fn test_tenor_mismatch() {
        let other = LabeledMatrix::new(
            labels(&["BOND_A"]),
            labels(&["10Y", "2Y"]),
            array![[0.1, 0.2]],
        )
        .unwrap();

        assert!(matches!(
            build_loadings(&durations(), &other),
            Err(LoadingsError::TenorMismatch { .. })
        ));
    }

    fn rate_returns() -> TimeSeriesTable {
        TimeSeriesTable::new(
            &[
                NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            ],
            vec![
                ("2Y".to_string(), vec![Some(-0.0015), Some(0.001)]),
                ("10Y".to_string(), vec![Some(0.002), Some(-0.0005)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_factor_design_columns_follow_loadings() {
        let loadings = build_loadings(&durations(), &convexity()).unwrap();
        let design = factor_design(&rate_returns(), &loadings).unwrap();

        assert_eq!(design.column_names(), loadings.column_labels());
        assert_eq!(design.dates().unwrap(), rate_returns().dates().unwrap());

        let linear = design.values("2Y_duration").unwrap();
        let squared = design.values("2Y_convexity").unwrap();
        assert_relative_eq!(linear[0].unwrap(), -0.0015);
        assert_relative_eq!(squared[0].unwrap(), 0.0015 * 0.0015);
        assert_relative_eq!(squared[1].unwrap(), 0.001 * 0.001);
    }

    #[test]
    fn test_factor_design_count_mismatch() {
        let loadings = LabeledMatrix::new(
            labels(&["BOND_A"]),
            labels(&["2Y_duration", "2Y_convexity"]),
            array![[-1.0, 0.1]],
        )
        .unwrap();

        assert!(matches!(
            factor_design(&rate_returns(), &loadings),
            Err(LoadingsError::FactorCount {
                rate_tenors: 2,
                loading_columns: 2
            })
        ));
    }
}
