//! Return distributions: quartile summaries and cumulative growth.

use serde::{Deserialize, Serialize};

/// Whisker reach in interquartile ranges.
pub const WHISKER_IQR: f64 = 1.5;

/// Quantile of sorted data by linear interpolation between closest ranks.
///
/// `q` is clamped to `[0, 1]`; `NaN` for empty input.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Five-number summary of one return series, as drawn in a box plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    /// Series name
    pub name: String,
    /// Finite observations
    pub count: usize,
    /// Smallest observation
    pub min: f64,
    /// Smallest observation within `WHISKER_IQR` of the first quartile
    pub lower_whisker: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Largest observation within `WHISKER_IQR` of the third quartile
    pub upper_whisker: f64,
    /// Largest observation
    pub max: f64,
    /// Observations beyond the whiskers
    pub outliers: usize,
}

impl BoxSummary {
    /// Summarize the finite values of a series; `None` if there are none.
    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        // Quartiles lie inside the data range, so both fences admit at least one value
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|v| *v >= low_fence)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .filter(|v| **v < lower_whisker || **v > upper_whisker)
            .count();

        Some(Self {
            name: name.into(),
            count: sorted.len(),
            min: sorted[0],
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            max: sorted[sorted.len() - 1],
            outliers,
        })
    }
}

/// Growth of one unit invested, compounding `returns` in the order given.
///
/// Pass returns in chronological order. Missing values are treated as flat
/// periods.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |growth, r| {
            if r.is_finite() {
                *growth *= 1.0 + r;
            }
            Some(*growth)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(0.25, 1.75)]
    #[case(0.5, 2.5)]
    #[case(0.75, 3.25)]
    #[case(1.0, 4.0)]
    fn test_quantile_interpolates(#[case] q: f64, #[case] expected: f64) {
        assert_relative_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], q), expected);
    }

    #[test]
    fn test_quantile_empty() {
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_box_summary_with_outlier() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0, f64::NAN];
        let summary = BoxSummary::from_values("A", &values).unwrap();

        assert_eq!(summary.count, 9);
        assert_relative_eq!(summary.q1, 3.0);
        assert_relative_eq!(summary.median, 5.0);
        assert_relative_eq!(summary.q3, 7.0);
        assert_relative_eq!(summary.lower_whisker, 1.0);
        assert_relative_eq!(summary.upper_whisker, 8.0);
        assert_relative_eq!(summary.max, 100.0);
        assert_eq!(summary.outliers, 1);
    }

    #[test]
    fn test_box_summary_single_value() {
        let summary = BoxSummary::from_values("A", &[0.5]).unwrap();
        assert_eq!(summary.min, 0.5);
        assert_eq!(summary.median, 0.5);
        assert_eq!(summary.upper_whisker, 0.5);
        assert_eq!(summary.outliers, 0);
        assert!(BoxSummary::from_values("B", &[f64::NAN]).is_none());
    }

    #[test]
    fn test_cumulative_returns() {
        let growth = cumulative_returns(&[0.1, -0.5, f64::NAN, 1.0]);
        assert_eq!(growth.len(), 4);
        assert_relative_eq!(growth[0], 1.1, epsilon = 1e-12);
        assert_relative_eq!(growth[1], 0.55, epsilon = 1e-12);
        assert_relative_eq!(growth[2], 0.55, epsilon = 1e-12);
        assert_relative_eq!(growth[3], 1.1, epsilon = 1e-12);
    }
}
