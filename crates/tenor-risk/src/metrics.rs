//! Headline portfolio metrics and risk classification.

use crate::stats::ReturnStatistics;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse risk bucket for an average volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Below the medium threshold
    Low,
    /// Between the medium and high thresholds
    Medium,
    /// Above the high threshold
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Volatility thresholds separating the risk levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Volatility at or above which risk is at least `Medium`
    pub medium: f64,
    /// Volatility above which risk is `High`
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 0.02,
            high: 0.05,
        }
    }
}

impl RiskThresholds {
    /// Classify a volatility; `None` if it is not finite.
    pub fn classify(&self, volatility: f64) -> Option<RiskLevel> {
        if !volatility.is_finite() {
            return None;
        }
        Some(if volatility < self.medium {
            RiskLevel::Low
        } else if volatility <= self.high {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        })
    }
}

/// Summary metrics over the selected assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Mean of the per-asset volatilities
    pub average_volatility: f64,
    /// Mean of the per-asset mean returns
    pub average_return: f64,
    /// Worst single-period return across all selected assets
    pub worst_return: f64,
    /// Average return over average volatility
    pub sharpe_ratio: Option<f64>,
    /// Classification of the average volatility
    pub risk_level: Option<RiskLevel>,
}

fn finite_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

impl PortfolioMetrics {
    /// Compute the metrics from per-asset statistics.
    ///
    /// Undefined values (no observations, a single observation) are `NaN`
    /// rather than errors; the Sharpe-like ratio and risk level are `None`
    /// when the volatility is zero or undefined.
    pub fn compute(stats: &ReturnStatistics, thresholds: &RiskThresholds) -> Self {
        let average_volatility = finite_mean(stats.std_dev().iter().copied());
        let average_return = finite_mean(stats.mean().iter().copied());
        let worst_return = stats
            .worst()
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f64::NAN, f64::min);

        let sharpe_ratio = (average_volatility.is_finite() && average_volatility != 0.0
            && average_return.is_finite())
        .then(|| average_return / average_volatility);

        Self {
            average_volatility,
            average_return,
            worst_return,
            sharpe_ratio,
            risk_level: thresholds.classify(average_volatility),
        }
    }
}
