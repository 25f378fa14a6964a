//! Coefficient-of-variation scoring
//!
//! The same bucketing drives forecast confidence and the volatility label of
//! any other value series (see [`RiskProfile`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::ConfidenceConfig;
use super::methods::{mean, std_dev};
use super::types::ConfidenceLevel;

/// Dispersion statistics of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub mean: f64,
    pub standard_deviation: f64,
    pub coefficient_of_variation: f64,
    pub level: ConfidenceLevel,
}

#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    config: ConfidenceConfig,
}

impl ConfidenceScorer {
    pub fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    /// `stddev / mean * 100`, or 100 when the mean is zero
    pub fn coefficient_of_variation(values: &[f64]) -> f64 {
        let m = mean(values);
        if m == 0.0 {
            return 100.0;
        }
        std_dev(values) / m * 100.0
    }

    /// Bucket a CV (lower bounds inclusive)
    pub fn classify(&self, cv: f64) -> ConfidenceLevel {
        if cv < self.config.very_high_below {
            ConfidenceLevel::VeryHigh
        } else if cv < self.config.high_below {
            ConfidenceLevel::High
        } else if cv < self.config.medium_below {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn score(&self, values: &[f64]) -> ConfidenceScore {
        let cv = Self::coefficient_of_variation(values);
        ConfidenceScore {
            mean: mean(values),
            standard_deviation: std_dev(values),
            coefficient_of_variation: cv,
            level: self.classify(cv),
        }
    }
}

/// Risk label, the inverse of confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very_high",
        }
    }
}

impl From<ConfidenceLevel> for RiskLevel {
    fn from(level: ConfidenceLevel) -> Self {
        match level {
            ConfidenceLevel::VeryHigh => RiskLevel::Low,
            ConfidenceLevel::High => RiskLevel::Medium,
            ConfidenceLevel::Medium => RiskLevel::High,
            ConfidenceLevel::Low => RiskLevel::VeryHigh,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Volatility profile of an arbitrary value series (asset values, balances)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Coefficient of variation of the values
    pub volatility: f64,
    pub risk: RiskLevel,
    /// Mean period return over the stddev of period returns
    pub sharpe_ratio: f64,
}

impl RiskProfile {
    pub fn from_values(scorer: &ConfidenceScorer, values: &[f64]) -> Self {
        let score = scorer.score(values);

        let returns: Vec<f64> = values
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();

        let return_sd = std_dev(&returns);
        let sharpe_ratio = if returns.is_empty() || return_sd == 0.0 {
            0.0
        } else {
            mean(&returns) / return_sd
        };

        Self {
            volatility: score.coefficient_of_variation,
            risk: score.level.into(),
            sharpe_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_series_is_very_high() {
        let scorer = ConfidenceScorer::default();
        let score = scorer.score(&[250.0; 12]);
        assert_eq!(score.coefficient_of_variation, 0.0);
        assert_eq!(score.level, ConfidenceLevel::VeryHigh);
    }

    #[test]
    fn test_zero_mean_is_lowest_confidence() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(ConfidenceScorer::coefficient_of_variation(&[0.0; 12]), 100.0);
        assert_eq!(scorer.score(&[0.0; 12]).level, ConfidenceLevel::Low);
    }

    #[test]
    fn test_bucket_boundaries() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(scorer.classify(14.999), ConfidenceLevel::VeryHigh);
        assert_eq!(scorer.classify(15.0), ConfidenceLevel::High);
        assert_eq!(scorer.classify(29.999), ConfidenceLevel::High);
        assert_eq!(scorer.classify(30.0), ConfidenceLevel::Medium);
        assert_eq!(scorer.classify(49.999), ConfidenceLevel::Medium);
        assert_eq!(scorer.classify(50.0), ConfidenceLevel::Low);
    }

    #[test]
    fn test_alternating_series_cv() {
        // mean 100, population stddev 50
        let values: Vec<f64> = (0..12).map(|i| if i % 2 == 0 { 50.0 } else { 150.0 }).collect();
        let cv = ConfidenceScorer::coefficient_of_variation(&values);
        assert!((cv - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_profile_steady_growth() {
        let scorer = ConfidenceScorer::default();
        let values = [100.0, 101.0, 102.0, 103.0];
        let profile = RiskProfile::from_values(&scorer, &values);
        assert_eq!(profile.risk, RiskLevel::Low);
        assert!(profile.sharpe_ratio > 0.0);
    }

    #[test]
    fn test_risk_profile_degenerate() {
        let scorer = ConfidenceScorer::default();
        let flat = RiskProfile::from_values(&scorer, &[10.0; 5]);
        assert_eq!(flat.sharpe_ratio, 0.0);
        assert_eq!(flat.volatility, 0.0);

        let empty = RiskProfile::from_values(&scorer, &[]);
        assert_eq!(empty.sharpe_ratio, 0.0);
        assert_eq!(empty.risk, RiskLevel::VeryHigh);
    }
}
