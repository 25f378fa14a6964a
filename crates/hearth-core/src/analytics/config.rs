//! Engine tunables
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/hearth/config/analytics.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Every key is optional in the TOML; missing keys keep the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../../config/analytics.toml");

/// Ensemble blend and trend settings
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleConfig {
    pub linear_weight: f64,
    pub ema_weight: f64,
    pub weighted_weight: f64,
    pub ema_alpha: f64,
    pub weighted_step: f64,
    pub trend_threshold: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            linear_weight: 0.3,
            ema_weight: 0.3,
            weighted_weight: 0.4,
            ema_alpha: 0.3,
            weighted_step: 0.2,
            trend_threshold: 0.05,
        }
    }
}

/// Coefficient-of-variation bucket bounds (exclusive upper bounds)
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceConfig {
    pub very_high_below: f64,
    pub high_below: f64,
    pub medium_below: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            very_high_below: 15.0,
            high_below: 30.0,
            medium_below: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub rounding_unit: f64,
    pub conservative_sigma: f64,
    pub moderate_sigma: f64,
    pub aggressive_sigma: f64,
    pub conservative_cv_above: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            rounding_unit: 1000.0,
            conservative_sigma: 1.5,
            moderate_sigma: 0.5,
            aggressive_sigma: -0.3,
            conservative_cv_above: 40.0,
        }
    }
}

/// Utilization thresholds (percent) for live tracking
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub critical_at: f64,
    pub danger_at: f64,
    pub warning_at: f64,
    pub info_at: f64,
    pub on_track_tolerance: f64,
    pub projection_over_above: f64,
    pub projection_warning_above: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            critical_at: 150.0,
            danger_at: 100.0,
            warning_at: 90.0,
            info_at: 75.0,
            on_track_tolerance: 1.1,
            projection_over_above: 100.0,
            projection_warning_above: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioConfig {
    pub ai_optimized_max_income_percent: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            ai_optimized_max_income_percent: 70.0,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub ensemble: EnsembleConfig,
    pub confidence: ConfidenceConfig,
    pub strategy: StrategyConfig,
    pub tracker: TrackerConfig,
    pub portfolio: PortfolioConfig,
}

impl EngineConfig {
    /// Load config (override first, then embedded default)
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path().as_deref())
    }

    /// Load config from a specific override path, falling back to the embedded default
    pub fn load_from(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "Loading analytics config override");
                fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
            }
            _ => DEFAULT_CONFIG.to_string(),
        };

        Self::parse(&content)
    }

    /// Parse config from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(e) = raw.ensemble {
            let c = &mut config.ensemble;
            apply(&mut c.linear_weight, e.linear_weight);
            apply(&mut c.ema_weight, e.ema_weight);
            apply(&mut c.weighted_weight, e.weighted_weight);
            apply(&mut c.ema_alpha, e.ema_alpha);
            apply(&mut c.weighted_step, e.weighted_step);
            apply(&mut c.trend_threshold, e.trend_threshold);
        }

        if let Some(cf) = raw.confidence {
            let c = &mut config.confidence;
            apply(&mut c.very_high_below, cf.very_high_below);
            apply(&mut c.high_below, cf.high_below);
            apply(&mut c.medium_below, cf.medium_below);
        }

        if let Some(s) = raw.strategy {
            let c = &mut config.strategy;
            apply(&mut c.rounding_unit, s.rounding_unit);
            apply(&mut c.conservative_sigma, s.conservative_sigma);
            apply(&mut c.moderate_sigma, s.moderate_sigma);
            apply(&mut c.aggressive_sigma, s.aggressive_sigma);
            apply(&mut c.conservative_cv_above, s.conservative_cv_above);
        }

        if let Some(t) = raw.tracker {
            let c = &mut config.tracker;
            apply(&mut c.critical_at, t.critical_at);
            apply(&mut c.danger_at, t.danger_at);
            apply(&mut c.warning_at, t.warning_at);
            apply(&mut c.info_at, t.info_at);
            apply(&mut c.on_track_tolerance, t.on_track_tolerance);
            apply(&mut c.projection_over_above, t.projection_over_above);
            apply(&mut c.projection_warning_above, t.projection_warning_above);
        }

        if let Some(p) = raw.portfolio {
            apply(
                &mut config.portfolio.ai_optimized_max_income_percent,
                p.ai_optimized_max_income_percent,
            );
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let unit = self.strategy.rounding_unit;
        if !(unit > 0.0 && unit.is_finite()) {
            return Err(Error::Config(format!(
                "strategy.rounding_unit must be a positive number, got {}",
                unit
            )));
        }
        if !(0.0..=1.0).contains(&self.ensemble.ema_alpha) {
            return Err(Error::Config(format!(
                "ensemble.ema_alpha must be within 0..=1, got {}",
                self.ensemble.ema_alpha
            )));
        }
        let c = &self.confidence;
        if !(c.very_high_below <= c.high_below && c.high_below <= c.medium_below) {
            return Err(Error::Config(
                "confidence bounds must be ascending".to_string(),
            ));
        }
        let t = &self.tracker;
        if !(t.info_at <= t.warning_at && t.warning_at <= t.danger_at && t.danger_at <= t.critical_at)
        {
            return Err(Error::Config(
                "tracker alert thresholds must be ascending".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("hearth").join("config").join("analytics.toml"))
}

fn apply(target: &mut f64, value: Option<f64>) {
    if let Some(v) = value {
        *target = v;
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    ensemble: Option<RawEnsemble>,
    confidence: Option<RawConfidence>,
    strategy: Option<RawStrategy>,
    tracker: Option<RawTracker>,
    portfolio: Option<RawPortfolio>,
}

#[derive(Debug, Deserialize)]
struct RawEnsemble {
    linear_weight: Option<f64>,
    ema_weight: Option<f64>,
    weighted_weight: Option<f64>,
    ema_alpha: Option<f64>,
    weighted_step: Option<f64>,
    trend_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawConfidence {
    very_high_below: Option<f64>,
    high_below: Option<f64>,
    medium_below: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawStrategy {
    rounding_unit: Option<f64>,
    conservative_sigma: Option<f64>,
    moderate_sigma: Option<f64>,
    aggressive_sigma: Option<f64>,
    conservative_cv_above: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTracker {
    critical_at: Option<f64>,
    danger_at: Option<f64>,
    warning_at: Option<f64>,
    info_at: Option<f64>,
    on_track_tolerance: Option<f64>,
    projection_over_above: Option<f64>,
    projection_warning_above: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawPortfolio {
    ai_optimized_max_income_percent: Option<f64>,
}
