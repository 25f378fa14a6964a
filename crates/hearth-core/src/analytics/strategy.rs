//! Budget strategies derived from a forecast

use super::config::StrategyConfig;
use super::types::{BudgetStrategySet, ConfidenceLevel, StrategyKind};

#[derive(Debug, Clone, Default)]
pub struct StrategyGenerator {
    config: StrategyConfig,
}

impl StrategyGenerator {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    /// Round up to the next rounding unit
    pub fn round_up(&self, value: f64) -> f64 {
        let unit = self.config.rounding_unit;
        // `+ 0.0` turns a -0.0 ceiling into 0.0
        (value / unit).ceil() * unit + 0.0
    }

    /// Budgets at `prediction + k·σ` for each strategy
    pub fn generate(&self, prediction: f64, std_dev: f64) -> BudgetStrategySet {
        let c = &self.config;
        BudgetStrategySet {
            conservative: self.round_up(prediction + c.conservative_sigma * std_dev),
            moderate: self.round_up(prediction + c.moderate_sigma * std_dev),
            aggressive: self.round_up(prediction + c.aggressive_sigma * std_dev),
            ai_optimized: self.round_up(prediction),
        }
    }

    pub fn recommend(&self, confidence: ConfidenceLevel, cv: f64) -> StrategyKind {
        if confidence.is_reliable() {
            StrategyKind::AiOptimized
        } else if cv > self.config.conservative_cv_above {
            StrategyKind::Conservative
        } else {
            StrategyKind::Moderate
        }
    }
}
