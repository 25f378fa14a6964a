//! Ensemble blend, seasonality and trend

use super::config::EnsembleConfig;
use super::history::TrailingSeries;
use super::methods::{ema, linear_fit, linear_projection, mean, weighted_average};
use super::types::{MethodBreakdown, MonthIndex, Trend, TrendDirection, WINDOW_LEN};
use crate::models::YearMonth;

/// Output of one ensemble run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleForecast {
    pub breakdown: MethodBreakdown,
    pub seasonality_factor: f64,
    /// Window slot the factor was taken from
    pub seasonality_slot: Option<MonthIndex>,
    /// Ensemble scaled by the seasonality factor
    pub final_prediction: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Default)]
pub struct EnsembleForecaster {
    config: EnsembleConfig,
}

impl EnsembleForecaster {
    pub fn new(config: EnsembleConfig) -> Self {
        Self { config }
    }

    pub fn forecast(&self, series: &TrailingSeries, target: YearMonth) -> EnsembleForecast {
        let amounts = series.amounts();
        let c = &self.config;

        let linear = linear_projection(&amounts);
        let ema = ema(&amounts, c.ema_alpha);
        let weighted = weighted_average(&amounts, c.weighted_step);
        let ensemble = c.linear_weight * linear + c.ema_weight * ema + c.weighted_weight * weighted;

        let factors = seasonality_factors(&amounts);
        let slot = series.slot_for_month(target.month);
        let seasonality_factor = slot.map(|s| factors[s.get()]).unwrap_or(1.0);

        EnsembleForecast {
            breakdown: MethodBreakdown {
                linear,
                ema,
                weighted,
                ensemble,
            },
            seasonality_factor,
            seasonality_slot: slot,
            final_prediction: ensemble * seasonality_factor,
            trend: self.trend(&amounts),
        }
    }

    /// Classify the regression slope against the series mean
    pub fn trend(&self, amounts: &[f64]) -> Trend {
        let slope = linear_fit(amounts).slope;
        let m = mean(amounts);
        let threshold = self.config.trend_threshold * m;

        let direction = if slope > threshold {
            TrendDirection::Up
        } else if slope < -threshold {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        };

        let strength_percent = if m == 0.0 {
            0.0
        } else {
            (slope / m).abs() * 100.0
        };

        Trend {
            direction,
            strength_percent,
            slope,
        }
    }
}

/// Each month's amount relative to the window mean (1.0 when the mean is zero)
pub fn seasonality_factors(amounts: &[f64; WINDOW_LEN]) -> [f64; WINDOW_LEN] {
    let m = mean(amounts);
    if m == 0.0 {
        return [1.0; WINDOW_LEN];
    }
    amounts.map(|a| a / m)
}
