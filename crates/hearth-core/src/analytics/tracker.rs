//! Live budget tracking
//!
//! A stateless classifier: every read recomputes the snapshot from the budget,
//! spend to date, and how far into the month the as-of date falls.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::config::TrackerConfig;
use super::types::{AlertLevel, BudgetAlertStatus, ForecastStatus, TrackingSnapshot};
use crate::models::YearMonth;

/// How far into a budget month an as-of date falls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodProgress {
    pub days_elapsed: u32,
    pub days_in_month: u32,
}

impl PeriodProgress {
    /// Past months are fully elapsed, future months not started
    pub fn for_date(period: YearMonth, as_of: NaiveDate) -> Self {
        let days_in_month = period.days_in_month();
        let as_of_month = YearMonth::from_date(as_of);

        let days_elapsed = if as_of_month > period {
            days_in_month
        } else if as_of_month == period {
            as_of.day()
        } else {
            0
        };

        Self {
            days_elapsed,
            days_in_month,
        }
    }

    pub fn days_remaining(&self) -> u32 {
        self.days_in_month.saturating_sub(self.days_elapsed)
    }

    /// Share of the month already elapsed, in percent
    pub fn expected_utilization(&self) -> f64 {
        if self.days_in_month == 0 {
            return 0.0;
        }
        self.days_elapsed as f64 / self.days_in_month as f64 * 100.0
    }
}

/// One budget to classify
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedBudget {
    pub budget_id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub period: YearMonth,
    pub budget_amount: f64,
    pub spent: f64,
}

#[derive(Debug, Clone, Default)]
pub struct LiveTracker {
    config: TrackerConfig,
}

impl LiveTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    pub fn snapshot(&self, budget: &TrackedBudget, progress: PeriodProgress) -> TrackingSnapshot {
        let utilization_rate = percent_of(budget.spent, budget.budget_amount);

        let daily_burn_rate = if progress.days_elapsed == 0 {
            0.0
        } else {
            budget.spent / progress.days_elapsed as f64
        };
        let projected_spending = daily_burn_rate * progress.days_in_month as f64;
        let projected_utilization = percent_of(projected_spending, budget.budget_amount);

        TrackingSnapshot {
            budget_id: budget.budget_id,
            category_id: budget.category_id,
            category_name: budget.category_name.clone(),
            period: budget.period,
            budget_amount: budget.budget_amount,
            spent: budget.spent,
            remaining: budget.budget_amount - budget.spent,
            utilization_rate,
            daily_burn_rate,
            days_elapsed: progress.days_elapsed,
            days_remaining: progress.days_remaining(),
            projected_spending,
            projected_utilization,
            alert: self.alert(utilization_rate),
            is_on_track: self.is_on_track(utilization_rate, progress),
            forecast_status: self.forecast_status(projected_utilization),
        }
    }

    /// First matching threshold, most severe first
    pub fn alert_level(&self, utilization_rate: f64) -> AlertLevel {
        let c = &self.config;
        if utilization_rate >= c.critical_at {
            AlertLevel::Critical
        } else if utilization_rate >= c.danger_at {
            AlertLevel::Danger
        } else if utilization_rate >= c.warning_at {
            AlertLevel::Warning
        } else if utilization_rate >= c.info_at {
            AlertLevel::Info
        } else {
            AlertLevel::None
        }
    }

    pub fn alert(&self, utilization_rate: f64) -> BudgetAlertStatus {
        let level = self.alert_level(utilization_rate);
        let left = 100.0 - utilization_rate;

        let message = match level {
            AlertLevel::Critical => format!(
                "Budget far exceeded: {:.1}% over budget",
                utilization_rate - 100.0
            ),
            AlertLevel::Danger => format!("Budget exceeded by {:.1}%", utilization_rate - 100.0),
            AlertLevel::Warning => format!(
                "Almost at limit: {:.1}% used, {:.1}% remaining",
                utilization_rate, left
            ),
            AlertLevel::Info => format!("{:.1}% of budget used, {:.1}% remaining", utilization_rate, left),
            AlertLevel::None => format!(
                "Within budget: {:.1}% used, {:.1}% remaining",
                utilization_rate, left
            ),
        };

        BudgetAlertStatus { level, message }
    }

    /// Spending no faster than the elapsed share of the month (with tolerance)
    pub fn is_on_track(&self, utilization_rate: f64, progress: PeriodProgress) -> bool {
        utilization_rate <= progress.expected_utilization() * self.config.on_track_tolerance
    }

    pub fn forecast_status(&self, projected_utilization: f64) -> ForecastStatus {
        if projected_utilization > self.config.projection_over_above {
            ForecastStatus::Over
        } else if projected_utilization > self.config.projection_warning_above {
            ForecastStatus::Warning
        } else {
            ForecastStatus::Good
        }
    }
}

fn percent_of(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        value / total * 100.0
    }
}
