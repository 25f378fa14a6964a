//! Core types for the analytics engine

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::YearMonth;

/// Number of months in a trailing window
pub const WINDOW_LEN: usize = 12;

/// Position inside the trailing window (0 = oldest, 11 = newest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MonthIndex(u8);

impl MonthIndex {
    pub fn new(index: usize) -> Result<Self> {
        if index >= WINDOW_LEN {
            return Err(Error::Validation(format!(
                "Month index must be within 0..{}, got {}",
                WINDOW_LEN, index
            )));
        }
        Ok(Self(index as u8))
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// All window positions, oldest first
    pub fn all() -> impl Iterator<Item = MonthIndex> {
        (0..WINDOW_LEN as u8).map(MonthIndex)
    }
}

impl TryFrom<u8> for MonthIndex {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value as usize)
    }
}

impl From<MonthIndex> for u8 {
    fn from(index: MonthIndex) -> u8 {
        index.0
    }
}

/// Forecast confidence derived from the coefficient of variation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryHigh,
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::VeryHigh => "very_high",
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }

    /// Very high or high
    pub fn is_reliable(&self) -> bool {
        matches!(self, ConfidenceLevel::VeryHigh | ConfidenceLevel::High)
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConfidenceLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "very_high" => Ok(ConfidenceLevel::VeryHigh),
            "high" => Ok(ConfidenceLevel::High),
            "medium" => Ok(ConfidenceLevel::Medium),
            "low" => Ok(ConfidenceLevel::Low),
            _ => Err(format!("Unknown confidence level: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub strength_percent: f64,
    /// Regression slope per month
    pub slope: f64,
}

/// Each forecasting method's projection for the next month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodBreakdown {
    pub linear: f64,
    pub ema: f64,
    pub weighted: f64,
    pub ensemble: f64,
}

/// A named budgeting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Conservative,
    Moderate,
    Aggressive,
    AiOptimized,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Conservative => "conservative",
            StrategyKind::Moderate => "moderate",
            StrategyKind::Aggressive => "aggressive",
            StrategyKind::AiOptimized => "ai_optimized",
        }
    }

    pub fn all() -> &'static [StrategyKind] {
        &[
            StrategyKind::Conservative,
            StrategyKind::Moderate,
            StrategyKind::Aggressive,
            StrategyKind::AiOptimized,
        ]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "conservative" => Ok(StrategyKind::Conservative),
            "moderate" => Ok(StrategyKind::Moderate),
            "aggressive" => Ok(StrategyKind::Aggressive),
            "ai_optimized" | "ai-optimized" => Ok(StrategyKind::AiOptimized),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

/// Budget amounts for each strategy
///
/// No ordering between the fields is guaranteed: with a high standard
/// deviation the aggressive amount can sit well under `ai_optimized`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetStrategySet {
    pub conservative: f64,
    pub moderate: f64,
    pub aggressive: f64,
    pub ai_optimized: f64,
}

impl BudgetStrategySet {
    pub fn get(&self, kind: StrategyKind) -> f64 {
        match kind {
            StrategyKind::Conservative => self.conservative,
            StrategyKind::Moderate => self.moderate,
            StrategyKind::Aggressive => self.aggressive,
            StrategyKind::AiOptimized => self.ai_optimized,
        }
    }

    /// Field-wise sum
    pub fn add(&self, other: &BudgetStrategySet) -> BudgetStrategySet {
        BudgetStrategySet {
            conservative: self.conservative + other.conservative,
            moderate: self.moderate + other.moderate,
            aggressive: self.aggressive + other.aggressive,
            ai_optimized: self.ai_optimized + other.ai_optimized,
        }
    }
}

/// Forecast for one expense category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub category_id: i64,
    pub category_name: String,
    pub target: YearMonth,
    /// Ensemble prediction after the seasonality adjustment
    pub predicted_amount: f64,
    pub confidence: ConfidenceLevel,
    pub coefficient_of_variation: f64,
    pub standard_deviation: f64,
    pub method_breakdown: MethodBreakdown,
    pub seasonality_factor: f64,
    pub trend: Trend,
    pub strategies: BudgetStrategySet,
    pub recommended_strategy: StrategyKind,
}

/// Live tracking alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    None,
    Info,
    Warning,
    Danger,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::None => "none",
            AlertLevel::Info => "info",
            AlertLevel::Warning => "warning",
            AlertLevel::Danger => "danger",
            AlertLevel::Critical => "critical",
        }
    }

    /// Danger or critical
    pub fn is_critical(&self) -> bool {
        matches!(self, AlertLevel::Danger | AlertLevel::Critical)
    }

    pub fn all() -> &'static [AlertLevel] {
        &[
            AlertLevel::None,
            AlertLevel::Info,
            AlertLevel::Warning,
            AlertLevel::Danger,
            AlertLevel::Critical,
        ]
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(AlertLevel::None),
            "info" => Ok(AlertLevel::Info),
            "warning" => Ok(AlertLevel::Warning),
            "danger" => Ok(AlertLevel::Danger),
            "critical" => Ok(AlertLevel::Critical),
            _ => Err(format!("Unknown alert level: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlertStatus {
    pub level: AlertLevel,
    pub message: String,
}

/// End-of-month projection against the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStatus {
    Good,
    Warning,
    Over,
}

impl ForecastStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastStatus::Good => "good",
            ForecastStatus::Warning => "warning",
            ForecastStatus::Over => "over",
        }
    }
}

impl fmt::Display for ForecastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Live state of one budget at an as-of date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSnapshot {
    pub budget_id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub period: YearMonth,
    pub budget_amount: f64,
    pub spent: f64,
    /// Negative when over budget
    pub remaining: f64,
    pub utilization_rate: f64,
    pub daily_burn_rate: f64,
    pub days_elapsed: u32,
    pub days_remaining: u32,
    pub projected_spending: f64,
    pub projected_utilization: f64,
    pub alert: BudgetAlertStatus,
    pub is_on_track: bool,
    pub forecast_status: ForecastStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Opportunity,
    Info,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Opportunity => "opportunity",
            RecommendationKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// Roll-up of tracking snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingSummary {
    pub alert_counts: BTreeMap<AlertLevel, usize>,
    pub on_track_count: usize,
    pub off_track_count: usize,
    /// Snapshots at danger or critical
    pub critical_alerts: Vec<TrackingSnapshot>,
}

/// Family-level roll-up of a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_predicted_spending: f64,
    pub strategy_totals: BudgetStrategySet,
    pub avg_monthly_income: f64,
    pub savings_rate_per_strategy: BTreeMap<StrategyKind, f64>,
    pub recommended_strategy: StrategyKind,
    /// How many categories recommend each strategy
    pub category_recommendations: BTreeMap<StrategyKind, usize>,
    pub recommendations: Vec<Recommendation>,
    /// Tracking of the target month's budgets
    pub tracking: TrackingSummary,
}

/// Output of a forecast request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyForecast {
    pub family_id: i64,
    pub target: YearMonth,
    pub categories: BTreeMap<i64, ForecastResult>,
    /// Expense categories with no spending in the window
    pub skipped_categories: Vec<i64>,
    pub portfolio: PortfolioSummary,
}

/// Output of a tracking request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingReport {
    pub family_id: i64,
    pub year: i32,
    pub month: Option<u32>,
    pub snapshots: Vec<TrackingSnapshot>,
    pub summary: TrackingSummary,
}
