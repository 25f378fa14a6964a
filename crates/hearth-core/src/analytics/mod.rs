//! Budget Analytics & Forecasting Engine
//!
//! Turns a family's ledger into next-month forecasts and live budget tracking.
//!
//! ## Pipeline
//!
//! - **History** - twelve-month trailing series per expense category
//! - **Methods** - linear trend, EMA, weighted moving average
//! - **Ensemble** - fixed-weight blend, seasonality adjustment, trend label
//! - **Confidence** - coefficient of variation bucketed into four levels
//! - **Strategy** - conservative / moderate / aggressive / ai_optimized budgets
//! - **Portfolio** - family totals, savings rates and recommendations
//!
//! Live tracking runs separately per budget month (burn rate, projection,
//! alert level) and feeds the portfolio's critical-alert view.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hearth_core::analytics::{BudgetAnalytics, EngineConfig};
//!
//! let engine = BudgetAnalytics::new(EngineConfig::load()?);
//! let forecast = engine.forecast(&db, family_id, target, today)?;
//! let report = engine.track(&db, family_id, 2024, Some(6), today)?;
//! ```

pub mod confidence;
pub mod config;
pub mod engine;
pub mod ensemble;
pub mod history;
pub mod methods;
pub mod portfolio;
pub mod strategy;
pub mod tracker;
pub mod types;

pub use confidence::{ConfidenceScore, ConfidenceScorer, RiskLevel, RiskProfile};
pub use config::EngineConfig;
pub use engine::{BudgetAnalytics, LedgerReader};
pub use ensemble::{EnsembleForecast, EnsembleForecaster};
pub use history::{HistorySampler, MonthlySample, TrailingSeries};
pub use portfolio::PortfolioAggregator;
pub use strategy::StrategyGenerator;
pub use tracker::{LiveTracker, PeriodProgress, TrackedBudget};
pub use types::{
    AlertLevel, BudgetAlertStatus, BudgetStrategySet, ConfidenceLevel, FamilyForecast,
    ForecastResult, ForecastStatus, MethodBreakdown, MonthIndex, PortfolioSummary,
    Recommendation, RecommendationKind, StrategyKind, TrackingReport, TrackingSnapshot,
    TrackingSummary, Trend, TrendDirection, WINDOW_LEN,
};
