//! Budget analytics engine - orchestrates forecast and tracking requests

use std::collections::BTreeMap;
use std::thread;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::db::Database;
use crate::error::Result;
use crate::models::{Budget, Category, CategoryKind, CategoryMonthTotal, YearMonth};

use super::confidence::ConfidenceScorer;
use super::config::EngineConfig;
use super::ensemble::EnsembleForecaster;
use super::history::{HistorySampler, TrailingSeries};
use super::portfolio::PortfolioAggregator;
use super::strategy::StrategyGenerator;
use super::tracker::{LiveTracker, PeriodProgress, TrackedBudget};
use super::types::{
    FamilyForecast, ForecastResult, TrackingReport, TrackingSnapshot, WINDOW_LEN,
};

/// Read access to the ledger
///
/// Every sum covers whole days `from..=to` and expense categories only, except
/// `income_between`.
pub trait LedgerReader {
    fn expense_categories(&self, family_id: i64) -> Result<Vec<Category>>;

    fn expense_totals_by_month(
        &self,
        family_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CategoryMonthTotal>>;

    fn budgets_for(&self, family_id: i64, year: i32, month: Option<u32>) -> Result<Vec<Budget>>;

    fn spent_between(
        &self,
        family_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeMap<i64, f64>>;

    fn income_between(&self, family_id: i64, from: NaiveDate, to: NaiveDate) -> Result<f64>;
}

impl LedgerReader for Database {
    fn expense_categories(&self, family_id: i64) -> Result<Vec<Category>> {
        self.list_categories(family_id, Some(CategoryKind::Expense))
    }

    fn expense_totals_by_month(
        &self,
        family_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CategoryMonthTotal>> {
        self.monthly_expense_totals(family_id, from, to)
    }

    fn budgets_for(&self, family_id: i64, year: i32, month: Option<u32>) -> Result<Vec<Budget>> {
        self.list_budgets(family_id, year, month)
    }

    fn spent_between(
        &self,
        family_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeMap<i64, f64>> {
        self.spent_by_category(family_id, from, to)
    }

    fn income_between(&self, family_id: i64, from: NaiveDate, to: NaiveDate) -> Result<f64> {
        self.income_total(family_id, from, to)
    }
}

/// Everything one forecast request reads from the ledger
struct ForecastInputs {
    categories: Vec<Category>,
    totals: Vec<CategoryMonthTotal>,
    avg_monthly_income: f64,
    target_budgets: Vec<Budget>,
    target_totals: Vec<CategoryMonthTotal>,
}

/// The analytics engine
///
/// Pure computation over one snapshot of ledger data per request. Holds only
/// configuration, so a single instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct BudgetAnalytics {
    config: EngineConfig,
    ensemble: EnsembleForecaster,
    confidence: ConfidenceScorer,
    strategy: StrategyGenerator,
    tracker: LiveTracker,
    portfolio: PortfolioAggregator,
}

impl BudgetAnalytics {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            ensemble: EnsembleForecaster::new(config.ensemble.clone()),
            confidence: ConfidenceScorer::new(config.confidence.clone()),
            strategy: StrategyGenerator::new(config.strategy.clone()),
            tracker: LiveTracker::new(config.tracker.clone()),
            portfolio: PortfolioAggregator::new(config.portfolio.clone()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tracker(&self) -> &LiveTracker {
        &self.tracker
    }

    /// Forecast one category from its trailing series
    ///
    /// Returns `None` for an all-zero series.
    pub fn forecast_series(
        &self,
        category_id: i64,
        category_name: &str,
        series: &TrailingSeries,
        target: YearMonth,
    ) -> Option<ForecastResult> {
        if series.is_empty() {
            return None;
        }

        let amounts = series.amounts();
        let ensemble = self.ensemble.forecast(series, target);
        let score = self.confidence.score(&amounts);
        let strategies = self
            .strategy
            .generate(ensemble.final_prediction, score.standard_deviation);
        let recommended_strategy = self
            .strategy
            .recommend(score.level, score.coefficient_of_variation);

        Some(ForecastResult {
            category_id,
            category_name: category_name.to_string(),
            target,
            predicted_amount: ensemble.final_prediction,
            confidence: score.level,
            coefficient_of_variation: score.coefficient_of_variation,
            standard_deviation: score.standard_deviation,
            method_breakdown: ensemble.breakdown,
            seasonality_factor: ensemble.seasonality_factor,
            trend: ensemble.trend,
            strategies,
            recommended_strategy,
        })
    }

    /// Forecast every expense category of a family for the target month
    ///
    /// The history window ends the month before `target`. Budgets already set
    /// for the target month are tracked as of `as_of` and rolled into the
    /// portfolio summary.
    pub fn forecast<L: LedgerReader + ?Sized>(
        &self,
        ledger: &L,
        family_id: i64,
        target: YearMonth,
        as_of: NaiveDate,
    ) -> Result<FamilyForecast> {
        let history_end = target.add_months(-1);
        let inputs = self.read_forecast_inputs(ledger, family_id, target, history_end, as_of)?;

        let series = HistorySampler::sample_all(&inputs.totals, history_end);
        let (categories, skipped_categories) =
            self.forecast_all(&inputs.categories, &series, target, history_end);

        let snapshots = self.snapshots_from_totals(&inputs.target_budgets, &inputs.target_totals, as_of)?;
        let tracking = self.portfolio.summarize_tracking(&snapshots);
        let portfolio = self
            .portfolio
            .summarize(&categories, inputs.avg_monthly_income, tracking);

        info!(
            family_id,
            target = %target,
            forecasted = categories.len(),
            skipped = skipped_categories.len(),
            recommended = %portfolio.recommended_strategy,
            "Forecast complete"
        );

        Ok(FamilyForecast {
            family_id,
            target,
            categories,
            skipped_categories,
            portfolio,
        })
    }

    fn read_forecast_inputs<L: LedgerReader + ?Sized>(
        &self,
        ledger: &L,
        family_id: i64,
        target: YearMonth,
        history_end: YearMonth,
        as_of: NaiveDate,
    ) -> Result<ForecastInputs> {
        let (from, to) = HistorySampler::date_range(history_end);

        let categories = ledger.expense_categories(family_id)?;
        let totals = ledger.expense_totals_by_month(family_id, from, to)?;
        let income = ledger.income_between(family_id, from, to)?;
        let target_budgets = ledger.budgets_for(family_id, target.year, Some(target.month))?;
        let target_totals = if target.first_day() <= as_of {
            ledger.expense_totals_by_month(family_id, target.first_day(), target.last_day().min(as_of))?
        } else {
            Vec::new()
        };

        debug!(
            family_id,
            categories = categories.len(),
            month_totals = totals.len(),
            income,
            "Read forecast inputs"
        );

        Ok(ForecastInputs {
            categories,
            totals,
            avg_monthly_income: income / WINDOW_LEN as f64,
            target_budgets,
            target_totals,
        })
    }

    /// Fan per-category forecasts out over scoped threads and join them
    fn forecast_all(
        &self,
        categories: &[Category],
        series: &BTreeMap<i64, TrailingSeries>,
        target: YearMonth,
        history_end: YearMonth,
    ) -> (BTreeMap<i64, ForecastResult>, Vec<i64>) {
        if categories.is_empty() {
            return (BTreeMap::new(), Vec::new());
        }

        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(categories.len());
        let chunk_size = categories.len().div_ceil(workers);

        let outcomes: Vec<(i64, Option<ForecastResult>)> = thread::scope(|scope| {
            let handles: Vec<_> = categories
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|category| {
                                let result = match series.get(&category.id) {
                                    Some(s) => self.forecast_series(category.id, &category.name, s, target),
                                    None => None,
                                };
                                (category.id, result)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(results) => results,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        let mut forecasts = BTreeMap::new();
        let mut skipped = Vec::new();
        for (category_id, result) in outcomes {
            match result {
                Some(forecast) => {
                    forecasts.insert(category_id, forecast);
                }
                None => {
                    debug!(category_id, history_end = %history_end, "No spending in window, skipping");
                    skipped.push(category_id);
                }
            }
        }
        skipped.sort_unstable();

        (forecasts, skipped)
    }

    /// Track every budget of a family in a year (or one month of it)
    pub fn track<L: LedgerReader + ?Sized>(
        &self,
        ledger: &L,
        family_id: i64,
        year: i32,
        month: Option<u32>,
        as_of: NaiveDate,
    ) -> Result<TrackingReport> {
        let (start, end) = match month {
            Some(m) => {
                let period = YearMonth::new(year, m)?;
                (period, period)
            }
            None => (YearMonth::new(year, 1)?, YearMonth::new(year, 12)?),
        };

        let budgets = ledger.budgets_for(family_id, year, month)?;
        let totals = if start.first_day() <= as_of && !budgets.is_empty() {
            ledger.expense_totals_by_month(family_id, start.first_day(), end.last_day().min(as_of))?
        } else {
            Vec::new()
        };

        let snapshots = self.snapshots_from_totals(&budgets, &totals, as_of)?;
        let summary = self.portfolio.summarize_tracking(&snapshots);

        info!(
            family_id,
            year,
            month = ?month,
            budgets = snapshots.len(),
            critical = summary.critical_alerts.len(),
            "Tracking complete"
        );

        Ok(TrackingReport {
            family_id,
            year,
            month,
            snapshots,
            summary,
        })
    }

    /// Track a single budget, reading only its category's spend
    pub fn track_budget<L: LedgerReader + ?Sized>(
        &self,
        ledger: &L,
        budget: &Budget,
        as_of: NaiveDate,
    ) -> Result<TrackingSnapshot> {
        let period = budget.period()?;
        let spent = if period.first_day() <= as_of {
            ledger
                .spent_between(budget.family_id, period.first_day(), period.last_day().min(as_of))?
                .get(&budget.category_id)
                .copied()
                .unwrap_or(0.0)
        } else {
            0.0
        };

        Ok(self.tracker.snapshot(
            &tracked(budget, period, spent),
            PeriodProgress::for_date(period, as_of),
        ))
    }

    fn snapshots_from_totals(
        &self,
        budgets: &[Budget],
        totals: &[CategoryMonthTotal],
        as_of: NaiveDate,
    ) -> Result<Vec<TrackingSnapshot>> {
        let mut spent: BTreeMap<(i64, YearMonth), f64> = BTreeMap::new();
        for total in totals {
            let period = YearMonth::new(total.year, total.month)?;
            *spent.entry((total.category_id, period)).or_insert(0.0) += total.amount;
        }

        budgets
            .iter()
            .map(|budget| {
                let period = budget.period()?;
                let spent = spent
                    .get(&(budget.category_id, period))
                    .copied()
                    .unwrap_or(0.0);
                Ok(self.tracker.snapshot(
                    &tracked(budget, period, spent),
                    PeriodProgress::for_date(period, as_of),
                ))
            })
            .collect()
    }
}

fn tracked(budget: &Budget, period: YearMonth, spent: f64) -> TrackedBudget {
    TrackedBudget {
        budget_id: budget.id,
        category_id: budget.category_id,
        category_name: budget.category_name.clone(),
        period,
        budget_amount: budget.amount,
        spent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::types::{AlertLevel, ConfidenceLevel, StrategyKind};
    use crate::error::Error;
    use chrono::Utc;

    /// In-memory ledger holding plain rows
    #[derive(Default)]
    struct FakeLedger {
        categories: Vec<Category>,
        totals: Vec<CategoryMonthTotal>,
        budgets: Vec<Budget>,
        income_per_month: f64,
    }

    impl FakeLedger {
        fn category(&mut self, id: i64, name: &str) {
            self.categories.push(Category {
                id,
                family_id: 1,
                name: name.to_string(),
                kind: CategoryKind::Expense,
                created_at: Utc::now(),
            });
        }

        fn spend(&mut self, category_id: i64, period: YearMonth, amount: f64) {
            self.totals.push(CategoryMonthTotal {
                category_id,
                category_name: String::new(),
                year: period.year,
                month: period.month,
                amount,
                transaction_count: 1,
            });
        }

        fn budget(&mut self, id: i64, category_id: i64, period: YearMonth, amount: f64) {
            self.budgets.push(Budget {
                id,
                family_id: 1,
                category_id,
                category_name: format!("Category {}", category_id),
                year: period.year,
                month: period.month,
                amount,
                created_at: Utc::now(),
            });
        }

        fn in_range(&self, total: &CategoryMonthTotal, from: NaiveDate, to: NaiveDate) -> bool {
            let period = YearMonth::new(total.year, total.month).unwrap();
            period >= YearMonth::from_date(from) && period <= YearMonth::from_date(to)
        }
    }

    impl LedgerReader for FakeLedger {
        fn expense_categories(&self, _family_id: i64) -> Result<Vec<Category>> {
            Ok(self.categories.clone())
        }

        fn expense_totals_by_month(
            &self,
            _family_id: i64,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<Vec<CategoryMonthTotal>> {
            Ok(self
                .totals
                .iter()
                .filter(|t| self.in_range(t, from, to))
                .cloned()
                .collect())
        }

        fn budgets_for(&self, _family_id: i64, year: i32, month: Option<u32>) -> Result<Vec<Budget>> {
            Ok(self
                .budgets
                .iter()
                .filter(|b| b.year == year && month.map_or(true, |m| b.month == m))
                .cloned()
                .collect())
        }

        fn spent_between(
            &self,
            _family_id: i64,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<BTreeMap<i64, f64>> {
            let mut out = BTreeMap::new();
            for t in self.totals.iter().filter(|t| self.in_range(t, from, to)) {
                *out.entry(t.category_id).or_insert(0.0) += t.amount;
            }
            Ok(out)
        }

        fn income_between(&self, _family_id: i64, from: NaiveDate, to: NaiveDate) -> Result<f64> {
            let months = (YearMonth::from_date(to).year - YearMonth::from_date(from).year) * 12
                + YearMonth::from_date(to).month as i32
                - YearMonth::from_date(from).month as i32
                + 1;
            Ok(self.income_per_month * months as f64)
        }
    }

    struct FailingLedger;

    impl LedgerReader for FailingLedger {
        fn expense_categories(&self, _: i64) -> Result<Vec<Category>> {
            Err(Error::InvalidData("ledger offline".to_string()))
        }
        fn expense_totals_by_month(&self, _: i64, _: NaiveDate, _: NaiveDate) -> Result<Vec<CategoryMonthTotal>> {
            Err(Error::InvalidData("ledger offline".to_string()))
        }
        fn budgets_for(&self, _: i64, _: i32, _: Option<u32>) -> Result<Vec<Budget>> {
            Err(Error::InvalidData("ledger offline".to_string()))
        }
        fn spent_between(&self, _: i64, _: NaiveDate, _: NaiveDate) -> Result<BTreeMap<i64, f64>> {
            Err(Error::InvalidData("ledger offline".to_string()))
        }
        fn income_between(&self, _: i64, _: NaiveDate, _: NaiveDate) -> Result<f64> {
            Err(Error::InvalidData("ledger offline".to_string()))
        }
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Rent is flat, groceries ramp up, and the hobby category never spends
    fn sample_ledger() -> FakeLedger {
        let mut ledger = FakeLedger {
            income_per_month: 10_000.0,
            ..Default::default()
        };
        ledger.category(1, "Rent");
        ledger.category(2, "Groceries");
        ledger.category(3, "Hobbies");

        let end = ym(2024, 5);
        for i in 0..12 {
            let period = end.add_months(-(11 - i));
            ledger.spend(1, period, 2_000.0);
            ledger.spend(2, period, 300.0 + 40.0 * i as f64);
        }
        // Spending in the target month itself is not history
        ledger.spend(1, ym(2024, 6), 50_000.0);
        ledger
    }

    #[test]
    fn test_forecast_skips_empty_categories() {
        let engine = BudgetAnalytics::default();
        let forecast = engine
            .forecast(&sample_ledger(), 1, ym(2024, 6), date(2024, 6, 1))
            .unwrap();

        assert_eq!(forecast.categories.len(), 2);
        assert_eq!(forecast.skipped_categories, vec![3]);
        assert!(!forecast.categories.contains_key(&3));
    }

    #[test]
    fn test_flat_category_forecast() {
        let engine = BudgetAnalytics::default();
        let forecast = engine
            .forecast(&sample_ledger(), 1, ym(2024, 6), date(2024, 6, 1))
            .unwrap();

        let rent = &forecast.categories[&1];
        assert!((rent.predicted_amount - 2_000.0).abs() < 1e-6);
        assert_eq!(rent.confidence, ConfidenceLevel::VeryHigh);
        assert_eq!(rent.recommended_strategy, StrategyKind::AiOptimized);
        assert_eq!(
            rent.strategies.ai_optimized,
            (rent.predicted_amount / 1000.0).ceil() * 1000.0
        );
        assert_eq!(rent.seasonality_factor, 1.0);
    }

    #[test]
    fn test_portfolio_uses_window_income() {
        let engine = BudgetAnalytics::default();
        let forecast = engine
            .forecast(&sample_ledger(), 1, ym(2024, 6), date(2024, 6, 1))
            .unwrap();

        let portfolio = &forecast.portfolio;
        assert!((portfolio.avg_monthly_income - 10_000.0).abs() < 1e-9);
        let expected_total: f64 = forecast.categories.values().map(|f| f.predicted_amount).sum();
        assert!((portfolio.total_predicted_spending - expected_total).abs() < 1e-9);
        let ai_total: f64 = forecast
            .categories
            .values()
            .map(|f| f.strategies.ai_optimized)
            .sum();
        assert_eq!(portfolio.strategy_totals.ai_optimized, ai_total);
    }

    #[test]
    fn test_forecast_folds_target_month_tracking() {
        let mut ledger = sample_ledger();
        ledger.budget(10, 1, ym(2024, 6), 40_000.0);

        let forecast = BudgetAnalytics::default()
            .forecast(&ledger, 1, ym(2024, 6), date(2024, 6, 15))
            .unwrap();

        let tracking = &forecast.portfolio.tracking;
        assert_eq!(tracking.alert_counts[&AlertLevel::Danger], 1);
        assert_eq!(tracking.critical_alerts.len(), 1);
        assert_eq!(tracking.off_track_count, 1);
    }

    #[test]
    fn test_track_omits_categories_without_budget() {
        let mut ledger = sample_ledger();
        ledger.budget(10, 1, ym(2024, 5), 2_500.0);
        ledger.budget(11, 2, ym(2024, 5), 500.0);

        let report = BudgetAnalytics::default()
            .track(&ledger, 1, 2024, Some(5), date(2024, 6, 10))
            .unwrap();

        assert_eq!(report.snapshots.len(), 2);
        let rent = report.snapshots.iter().find(|s| s.budget_id == 10).unwrap();
        assert_eq!(rent.spent, 2_000.0);
        assert_eq!(rent.alert.level, AlertLevel::Info);
        assert_eq!(rent.days_elapsed, 31);
        assert!(rent.is_on_track);

        // groceries for May: 300 + 40 * 11 = 740 against 500
        let groceries = report.snapshots.iter().find(|s| s.budget_id == 11).unwrap();
        assert!((groceries.spent - 740.0).abs() < 1e-9);
        assert_eq!(groceries.alert.level, AlertLevel::Danger);
        assert_eq!(report.summary.critical_alerts.len(), 1);
    }

    #[test]
    fn test_track_whole_year() {
        let mut ledger = sample_ledger();
        ledger.budget(10, 1, ym(2024, 1), 2_000.0);
        ledger.budget(11, 1, ym(2024, 12), 2_000.0);

        let report = BudgetAnalytics::default()
            .track(&ledger, 1, 2024, None, date(2024, 6, 10))
            .unwrap();

        assert_eq!(report.snapshots.len(), 2);
        let december = report.snapshots.iter().find(|s| s.budget_id == 11).unwrap();
        assert_eq!(december.spent, 0.0);
        assert_eq!(december.days_elapsed, 0);
        assert_eq!(december.alert.level, AlertLevel::None);
    }

    #[test]
    fn test_track_rejects_bad_month() {
        let err = BudgetAnalytics::default()
            .track(&sample_ledger(), 1, 2024, Some(13), date(2024, 6, 10))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_track_budget_single() {
        let mut ledger = sample_ledger();
        ledger.budget(10, 2, ym(2024, 5), 1_000.0);
        let budget = ledger.budgets[0].clone();

        let snap = BudgetAnalytics::default()
            .track_budget(&ledger, &budget, date(2024, 5, 31))
            .unwrap();
        assert!((snap.spent - 740.0).abs() < 1e-9);
        assert!((snap.utilization_rate - 74.0).abs() < 1e-9);
        assert_eq!(snap.alert.level, AlertLevel::None);
    }

    #[test]
    fn test_upstream_failure_fails_request() {
        let engine = BudgetAnalytics::default();
        assert!(engine
            .forecast(&FailingLedger, 1, ym(2024, 6), date(2024, 6, 1))
            .is_err());
        assert!(engine
            .track(&FailingLedger, 1, 2024, Some(6), date(2024, 6, 1))
            .is_err());
    }

    #[test]
    fn test_forecast_series_is_deterministic() {
        let engine = BudgetAnalytics::default();
        let series = TrailingSeries::from_amounts(ym(2024, 5), &[
            900.0, 1_100.0, 1_000.0, 1_250.0, 800.0, 1_000.0, 1_300.0, 950.0, 1_050.0, 1_200.0,
            1_000.0, 1_150.0,
        ])
        .unwrap();

        let a = engine.forecast_series(1, "Utilities", &series, ym(2024, 6)).unwrap();
        let b = engine.forecast_series(1, "Utilities", &series, ym(2024, 6)).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.strategies.ai_optimized,
            (a.predicted_amount / 1000.0).ceil() * 1000.0
        );
    }
}
