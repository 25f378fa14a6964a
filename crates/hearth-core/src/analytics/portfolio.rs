//! Family-level roll-ups of forecasts and tracking snapshots

use std::collections::BTreeMap;

use super::config::PortfolioConfig;
use super::types::{
    AlertLevel, BudgetStrategySet, ConfidenceLevel, ForecastResult, PortfolioSummary,
    Recommendation, RecommendationKind, StrategyKind, TrackingSnapshot, TrackingSummary,
    TrendDirection,
};

#[derive(Debug, Clone, Default)]
pub struct PortfolioAggregator {
    config: PortfolioConfig,
}

impl PortfolioAggregator {
    pub fn new(config: PortfolioConfig) -> Self {
        Self { config }
    }

    /// `(income - total) / income * 100`, or 0 without income
    pub fn savings_rate(avg_monthly_income: f64, total: f64) -> f64 {
        if avg_monthly_income <= 0.0 {
            return 0.0;
        }
        (avg_monthly_income - total) / avg_monthly_income * 100.0
    }

    /// ai_optimized while its total stays under the income share, else moderate
    pub fn recommended_strategy(&self, totals: &BudgetStrategySet, avg_monthly_income: f64) -> StrategyKind {
        if avg_monthly_income <= 0.0 {
            return StrategyKind::Moderate;
        }
        let share = totals.ai_optimized / avg_monthly_income * 100.0;
        if share < self.config.ai_optimized_max_income_percent {
            StrategyKind::AiOptimized
        } else {
            StrategyKind::Moderate
        }
    }

    pub fn summarize(
        &self,
        forecasts: &BTreeMap<i64, ForecastResult>,
        avg_monthly_income: f64,
        tracking: TrackingSummary,
    ) -> PortfolioSummary {
        let total_predicted_spending = forecasts
            .values()
            .fold(0.0, |acc, f| acc + f.predicted_amount);
        let strategy_totals = forecasts
            .values()
            .fold(BudgetStrategySet::default(), |acc, f| acc.add(&f.strategies));

        let savings_rate_per_strategy = StrategyKind::all()
            .iter()
            .map(|&kind| {
                (
                    kind,
                    Self::savings_rate(avg_monthly_income, strategy_totals.get(kind)),
                )
            })
            .collect();

        let mut category_recommendations: BTreeMap<StrategyKind, usize> =
            StrategyKind::all().iter().map(|&k| (k, 0)).collect();
        for f in forecasts.values() {
            *category_recommendations.entry(f.recommended_strategy).or_insert(0) += 1;
        }

        let recommended_strategy = self.recommended_strategy(&strategy_totals, avg_monthly_income);

        PortfolioSummary {
            total_predicted_spending,
            strategy_totals,
            avg_monthly_income,
            savings_rate_per_strategy,
            recommended_strategy,
            category_recommendations,
            recommendations: self.recommendations(forecasts, &strategy_totals, avg_monthly_income),
            tracking,
        }
    }

    /// Opportunity and info entries; order follows category id and is not meaningful
    pub fn recommendations(
        &self,
        forecasts: &BTreeMap<i64, ForecastResult>,
        strategy_totals: &BudgetStrategySet,
        avg_monthly_income: f64,
    ) -> Vec<Recommendation> {
        let mut out = Vec::new();

        for f in forecasts.values() {
            if f.trend.direction == TrendDirection::Up {
                out.push(Recommendation {
                    kind: RecommendationKind::Info,
                    category_id: Some(f.category_id),
                    title: format!("{} is trending up", f.category_name),
                    message: format!(
                        "Spending on {} is rising about {:.1}% of its average per month",
                        f.category_name, f.trend.strength_percent
                    ),
                    amount: None,
                });
            }

            let saving = f.strategies.moderate - f.strategies.aggressive;
            if f.confidence.is_reliable() && saving > 0.0 {
                out.push(Recommendation {
                    kind: RecommendationKind::Opportunity,
                    category_id: Some(f.category_id),
                    title: format!("Tighten {}", f.category_name),
                    message: format!(
                        "{} is predictable enough for the aggressive budget, saving {:.0} against moderate",
                        f.category_name, saving
                    ),
                    amount: Some(saving),
                });
            }

            if f.confidence == ConfidenceLevel::Low {
                out.push(Recommendation {
                    kind: RecommendationKind::Info,
                    category_id: Some(f.category_id),
                    title: format!("{} is volatile", f.category_name),
                    message: format!(
                        "{} varies {:.0}% month to month; a conservative budget of {:.0} leaves headroom",
                        f.category_name, f.coefficient_of_variation, f.strategies.conservative
                    ),
                    amount: Some(f.strategies.conservative),
                });
            }
        }

        if avg_monthly_income <= 0.0 {
            out.push(Recommendation {
                kind: RecommendationKind::Info,
                category_id: None,
                title: "No income recorded".to_string(),
                message: "Record income to compare budgets against savings".to_string(),
                amount: None,
            });
        } else if strategy_totals.ai_optimized > avg_monthly_income {
            out.push(Recommendation {
                kind: RecommendationKind::Info,
                category_id: None,
                title: "Forecast exceeds income".to_string(),
                message: format!(
                    "Predicted spending of {:.0} is above average monthly income of {:.0}",
                    strategy_totals.ai_optimized, avg_monthly_income
                ),
                amount: Some(strategy_totals.ai_optimized - avg_monthly_income),
            });
        } else {
            let extra = strategy_totals.moderate - strategy_totals.aggressive;
            if extra > 0.0 {
                out.push(Recommendation {
                    kind: RecommendationKind::Opportunity,
                    category_id: None,
                    title: "Aggressive budgeting".to_string(),
                    message: format!(
                        "Aggressive budgets would save {:.0} more per month than moderate ones",
                        extra
                    ),
                    amount: Some(extra),
                });
            }
        }

        out
    }

    /// Alert counts and the critical view over tracking snapshots
    pub fn summarize_tracking(&self, snapshots: &[TrackingSnapshot]) -> TrackingSummary {
        let mut alert_counts: BTreeMap<AlertLevel, usize> =
            AlertLevel::all().iter().map(|&l| (l, 0)).collect();
        let mut on_track_count = 0;
        let mut critical_alerts = Vec::new();

        for snap in snapshots {
            *alert_counts.entry(snap.alert.level).or_insert(0) += 1;
            if snap.is_on_track {
                on_track_count += 1;
            }
            if snap.alert.level.is_critical() {
                critical_alerts.push(snap.clone());
            }
        }

        TrackingSummary {
            alert_counts,
            on_track_count,
            off_track_count: snapshots.len() - on_track_count,
            critical_alerts,
        }
    }
}
