//! Forecast, tracking and alert commands

use anyhow::Result;
use chrono::NaiveDate;
use hearth_core::{
    analytics::{AlertLevel, ForecastStatus, StrategyKind, TrendDirection},
    db::Database,
    events::{publish_alerts, CollectingSink, EventSink, TracingSink},
    models::YearMonth,
    BudgetAnalytics,
};

use super::{money, resolve_family, truncate};

fn trend_icon(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Up => "📈",
        TrendDirection::Down => "📉",
        TrendDirection::Stable => "➡️ ",
    }
}

fn alert_icon(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::None => "✅",
        AlertLevel::Info => "ℹ️ ",
        AlertLevel::Warning => "⚠️ ",
        AlertLevel::Danger => "🔥",
        AlertLevel::Critical => "🚨",
    }
}

pub fn cmd_forecast(
    db: &Database,
    engine: &BudgetAnalytics,
    family: &str,
    year: i32,
    month: u32,
    as_of: NaiveDate,
    json: bool,
) -> Result<()> {
    let family = resolve_family(db, family)?;
    let target = YearMonth::new(year, month)?;
    let forecast = engine.forecast(db, family.id, target, as_of)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    if forecast.categories.is_empty() {
        println!(
            "No spending history in the 12 months before {} for {}.",
            target, family.name
        );
        println!("  Import a ledger with: hearth import --family \"{}\" --file ledger.csv", family.name);
        return Ok(());
    }

    println!();
    println!("🔮 Forecast for {} ({})", family.name, target);
    println!("   ─────────────────────────────────────────────────────────────────────────");
    println!(
        "   {:<18} {:>12} {:>10}  {:<5} {:>12} {:>12} {:>12}",
        "Category", "Predicted", "Conf.", "Trend", "Conserv.", "Moderate", "AI"
    );

    for f in forecast.categories.values() {
        println!(
            "   {:<18} {:>12} {:>10}  {:<5} {:>12} {:>12} {:>12}",
            truncate(&f.category_name, 18),
            money(f.predicted_amount),
            f.confidence.as_str(),
            trend_icon(f.trend.direction),
            money(f.strategies.conservative),
            money(f.strategies.moderate),
            money(f.strategies.ai_optimized),
        );
    }

    let p = &forecast.portfolio;
    println!();
    println!("💼 Portfolio");
    println!("   Predicted spending: {}", money(p.total_predicted_spending));
    println!("   Avg monthly income: {}", money(p.avg_monthly_income));
    for kind in StrategyKind::all() {
        let marker = if *kind == p.recommended_strategy { " ⭐" } else { "" };
        println!(
            "   {:<13} {:>12}  savings {:>6.1}%{}",
            kind.as_str(),
            money(p.strategy_totals.get(*kind)),
            p.savings_rate_per_strategy.get(kind).copied().unwrap_or(0.0),
            marker
        );
    }

    if !forecast.skipped_categories.is_empty() {
        println!();
        println!(
            "   💡 {} categories skipped (no spending in the window)",
            forecast.skipped_categories.len()
        );
    }

    if !p.recommendations.is_empty() {
        println!();
        println!("📋 Recommendations");
        for rec in &p.recommendations {
            println!("   • {}: {}", rec.title, rec.message);
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_track(
    db: &Database,
    engine: &BudgetAnalytics,
    family: &str,
    year: i32,
    month: Option<u32>,
    as_of: NaiveDate,
    json: bool,
    notify: bool,
) -> Result<()> {
    let family = resolve_family(db, family)?;
    let report = engine.track(db, family.id, year, month, as_of)?;

    if notify {
        let sink = CollectingSink::new();
        publish_alerts(&sink, family.id, &report.snapshots)?;
        let mut recorded = 0;
        for event in sink.take() {
            if db.record_budget_alert(&event)?.is_some() {
                recorded += 1;
            }
            TracingSink.publish(event)?;
        }
        if !json {
            println!("🔔 Recorded {} new budget alerts", recorded);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.snapshots.is_empty() {
        println!("No budgets set for {} in this period.", family.name);
        return Ok(());
    }

    println!();
    println!("🎯 Budget tracking for {} as of {}", family.name, as_of);
    println!("   ─────────────────────────────────────────────────────────────────────────");

    for s in &report.snapshots {
        let status = match s.forecast_status {
            ForecastStatus::Good => "",
            ForecastStatus::Warning => " (projected tight)",
            ForecastStatus::Over => " (projected over)",
        };
        println!(
            "   {} {} {:<18} {:>11} / {:<11} {:>6.1}%{}",
            alert_icon(s.alert.level),
            s.period,
            truncate(&s.category_name, 18),
            money(s.spent),
            money(s.budget_amount),
            s.utilization_rate,
            status
        );
        if s.alert.level > AlertLevel::None {
            println!("        {}", s.alert.message);
        }
    }

    let summary = &report.summary;
    println!();
    println!(
        "   On track: {}   Off track: {}   Critical: {}",
        summary.on_track_count,
        summary.off_track_count,
        summary.critical_alerts.len()
    );

    Ok(())
}

pub fn cmd_alerts(db: &Database, family: Option<&str>, limit: i64) -> Result<()> {
    let family = family.map(|f| resolve_family(db, f)).transpose()?;
    let alerts = db.list_budget_alerts(family.as_ref().map(|f| f.id), limit)?;

    if alerts.is_empty() {
        println!("✅ No budget alerts recorded.");
        return Ok(());
    }

    println!();
    println!("⚠️  Budget Alerts");
    println!("   ─────────────────────────────────────────────────────────────");

    for alert in alerts {
        let level: AlertLevel = alert.level.parse().unwrap_or(AlertLevel::Warning);
        println!(
            "   {} {}-{:02} [{}] {:.1}%",
            alert_icon(level),
            alert.year,
            alert.month,
            alert.level,
            alert.utilization_rate
        );
        println!("      {}", alert.message);
    }

    Ok(())
}
