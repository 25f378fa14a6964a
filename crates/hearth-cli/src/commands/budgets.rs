//! Budget command implementations

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use hearth_core::{db::Database, models::YearMonth};

use super::{money, resolve_family, truncate};

pub fn cmd_budgets_list(
    db: &Database,
    family: &str,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<()> {
    let family = resolve_family(db, family)?;
    let year = year.unwrap_or_else(|| Local::now().year());
    let budgets = db.list_budgets(family.id, year, month)?;

    if budgets.is_empty() {
        println!("No budgets for {} in {}. Set one with:", family.name, year);
        println!(
            "  hearth budgets --family \"{}\" set Groceries --month {}-01 600",
            family.name, year
        );
        return Ok(());
    }

    println!();
    println!("🎯 Budgets for {} ({})", family.name, year);
    println!("   ─────────────────────────────────────────────");

    for budget in budgets {
        println!(
            "   [{:>3}] {}-{:02} │ {:<18} │ {:>12}",
            budget.id,
            budget.year,
            budget.month,
            truncate(&budget.category_name, 18),
            money(budget.amount)
        );
    }

    Ok(())
}

pub fn cmd_budgets_set(
    db: &Database,
    family: &str,
    category: &str,
    month: &str,
    amount: f64,
) -> Result<()> {
    let family = resolve_family(db, family)?;
    let period: YearMonth = month
        .parse()
        .with_context(|| format!("Invalid --month '{}' (use YYYY-MM)", month))?;
    let category = db.find_category(family.id, category)?.ok_or_else(|| {
        anyhow::anyhow!("Category '{}' not found for {}", category, family.name)
    })?;

    let id = db.upsert_budget(family.id, category.id, period, amount)?;
    let _ = db.log_audit(
        "cli",
        "upsert",
        Some("budgets"),
        Some(id),
        Some(&format!("{} {} {:.2}", category.name, period, amount)),
    );

    println!(
        "✅ Budget for {} in {} set to {} (id {})",
        category.name,
        period,
        money(amount),
        id
    );
    Ok(())
}

pub fn cmd_budgets_delete(db: &Database, id: i64) -> Result<()> {
    let budget = db
        .get_budget(id)?
        .ok_or_else(|| anyhow::anyhow!("Budget {} not found", id))?;

    db.delete_budget(id)?;
    let _ = db.log_audit("cli", "delete", Some("budgets"), Some(id), None);

    println!(
        "✅ Deleted budget {} ({} {}-{:02})",
        id, budget.category_name, budget.year, budget.month
    );
    Ok(())
}
