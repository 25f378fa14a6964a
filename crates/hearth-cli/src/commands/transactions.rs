//! Transaction command implementations

use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use hearth_core::{db::Database, models::CategoryKind};

use super::{resolve_family, truncate};

pub fn cmd_transactions_list(
    db: &Database,
    family: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    limit: i64,
) -> Result<()> {
    let family = resolve_family(db, family)?;
    let transactions = db.list_transactions(family.id, from, to, limit, 0)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  hearth import --family \"{}\" --file ledger.csv", family.name);
        return Ok(());
    }

    let categories: HashMap<i64, (String, CategoryKind)> = db
        .list_categories(family.id, None)?
        .into_iter()
        .map(|c| (c.id, (c.name, c.kind)))
        .collect();
    let total = db.count_transactions(family.id)?;

    println!();
    println!("📝 Recent Transactions for {} ({} total)", family.name, total);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let (category, kind) = categories
            .get(&tx.category_id)
            .map(|(n, k)| (n.as_str(), *k))
            .unwrap_or(("?", CategoryKind::Expense));

        let amount_str = match kind {
            CategoryKind::Expense => format!("\x1b[31m${:.2}\x1b[0m", tx.amount), // Red for expenses
            CategoryKind::Income => format!("\x1b[32m+${:.2}\x1b[0m", tx.amount), // Green for income
        };

        println!(
            "   {} │ {:>10} │ {:<14} │ {}",
            tx.date,
            amount_str,
            truncate(category, 14),
            truncate(&tx.description, 32)
        );
    }

    Ok(())
}
