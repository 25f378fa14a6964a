//! Category command implementations

use anyhow::Result;
use hearth_core::{db::Database, models::CategoryKind};

use super::resolve_family;

pub fn cmd_categories_list(db: &Database, family: &str) -> Result<()> {
    let family = resolve_family(db, family)?;
    let categories = db.list_categories(family.id, None)?;

    if categories.is_empty() {
        println!("No categories for {}. Import a ledger or add one with:", family.name);
        println!("  hearth categories --family \"{}\" add Groceries", family.name);
        return Ok(());
    }

    println!();
    println!("🗂️  Categories for {}", family.name);
    println!("   ─────────────────────────────");

    for category in categories {
        let icon = match category.kind {
            CategoryKind::Expense => "💸",
            CategoryKind::Income => "💰",
        };
        println!("   {} [{}] {} ({})", icon, category.id, category.name, category.kind);
    }

    Ok(())
}

pub fn cmd_categories_add(db: &Database, family: &str, name: &str, kind: &str) -> Result<()> {
    let family = resolve_family(db, family)?;
    let kind: CategoryKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let id = db.upsert_category(family.id, name, kind)?;
    println!("✅ Category '{}' ({}) ready for {} (id {})", name, kind, family.name, id);
    Ok(())
}
