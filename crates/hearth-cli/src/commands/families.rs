//! Family command implementations

use anyhow::Result;
use hearth_core::db::Database;

pub fn cmd_families_list(db: &Database) -> Result<()> {
    let families = db.list_families()?;

    if families.is_empty() {
        println!("No families yet. Add one with:");
        println!("  hearth families add Smith");
        return Ok(());
    }

    println!();
    println!("🏠 Families");
    println!("   ─────────────────────────────");

    for family in families {
        println!("   [{}] {}", family.id, family.name);
    }

    Ok(())
}

pub fn cmd_families_add(db: &Database, name: &str) -> Result<()> {
    let id = db.upsert_family(name)?;
    println!("✅ Family '{}' ready (id {})", name.trim(), id);
    Ok(())
}
