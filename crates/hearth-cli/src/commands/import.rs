//! Ledger import command

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use hearth_core::{db::Database, import::import_csv};
use tracing::debug;

pub fn cmd_import(db: &Database, family: &str, file: &Path) -> Result<()> {
    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;

    // Importing creates the family on first use
    let family = match db.resolve_family(family)? {
        Some(f) => f,
        None => {
            let id = db.upsert_family(family)?;
            debug!(family_id = id, "Created family for import");
            super::resolve_family(db, &id.to_string())?
        }
    };

    println!("📥 Importing {} into {}...", file.display(), family.name);

    let stats = import_csv(db, family.id, BufReader::new(csv_file))
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!();
    println!("✅ Import complete");
    println!("   Imported: {}", stats.imported);
    if stats.skipped > 0 {
        println!("   Skipped (duplicates): {}", stats.skipped);
    }
    if stats.categories_created > 0 {
        println!("   New categories: {}", stats.categories_created);
    }

    let _ = db.log_audit(
        "cli",
        "import",
        Some("transactions"),
        Some(family.id),
        Some(&format!("imported={} skipped={}", stats.imported, stats.skipped)),
    );

    Ok(())
}
