//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_engine` - Analytics engine with the layered config
//! - `resolve_family` - Look up a family by name or ID
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use hearth_core::{analytics::EngineConfig, db::Database, models::Family, BudgetAnalytics};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Build the analytics engine from the embedded config plus any local override
pub fn load_engine() -> Result<BudgetAnalytics> {
    let config = EngineConfig::load().context("Failed to load analytics config")?;
    Ok(BudgetAnalytics::new(config))
}

pub fn resolve_family(db: &Database, name_or_id: &str) -> Result<Family> {
    db.resolve_family(name_or_id)?.ok_or_else(|| {
        anyhow::anyhow!(
            "Family '{}' not found. Add it with: hearth families add \"{}\"",
            name_or_id,
            name_or_id
        )
    })
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", s))
}

/// `--as-of` date, defaulting to today
pub fn resolve_as_of(as_of: Option<&str>) -> Result<NaiveDate> {
    match as_of {
        Some(s) => parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add a family: hearth families add Smith");
    println!("  2. Import transactions: hearth import --family Smith --file ledger.csv");
    println!("  3. Forecast next month: hearth forecast --family Smith --year 2024 --month 7");

    Ok(())
}
