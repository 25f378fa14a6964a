//! Status and reset command implementations

use std::path::Path;

use anyhow::{Context, Result};

use super::open_db;

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    use hearth_core::db::DB_KEY_ENV;
    use std::fs;

    println!();
    println!("📊 Hearth Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    match hearth_core::analytics::config::default_config_path() {
        Some(path) if path.exists() => println!("   Analytics config: {}", path.display()),
        _ => println!("   Analytics config: built-in defaults"),
    }

    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                if let Ok(stats) = db.stats() {
                    println!();
                    println!("   Families: {}", stats.families);
                    println!("   Categories: {}", stats.categories);
                    println!("   Transactions: {}", stats.transactions);
                    println!("   Budgets: {}", stats.budgets);
                    println!("   Budget alerts: {}", stats.budget_alerts);
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    use std::io::{self, Write};

    print!("{}", prompt);
    print!("Are you sure? [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Reset the database (soft or hard)
pub fn cmd_reset(db_path: &Path, soft: bool, yes: bool, no_encrypt: bool) -> Result<()> {
    use std::fs;

    if soft {
        if !db_path.exists() {
            anyhow::bail!("Database not found: {}", db_path.display());
        }

        if !yes
            && !confirm(
                "⚠️  This will delete all transactions, budget alerts and audit entries.\n   \
                 Families, categories and budgets will be preserved.\n\n",
            )?
        {
            println!("Cancelled.");
            return Ok(());
        }

        let db = open_db(db_path, no_encrypt)?;
        db.soft_reset()?;

        println!("✅ Database soft reset complete.");
        println!("   Cleared: transactions, budget alerts, audit log");
        println!("   Preserved: families, categories, budgets");
    } else {
        if !yes
            && !confirm(
                "⚠️  This will DELETE the entire database and start fresh.\n   \
                 All families, budgets and history will be lost.\n\n",
            )?
        {
            println!("Cancelled.");
            return Ok(());
        }

        if db_path.exists() {
            fs::remove_file(db_path)
                .with_context(|| format!("Failed to delete database: {}", db_path.display()))?;
            // WAL and journal files may not exist
            let _ = fs::remove_file(db_path.with_extension("db-wal"));
            let _ = fs::remove_file(db_path.with_extension("db-shm"));
            let _ = fs::remove_file(db_path.with_extension("db-journal"));
        }

        super::cmd_init(db_path, no_encrypt)?;

        println!("\n✅ Database hard reset complete.");
    }

    Ok(())
}
