//! CSV import of ledger transactions
//!
//! Expected header: `date,category,kind,amount,description`. The `kind` and
//! `description` columns may be empty; kind defaults to expense. Amounts are
//! stored as absolute values, direction comes from the category kind.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{CategoryKind, NewTransaction};

/// One parsed CSV row, before categories are resolved
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub category: String,
    pub kind: CategoryKind,
    pub amount: f64,
    pub description: String,
    /// Position among identical rows in the same file
    pub occurrence: u32,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportStats {
    pub imported: usize,
    pub skipped: usize,
    pub categories_created: usize,
}

/// Parse ledger CSV data
pub fn parse_ledger_csv<R: Read>(reader: R) -> Result<Vec<LedgerRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::Import(format!("Missing '{}' column", name)))
    };
    let date_col = column("date")?;
    let category_col = column("category")?;
    let amount_col = column("amount")?;
    let kind_col = column("kind").ok();
    let description_col = column("description").ok();

    let mut seen: HashMap<(NaiveDate, String, String, String), u32> = HashMap::new();
    let mut rows = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let line = line + 2; // 1-based, after the header

        let date = parse_date(record.get(date_col).unwrap_or_default())
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;

        let category = record.get(category_col).unwrap_or_default().to_string();
        if category.is_empty() {
            return Err(Error::Import(format!("Line {}: missing category", line)));
        }

        let kind = match kind_col.and_then(|i| record.get(i)).filter(|s| !s.is_empty()) {
            Some(k) => k
                .parse()
                .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?,
            None => CategoryKind::Expense,
        };

        let amount_str = record.get(amount_col).unwrap_or_default();
        let amount = parse_amount(amount_str)
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?
            .abs();

        let description = description_col
            .and_then(|i| record.get(i))
            .unwrap_or_default()
            .to_string();

        let key = (date, category.clone(), amount_str.to_string(), description.clone());
        let occurrence = seen.entry(key).or_insert(0);
        *occurrence += 1;

        rows.push(LedgerRow {
            date,
            category,
            kind,
            amount,
            description,
            occurrence: *occurrence,
        });
    }

    debug!(rows = rows.len(), "Parsed ledger CSV");
    Ok(rows)
}

/// Insert parsed rows for a family, creating categories as needed
///
/// Re-importing the same file is a no-op: every row hashes to the same
/// `import_hash` and is skipped.
pub fn import_rows(db: &Database, family_id: i64, rows: &[LedgerRow]) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let mut category_ids: HashMap<String, i64> = HashMap::new();

    for row in rows {
        let key = row.category.to_lowercase();
        let category_id = match category_ids.get(&key) {
            Some(&id) => id,
            None => {
                let id = match db.find_category(family_id, &row.category)? {
                    Some(existing) => existing.id,
                    None => {
                        stats.categories_created += 1;
                        db.upsert_category(family_id, &row.category, row.kind)?
                    }
                };
                category_ids.insert(key, id);
                id
            }
        };

        let tx = NewTransaction {
            category_id,
            date: row.date,
            amount: row.amount,
            description: row.description.clone(),
            import_hash: generate_hash(family_id, row),
        };

        match db.insert_transaction(family_id, &tx)? {
            Some(_) => stats.imported += 1,
            None => stats.skipped += 1,
        }
    }

    info!(
        family_id,
        imported = stats.imported,
        skipped = stats.skipped,
        categories_created = stats.categories_created,
        "Import complete"
    );
    Ok(stats)
}

/// Parse and import in one step
pub fn import_csv<R: Read>(db: &Database, family_id: i64, reader: R) -> Result<ImportStats> {
    let rows = parse_ledger_csv(reader)?;
    import_rows(db, family_id, &rows)
}

/// Generate a unique hash for deduplication
pub fn generate_hash(family_id: i64, row: &LedgerRow) -> String {
    let mut hasher = Sha256::new();
    hasher.update(family_id.to_be_bytes());
    hasher.update(row.date.to_string().as_bytes());
    hasher.update(row.category.to_lowercase().as_bytes());
    hasher.update(row.amount.to_be_bytes());
    hasher.update(row.description.as_bytes());
    hasher.update(row.occurrence.to_be_bytes());
    hex::encode(hasher.finalize())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%d.%m.%Y", // 15.01.2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and thousands separators
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', '€', '£', ',', ' ', '_'], "")
        .replace('(', "-")
        .replace(')', "");

    let amount = cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))?;

    if !amount.is_finite() {
        return Err(Error::Import(format!("Unable to parse amount: {}", s)));
    }
    Ok(amount)
}
