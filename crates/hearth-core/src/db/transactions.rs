//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction};

impl Database {
    /// Insert a transaction (skips duplicates based on import_hash)
    ///
    /// Returns `None` when a transaction with the same hash already exists.
    pub fn insert_transaction(&self, family_id: i64, tx: &NewTransaction) -> Result<Option<i64>> {
        if !tx.amount.is_finite() || tx.amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "Transaction amount must be a non-negative number, got {}",
                tx.amount
            )));
        }

        let conn = self.conn()?;

        let category_family: Option<i64> = conn
            .query_row(
                "SELECT family_id FROM categories WHERE id = ?",
                params![tx.category_id],
                |row| row.get(0),
            )
            .optional()?;

        match category_family {
            Some(fid) if fid == family_id => {}
            Some(_) => {
                return Err(Error::InvalidData(format!(
                    "Category {} does not belong to family {}",
                    tx.category_id, family_id
                )))
            }
            None => {
                return Err(Error::NotFound(format!("Category {}", tx.category_id)));
            }
        }

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE import_hash = ?",
                params![tx.import_hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None); // Duplicate, skip
        }

        conn.execute(
            r#"
            INSERT INTO transactions (family_id, category_id, date, amount, description, import_hash)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                family_id,
                tx.category_id,
                tx.date.to_string(),
                tx.amount,
                tx.description,
                tx.import_hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// List transactions for a family, newest first
    pub fn list_transactions(
        &self,
        family_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, family_id, category_id, date, amount, description, import_hash, created_at
            FROM transactions
            WHERE family_id = ?1
              AND (?2 IS NULL OR date >= ?2)
              AND (?3 IS NULL OR date <= ?3)
            ORDER BY date DESC, id DESC
            LIMIT ?4 OFFSET ?5
            "#,
        )?;

        let transactions = stmt
            .query_map(
                params![
                    family_id,
                    from.map(|d| d.to_string()),
                    to.map(|d| d.to_string()),
                    limit,
                    offset
                ],
                |row| Self::row_to_transaction(row),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let transaction = conn
            .query_row(
                r#"
                SELECT id, family_id, category_id, date, amount, description, import_hash, created_at
                FROM transactions WHERE id = ?
                "#,
                params![id],
                |row| Self::row_to_transaction(row),
            )
            .optional()?;

        Ok(transaction)
    }

    /// Count transactions for a family
    pub fn count_transactions(&self, family_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE family_id = ?",
            params![family_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(3)?;
        let created_at_str: String = row.get(7)?;
        let import_hash: Option<String> = row.get(6)?;
        Ok(Transaction {
            id: row.get(0)?,
            family_id: row.get(1)?,
            category_id: row.get(2)?,
            date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            amount: row.get(4)?,
            description: row.get(5)?,
            import_hash: import_hash.unwrap_or_default(),
            created_at: parse_datetime(&created_at_str),
        })
    }
}
