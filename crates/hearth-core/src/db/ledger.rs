//! Aggregate ledger reads
//!
//! These are the read shapes the analytics engine consumes. Every sum is taken
//! over whole calendar days `from..=to` and only over the family's own rows.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::CategoryMonthTotal;

impl Database {
    /// Expense totals grouped by category and calendar month
    ///
    /// Months with no transactions are absent; callers zero-fill.
    pub fn monthly_expense_totals(
        &self,
        family_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CategoryMonthTotal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                c.id,
                c.name,
                CAST(strftime('%Y', t.date) AS INTEGER) AS y,
                CAST(strftime('%m', t.date) AS INTEGER) AS m,
                SUM(t.amount),
                COUNT(*)
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.family_id = ?1
              AND c.kind = 'expense'
              AND t.date >= ?2
              AND t.date <= ?3
            GROUP BY c.id, y, m
            ORDER BY c.id, y, m
            "#,
        )?;

        let totals = stmt
            .query_map(
                params![family_id, from.to_string(), to.to_string()],
                |row| {
                    Ok(CategoryMonthTotal {
                        category_id: row.get(0)?,
                        category_name: row.get(1)?,
                        year: row.get(2)?,
                        month: row.get(3)?,
                        amount: row.get(4)?,
                        transaction_count: row.get(5)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }

    /// Expense spent per category over a date range
    pub fn spent_by_category(
        &self,
        family_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeMap<i64, f64>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.category_id, SUM(t.amount)
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.family_id = ?1
              AND c.kind = 'expense'
              AND t.date >= ?2
              AND t.date <= ?3
            GROUP BY t.category_id
            "#,
        )?;

        let rows = stmt
            .query_map(
                params![family_id, from.to_string(), to.to_string()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)),
            )?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;

        Ok(rows)
    }

    /// Total income over a date range
    pub fn income_total(&self, family_id: i64, from: NaiveDate, to: NaiveDate) -> Result<f64> {
        let conn = self.conn()?;
        let total: f64 = conn.query_row(
            r#"
            SELECT COALESCE(SUM(t.amount), 0.0)
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.family_id = ?1
              AND c.kind = 'income'
              AND t.date >= ?2
              AND t.date <= ?3
            "#,
            params![family_id, from.to_string(), to.to_string()],
            |row| row.get(0),
        )?;

        Ok(total)
    }
}
