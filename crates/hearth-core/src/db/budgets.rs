//! Budget operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Budget, YearMonth};

const BUDGET_COLUMNS: &str = r#"
    b.id, b.family_id, b.category_id, c.name, b.year, b.month, b.amount, b.created_at
"#;

impl Database {
    /// Create or replace the budget for a category in one month
    pub fn upsert_budget(
        &self,
        family_id: i64,
        category_id: i64,
        period: YearMonth,
        amount: f64,
    ) -> Result<i64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "Budget amount must be a non-negative number, got {}",
                amount
            )));
        }

        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO budgets (family_id, category_id, year, month, amount)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(family_id, category_id, year, month)
            DO UPDATE SET amount = excluded.amount
            "#,
            params![family_id, category_id, period.year, period.month, amount],
        )?;

        let id: i64 = conn.query_row(
            "SELECT id FROM budgets WHERE family_id = ? AND category_id = ? AND year = ? AND month = ?",
            params![family_id, category_id, period.year, period.month],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    /// List budgets for a family in a year, optionally narrowed to one month
    pub fn list_budgets(&self, family_id: i64, year: i32, month: Option<u32>) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM budgets b
            JOIN categories c ON c.id = b.category_id
            WHERE b.family_id = ?1 AND b.year = ?2 AND (?3 IS NULL OR b.month = ?3)
            ORDER BY b.month, c.name
            "#,
            BUDGET_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let budgets = stmt
            .query_map(params![family_id, year, month], |row| Self::row_to_budget(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    /// Get a budget by ID
    pub fn get_budget(&self, id: i64) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM budgets b JOIN categories c ON c.id = b.category_id WHERE b.id = ?",
            BUDGET_COLUMNS
        );
        let budget = conn
            .query_row(&sql, params![id], |row| Self::row_to_budget(row))
            .optional()?;

        Ok(budget)
    }

    /// Find the budget for a category in one month
    pub fn find_budget(
        &self,
        family_id: i64,
        category_id: i64,
        period: YearMonth,
    ) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM budgets b
            JOIN categories c ON c.id = b.category_id
            WHERE b.family_id = ? AND b.category_id = ? AND b.year = ? AND b.month = ?
            "#,
            BUDGET_COLUMNS
        );
        let budget = conn
            .query_row(
                &sql,
                params![family_id, category_id, period.year, period.month],
                |row| Self::row_to_budget(row),
            )
            .optional()?;

        Ok(budget)
    }

    /// Delete a budget
    pub fn delete_budget(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM budgets WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Budget {}", id)));
        }
        Ok(())
    }

    fn row_to_budget(row: &Row<'_>) -> rusqlite::Result<Budget> {
        let created_at_str: String = row.get(7)?;
        Ok(Budget {
            id: row.get(0)?,
            family_id: row.get(1)?,
            category_id: row.get(2)?,
            category_name: row.get(3)?,
            year: row.get(4)?,
            month: row.get(5)?,
            amount: row.get(6)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
