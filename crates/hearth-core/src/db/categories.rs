//! Category operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, CategoryKind};

impl Database {
    /// Create or get a category for a family
    ///
    /// An existing category keeps its original kind.
    pub fn upsert_category(&self, family_id: i64, name: &str, kind: CategoryKind) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData(
                "Category name cannot be empty".to_string(),
            ));
        }

        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM categories WHERE family_id = ? AND name = ?",
                params![family_id, name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO categories (family_id, name, kind) VALUES (?, ?, ?)",
            params![family_id, name, kind.as_str()],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List categories for a family, optionally filtered by kind
    pub fn list_categories(
        &self,
        family_id: i64,
        kind: Option<CategoryKind>,
    ) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, family_id, name, kind, created_at
            FROM categories
            WHERE family_id = ?1 AND (?2 IS NULL OR kind = ?2)
            ORDER BY kind, name
            "#,
        )?;

        let categories = stmt
            .query_map(params![family_id, kind.map(|k| k.as_str())], |row| {
                Self::row_to_category(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT id, family_id, name, kind, created_at FROM categories WHERE id = ?",
                params![id],
                |row| Self::row_to_category(row),
            )
            .optional()?;

        Ok(category)
    }

    /// Find a category by name within a family (case-insensitive)
    pub fn find_category(&self, family_id: i64, name: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                r#"
                SELECT id, family_id, name, kind, created_at
                FROM categories
                WHERE family_id = ? AND name = ? COLLATE NOCASE
                "#,
                params![family_id, name.trim()],
                |row| Self::row_to_category(row),
            )
            .optional()?;

        Ok(category)
    }

    fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
        let kind_str: String = row.get(3)?;
        let created_at_str: String = row.get(4)?;
        Ok(Category {
            id: row.get(0)?,
            family_id: row.get(1)?,
            name: row.get(2)?,
            kind: kind_str.parse().unwrap_or(CategoryKind::Expense),
            created_at: parse_datetime(&created_at_str),
        })
    }
}
