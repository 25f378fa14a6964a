//! Family operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Family;

impl Database {
    /// Create or get a family by name
    pub fn upsert_family(&self, name: &str) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Family name cannot be empty".to_string()));
        }

        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM families WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute("INSERT INTO families (name) VALUES (?)", params![name])?;

        Ok(conn.last_insert_rowid())
    }

    /// List all families
    pub fn list_families(&self) -> Result<Vec<Family>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM families ORDER BY name")?;

        let families = stmt
            .query_map([], |row| {
                let created_at_str: String = row.get(2)?;
                Ok(Family {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(families)
    }

    /// Get a family by ID
    pub fn get_family(&self, id: i64) -> Result<Option<Family>> {
        let conn = self.conn()?;
        let family = conn
            .query_row(
                "SELECT id, name, created_at FROM families WHERE id = ?",
                params![id],
                |row| {
                    let created_at_str: String = row.get(2)?;
                    Ok(Family {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        created_at: parse_datetime(&created_at_str),
                    })
                },
            )
            .optional()?;

        Ok(family)
    }

    /// Resolve a family by numeric ID or exact name
    pub fn resolve_family(&self, name_or_id: &str) -> Result<Option<Family>> {
        if let Ok(id) = name_or_id.parse::<i64>() {
            if let Some(family) = self.get_family(id)? {
                return Ok(Some(family));
            }
        }

        Ok(self
            .list_families()?
            .into_iter()
            .find(|f| f.name.eq_ignore_ascii_case(name_or_id.trim())))
    }
}
