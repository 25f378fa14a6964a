//! Budget alert and audit log operations

use rusqlite::{params, Row};

use super::{parse_datetime, AuditEntry, Database};
use crate::error::Result;
use crate::events::BudgetEvent;
use crate::models::BudgetAlert;

impl Database {
    /// Persist a budget alert from an event
    ///
    /// One alert per budget and level; a repeat of the same level is ignored
    /// and returns `None`.
    pub fn record_budget_alert(&self, event: &BudgetEvent) -> Result<Option<i64>> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            r#"
            INSERT OR IGNORE INTO budget_alerts
                (family_id, budget_id, category_id, year, month, level, utilization_rate, message)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                event.family_id,
                event.budget_id,
                event.category_id,
                event.period.year,
                event.period.month,
                event.alert_level.as_str(),
                event.utilization_rate,
                event.message,
            ],
        )?;

        if inserted == 0 {
            return Ok(None);
        }

        Ok(Some(conn.last_insert_rowid()))
    }

    /// List persisted budget alerts, newest first
    pub fn list_budget_alerts(&self, family_id: Option<i64>, limit: i64) -> Result<Vec<BudgetAlert>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, family_id, budget_id, category_id, year, month, level,
                   utilization_rate, message, created_at
            FROM budget_alerts
            WHERE ?1 IS NULL OR family_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let alerts = stmt
            .query_map(params![family_id, limit], |row| Self::row_to_alert(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(alerts)
    }

    fn row_to_alert(row: &Row<'_>) -> rusqlite::Result<BudgetAlert> {
        let created_at_str: String = row.get(9)?;
        Ok(BudgetAlert {
            id: row.get(0)?,
            family_id: row.get(1)?,
            budget_id: row.get(2)?,
            category_id: row.get(3)?,
            year: row.get(4)?,
            month: row.get(5)?,
            level: row.get(6)?,
            utilization_rate: row.get(7)?,
            message: row.get(8)?,
            created_at: parse_datetime(&created_at_str),
        })
    }

    /// Log an audit entry
    pub fn log_audit(
        &self,
        actor: &str,
        action: &str,
        entity_type: Option<&str>,
        entity_id: Option<i64>,
        details: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO audit_log (actor, action, entity_type, entity_id, details)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![actor, action, entity_type, entity_id, details],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List audit log entries
    pub fn list_audit_log(&self, limit: i64) -> Result<Vec<AuditEntry>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, timestamp, actor, action, entity_type, entity_id, details
            FROM audit_log
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let entries = stmt
            .query_map(params![limit], |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    actor: row.get(2)?,
                    action: row.get(3)?,
                    entity_type: row.get(4)?,
                    entity_id: row.get(5)?,
                    details: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
