//! Hearth Core Library
//!
//! Shared functionality for the Hearth family budget tool:
//! - Database access and migrations (encrypted SQLite ledger)
//! - CSV import of ledger transactions
//! - Budget analytics: ensemble forecasting, strategies, live tracking
//! - Outbound budget alert events

pub mod analytics;
pub mod db;
pub mod error;
pub mod events;
pub mod import;
pub mod models;

pub use analytics::{BudgetAnalytics, EngineConfig, LedgerReader};
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use events::{BudgetEvent, EventSink, TracingSink};
pub use import::{import_csv, ImportStats};
