//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod alerts;
pub mod analytics;
pub mod audit;
pub mod budgets;
pub mod categories;
pub mod families;
pub mod transactions;

// Re-export all handlers for use in router
pub use alerts::*;
pub use analytics::*;
pub use audit::*;
pub use budgets::*;
pub use categories::*;
pub use families::*;
pub use transactions::*;

use hearth_core::{db::Database, models::Family};

use crate::AppError;

/// Load a family or fail with 404
pub(crate) fn require_family(db: &Database, id: i64) -> Result<Family, AppError> {
    db.get_family(id)?
        .ok_or_else(|| AppError::not_found(&format!("Family {} not found", id)))
}

/// Check that a category exists and belongs to the family
pub(crate) fn require_family_category(
    db: &Database,
    family_id: i64,
    category_id: i64,
) -> Result<hearth_core::models::Category, AppError> {
    match db.get_category(category_id)? {
        Some(c) if c.family_id == family_id => Ok(c),
        Some(_) => Err(AppError::bad_request(&format!(
            "Category {} does not belong to family {}",
            category_id, family_id
        ))),
        None => Err(AppError::not_found(&format!(
            "Category {} not found",
            category_id
        ))),
    }
}
