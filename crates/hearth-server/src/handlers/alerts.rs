//! Budget alert handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use hearth_core::models::BudgetAlert;

#[derive(Debug, Deserialize)]
pub struct BudgetAlertQuery {
    pub family_id: Option<i64>,
    #[serde(default = "default_alert_limit")]
    pub limit: i64,
}

fn default_alert_limit() -> i64 {
    50
}

/// GET /api/budget-alerts - Alerts recorded by the notifier, newest first
pub async fn list_budget_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BudgetAlertQuery>,
) -> Result<Json<Vec<BudgetAlert>>, AppError> {
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    Ok(Json(state.db.list_budget_alerts(params.family_id, limit)?))
}
