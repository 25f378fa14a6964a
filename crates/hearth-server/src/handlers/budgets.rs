//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use super::{require_family, require_family_category};
use crate::{get_actor, AppError, AppState, SuccessResponse};
use hearth_core::models::{Budget, YearMonth};

#[derive(Debug, Deserialize)]
pub struct BudgetQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertBudgetRequest {
    pub category_id: i64,
    pub year: i32,
    pub month: u32,
    pub amount: f64,
}

/// GET /api/families/:id/budgets - List budgets for a year (default: current)
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Path(family_id): Path<i64>,
    Query(params): Query<BudgetQuery>,
) -> Result<Json<Vec<Budget>>, AppError> {
    require_family(&state.db, family_id)?;
    let year = params.year.unwrap_or_else(|| Utc::now().year());
    YearMonth::new(year, params.month.unwrap_or(1))?;

    Ok(Json(state.db.list_budgets(family_id, year, params.month)?))
}

/// PUT /api/families/:id/budgets - Set the budget for a category and month
pub async fn upsert_budget(
    State(state): State<Arc<AppState>>,
    Path(family_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<UpsertBudgetRequest>,
) -> Result<Json<Budget>, AppError> {
    require_family(&state.db, family_id)?;
    let period = YearMonth::new(body.year, body.month)?;
    let category = require_family_category(&state.db, family_id, body.category_id)?;
    let actor = get_actor(&headers);

    let id = state
        .db
        .upsert_budget(family_id, category.id, period, body.amount)?;

    state.db.log_audit(
        &actor,
        "upsert",
        Some("budget"),
        Some(id),
        Some(&format!("{} {} = {:.2}", category.name, period, body.amount)),
    )?;

    let budget = state
        .db
        .get_budget(id)?
        .ok_or_else(|| AppError::internal("Budget vanished after upsert"))?;
    Ok(Json(budget))
}

/// GET /api/budgets/:id - Get a budget
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Budget>, AppError> {
    state
        .db
        .get_budget(id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(&format!("Budget {} not found", id)))
}

/// DELETE /api/budgets/:id - Delete a budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, AppError> {
    let actor = get_actor(&headers);

    state.db.delete_budget(id)?;
    state
        .db
        .log_audit(&actor, "delete", Some("budget"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
