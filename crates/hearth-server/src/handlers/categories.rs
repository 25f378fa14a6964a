//! Category handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use super::require_family;
use crate::{get_actor, AppError, AppState};
use hearth_core::models::{Category, CategoryKind};

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: CategoryKind,
}

fn default_kind() -> CategoryKind {
    CategoryKind::Expense
}

/// GET /api/families/:id/categories - List categories, optionally by kind
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Path(family_id): Path<i64>,
    Query(params): Query<CategoryQuery>,
) -> Result<Json<Vec<Category>>, AppError> {
    require_family(&state.db, family_id)?;

    let kind = params
        .kind
        .as_deref()
        .map(|k| k.parse::<CategoryKind>())
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?;

    Ok(Json(state.db.list_categories(family_id, kind)?))
}

/// POST /api/families/:id/categories - Create a category (idempotent by name)
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Path(family_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    require_family(&state.db, family_id)?;
    let actor = get_actor(&headers);

    let id = state.db.upsert_category(family_id, &body.name, body.kind)?;
    state.db.log_audit(
        &actor,
        "create",
        Some("category"),
        Some(id),
        Some(&format!("{} ({})", body.name.trim(), body.kind)),
    )?;

    let category = state
        .db
        .get_category(id)?
        .ok_or_else(|| AppError::internal("Category vanished after insert"))?;
    Ok(Json(category))
}
