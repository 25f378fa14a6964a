//! Family handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use super::require_family;
use crate::{get_actor, AppError, AppState};
use hearth_core::models::Family;

#[derive(Debug, Deserialize)]
pub struct CreateFamilyRequest {
    pub name: String,
}

/// GET /api/families - List families
pub async fn list_families(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Family>>, AppError> {
    let actor = get_actor(request.headers());
    let families = state.db.list_families()?;

    state.db.log_audit(
        &actor,
        "list",
        Some("family"),
        None,
        Some(&format!("count={}", families.len())),
    )?;

    Ok(Json(families))
}

/// GET /api/families/:id - Get a family
pub async fn get_family(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Family>, AppError> {
    Ok(Json(require_family(&state.db, id)?))
}

/// POST /api/families - Create a family (idempotent by name)
pub async fn create_family(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateFamilyRequest>,
) -> Result<Json<Family>, AppError> {
    let actor = get_actor(&headers);
    let id = state.db.upsert_family(&body.name)?;

    state
        .db
        .log_audit(&actor, "create", Some("family"), Some(id), Some(body.name.trim()))?;

    Ok(Json(require_family(&state.db, id)?))
}
