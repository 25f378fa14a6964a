//! Transaction handlers
//!
//! Posting a transaction re-tracks the budget it lands in (if any) and
//! publishes an event when that budget reaches warning level or above.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{require_family, require_family_category};
use crate::{get_actor, AppError, AppState, MAX_PAGE_LIMIT};
use hearth_core::analytics::TrackingSnapshot;
use hearth_core::events::publish_alerts;
use hearth_core::models::{NewTransaction, Transaction, YearMonth};

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub category_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    /// Client-supplied idempotency key; generated when absent
    pub import_hash: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateTransactionResponse {
    /// `None` when the transaction was a duplicate
    pub id: Option<i64>,
    /// Budget status after the insert, when a budget covers the month
    pub tracking: Option<TrackingSnapshot>,
    pub events_published: usize,
}

/// GET /api/families/:id/transactions - List transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(family_id): Path<i64>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<TransactionListResponse>, AppError> {
    require_family(&state.db, family_id)?;
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let transactions =
        state
            .db
            .list_transactions(family_id, params.from, params.to, limit, offset)?;
    let total = state.db.count_transactions(family_id)?;

    Ok(Json(TransactionListResponse {
        transactions,
        total,
    }))
}

/// POST /api/families/:id/transactions - Record a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Path(family_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<CreateTransactionRequest>,
) -> Result<Json<CreateTransactionResponse>, AppError> {
    let actor = get_actor(&headers);
    let today = Utc::now().date_naive();

    let response = tokio::task::spawn_blocking(move || {
        record_and_track(&state, &actor, family_id, body, today)
    })
    .await??;

    Ok(Json(response))
}

fn record_and_track(
    state: &AppState,
    actor: &str,
    family_id: i64,
    body: CreateTransactionRequest,
    as_of: NaiveDate,
) -> Result<CreateTransactionResponse, AppError> {
    require_family(&state.db, family_id)?;
    require_family_category(&state.db, family_id, body.category_id)?;

    let import_hash = body
        .import_hash
        .clone()
        .unwrap_or_else(|| api_hash(family_id, &body));
    let tx = NewTransaction {
        category_id: body.category_id,
        date: body.date,
        amount: body.amount,
        description: body.description,
        import_hash,
    };

    let Some(id) = state.db.insert_transaction(family_id, &tx)? else {
        debug!(family_id, "Duplicate transaction ignored");
        return Ok(CreateTransactionResponse {
            id: None,
            tracking: None,
            events_published: 0,
        });
    };

    state.db.log_audit(
        actor,
        "create",
        Some("transaction"),
        Some(id),
        Some(&format!("amount={:.2}", tx.amount)),
    )?;

    let period = YearMonth::from_date(tx.date);
    let Some(budget) = state.db.find_budget(family_id, tx.category_id, period)? else {
        return Ok(CreateTransactionResponse {
            id: Some(id),
            tracking: None,
            events_published: 0,
        });
    };

    let snapshot = state.analytics.track_budget(&state.db, &budget, as_of)?;

    // A full channel must not fail the write that already happened
    let events_published =
        match publish_alerts(&state.events, family_id, std::slice::from_ref(&snapshot)) {
            Ok(n) => n,
            Err(e) => {
                warn!(budget_id = budget.id, "Dropped budget event: {}", e);
                0
            }
        };

    Ok(CreateTransactionResponse {
        id: Some(id),
        tracking: Some(snapshot),
        events_published,
    })
}

/// Import key for API-created transactions without a client key
///
/// Unique per call, so identical posts are recorded separately. Clients that
/// need idempotent retries send their own `import_hash`.
fn api_hash(family_id: i64, body: &CreateTransactionRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(family_id.to_le_bytes());
    hasher.update(body.category_id.to_le_bytes());
    hasher.update(body.date.to_string().as_bytes());
    hasher.update(body.amount.to_le_bytes());
    hasher.update(body.description.as_bytes());
    hasher.update(
        Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes(),
    );
    format!("api:{}", hex::encode(hasher.finalize()))
}
