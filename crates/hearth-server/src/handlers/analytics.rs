//! Forecast and tracking handlers
//!
//! Both run the engine on the blocking pool since a forecast reads a full
//! year of ledger history.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use super::require_family;
use crate::{AppError, AppState};
use hearth_core::analytics::{FamilyForecast, TrackingReport};
use hearth_core::models::YearMonth;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub family_id: i64,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Reference date, defaults to today
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct TrackingQuery {
    pub family_id: i64,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub as_of: Option<NaiveDate>,
}

/// Resolve the target month; without one, forecast the month after `as_of`
fn forecast_target(
    year: Option<i32>,
    month: Option<u32>,
    as_of: NaiveDate,
) -> Result<YearMonth, AppError> {
    match (year, month) {
        (None, None) => Ok(YearMonth::from_date(as_of).add_months(1)),
        (Some(y), Some(m)) => Ok(YearMonth::new(y, m)?),
        (None, Some(m)) => Ok(YearMonth::new(as_of.year(), m)?),
        (Some(_), None) => Err(AppError::bad_request("month is required when year is given")),
    }
}

/// GET /api/analytics/forecast?family_id=&year=&month=&as_of=
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<FamilyForecast>, AppError> {
    let as_of = params.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let target = forecast_target(params.year, params.month, as_of)?;

    let forecast = tokio::task::spawn_blocking(move || -> Result<FamilyForecast, AppError> {
        require_family(&state.db, params.family_id)?;
        Ok(state
            .analytics
            .forecast(&state.db, params.family_id, target, as_of)?)
    })
    .await??;

    Ok(Json(forecast))
}

/// GET /api/analytics/tracking?family_id=&year=&month=&as_of=
///
/// Year defaults to the year of `as_of`; without a month the whole year is tracked.
pub async fn get_tracking(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrackingQuery>,
) -> Result<Json<TrackingReport>, AppError> {
    let as_of = params.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let year = params.year.unwrap_or_else(|| as_of.year());
    YearMonth::new(year, params.month.unwrap_or(1))?;

    let report = tokio::task::spawn_blocking(move || -> Result<TrackingReport, AppError> {
        require_family(&state.db, params.family_id)?;
        Ok(state
            .analytics
            .track(&state.db, params.family_id, year, params.month, as_of)?)
    })
    .await??;

    Ok(Json(report))
}
