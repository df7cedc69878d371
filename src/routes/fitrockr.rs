// SPDX-License-Identifier: MIT

//! Routes exposing raw Fitrockr provider data for inspection.

use crate::error::{AppError, Result};
use crate::models::CalendarDate;
use crate::services::fitrockr::{FitrockrUser, RawDailySummary};
use crate::time_utils::DateWindow;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Default lookback when the summary endpoint gets no explicit dates.
const DEFAULT_LOOKBACK_DAYS: i64 = 7;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/fitrockr/users", get(list_users))
        .route("/api/fitrockr/users/{id}", get(get_user))
        .route("/api/fitrockr/daily-summary/{id}", get(daily_summary))
}

/// List all users known to the provider.
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<FitrockrUser>>> {
    Ok(Json(state.fitrockr.list_users().await?))
}

/// Fetch a single provider user.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FitrockrUser>> {
    let user = state
        .fitrockr
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Fitrockr user {} not found", id)))?;
    Ok(Json(user))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

/// Fetch a user's raw daily summaries over a date window.
///
/// Both dates must be given together; without them the window defaults to
/// the last seven days.
async fn daily_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Vec<RawDailySummary>>> {
    let window = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => DateWindow::new(parse_date(&start)?, parse_date(&end)?),
        (None, None) => DateWindow::last_days(DEFAULT_LOOKBACK_DAYS),
        _ => {
            return Err(AppError::Validation(
                "startDate and endDate must be provided together".to_string(),
            ))
        }
    };

    let entries = state.fitrockr.daily_summaries(&id, &window).await?;
    Ok(Json(entries))
}

fn parse_date(raw: &str) -> Result<CalendarDate> {
    let date = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("Invalid date {:?} - expected YYYY-MM-DD", raw))
    })?;
    Ok(CalendarDate::from_naive(date))
}
