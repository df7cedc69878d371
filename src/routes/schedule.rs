// SPDX-License-Identifier: MIT

//! Scheduling routes: immediate and timed message delivery, plus the
//! audit log query surface.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/schedule/schedule", post(schedule_message))
        .route("/api/schedule/logs", get(get_logs))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRequest {
    /// "now" for immediate dispatch, "schedule" for a timed job
    #[serde(rename = "type")]
    kind: String,
    user_id: String,
    message: String,
    /// HH:mm, required when kind is "schedule"
    time: Option<String>,
    /// YYYY-MM-DD; absent means a daily recurring job
    date: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleResponse {
    success: bool,
    message: String,
    user_id: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_date: Option<String>,
}

/// Dispatch a message now, or register a timed job for it.
async fn schedule_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>> {
    match request.kind.as_str() {
        "now" => {
            state.scheduler.run_now(&request.user_id, &request.message)?;
            Ok(Json(ScheduleResponse {
                success: true,
                message: "Message dispatch triggered".to_string(),
                user_id: request.user_id,
                status: "sent".to_string(),
                scheduled_time: None,
                scheduled_date: None,
            }))
        }
        "schedule" => {
            let time = request.time.as_deref().ok_or_else(|| {
                AppError::Validation("time is required for scheduled messages".to_string())
            })?;
            state.scheduler.schedule_at(
                time,
                request.date.as_deref(),
                &request.user_id,
                &request.message,
            )?;
            Ok(Json(ScheduleResponse {
                success: true,
                message: match request.date {
                    Some(_) => "Message scheduled".to_string(),
                    None => "Daily message scheduled".to_string(),
                },
                user_id: request.user_id,
                status: "scheduled".to_string(),
                scheduled_time: Some(time.to_string()),
                scheduled_date: request.date,
            }))
        }
        other => Err(AppError::Validation(format!(
            "Unknown schedule type {:?} - expected \"now\" or \"schedule\"",
            other
        ))),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogsQuery {
    user_id: Option<String>,
}

#[derive(Serialize)]
struct LogsResponse {
    logs: Vec<String>,
}

/// Recent audit log lines, optionally filtered to one user.
async fn get_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> Json<LogsResponse> {
    Json(LogsResponse {
        logs: state.scheduler.get_logs(query.user_id.as_deref()),
    })
}
