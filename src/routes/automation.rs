// SPDX-License-Identifier: MIT

//! Automation routes: trigger a coaching sweep on demand.

use crate::error::Result;
use crate::services::SweepReport;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/automation/run", post(run_automation))
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunRequest {
    /// When present, sweep only this user (with the longer lookback window)
    user_id: Option<String>,
}

#[derive(Serialize)]
struct RunResponse {
    success: bool,
    report: SweepReport,
}

/// Run the coaching pipeline, for all provider users or a single one.
async fn run_automation(
    State(state): State<Arc<AppState>>,
    body: Option<Json<RunRequest>>,
) -> Result<Json<RunResponse>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let report = match request.user_id.as_deref() {
        Some(user_id) => state.pipeline.sweep_user(user_id).await?,
        None => state.pipeline.sweep().await?,
    };

    Ok(Json(RunResponse {
        success: true,
        report,
    }))
}
