// SPDX-License-Identifier: MIT

//! Direct notification send route.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/notify/send", post(send_notification))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest {
    user_id: String,
    message: String,
}

#[derive(Serialize)]
struct SendResponse {
    success: bool,
    data: serde_json::Value,
}

/// Send a message straight through the notification backend.
///
/// Dispatch failures surface with the backend's own status and body; the
/// error response distinguishes the auth step from the delivery step.
async fn send_notification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendRequest>,
) -> Result<Json<SendResponse>> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::Validation("userId is required".to_string()));
    }
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message is required".to_string()));
    }

    let receipt = state
        .pipeline
        .dispatcher()
        .send(&request.user_id, &request.message)
        .await?;

    Ok(Json(SendResponse {
        success: true,
        data: receipt.ack,
    }))
}
