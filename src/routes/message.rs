// SPDX-License-Identifier: MIT

//! Message generation routes.
//!
//! Two paths: POST generates from caller-supplied metrics (no provider
//! calls), GET fetches a user's recent data from the provider first.

use crate::error::Result;
use crate::models::{AggregatedMetrics, HumanReadableMetrics};
use crate::services::message::DEFAULT_MESSAGE;
use crate::services::GeneratedMessage;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/message/generate",
        get(generate_for_user).post(generate_from_data),
    )
}

// ─── POST: caller-supplied metrics ───────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    health_data: AggregatedMetrics,
    user_name: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    message: String,
}

/// Generate a coaching message from metrics supplied in the request body.
async fn generate_from_data(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let message = state
        .pipeline
        .synthesizer()
        .generate(&request.health_data, request.user_name.as_deref())
        .await;
    Ok(Json(GenerateResponse { message }))
}

// ─── GET: provider-backed generation ─────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserGenerateResponse {
    message: String,
    has_fitrockr_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    fitrockr_data: Option<HumanReadableMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Generate a coaching message from the user's recent provider data.
///
/// Returns 404 when the user is unknown to the provider; a known user with
/// no recent data gets the default message and an explanatory error field.
async fn generate_for_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserGenerateResponse>> {
    let response = match state.pipeline.generate_for_user(&query.user_id).await? {
        GeneratedMessage::Generated { message, data } => UserGenerateResponse {
            message,
            has_fitrockr_data: true,
            fitrockr_data: Some(data),
            error: None,
        },
        GeneratedMessage::NoData => UserGenerateResponse {
            message: DEFAULT_MESSAGE.to_string(),
            has_fitrockr_data: false,
            fitrockr_data: None,
            error: Some("No recent health data available".to_string()),
        },
    };
    Ok(Json(response))
}
