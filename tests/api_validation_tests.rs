// SPDX-License-Identifier: MIT

//! API input validation tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_schedule_now_requires_user_and_message() {
    let (app, state) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(json_post(
            "/api/schedule/schedule",
            serde_json::json!({"type": "now", "userId": "", "message": "hallo"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");

    let response = app
        .oneshot(json_post(
            "/api/schedule/schedule",
            serde_json::json!({"type": "now", "userId": "u1", "message": "  "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Rejected requests must leave no trace in the log.
    assert!(state.audit.is_empty());
}

#[tokio::test]
async fn test_schedule_rejects_bad_time_format() {
    let (app, state) = common::create_test_app();

    for bad_time in ["9am", "25:00", "09:75", "0930"] {
        let response = app
            .clone()
            .oneshot(json_post(
                "/api/schedule/schedule",
                serde_json::json!({
                    "type": "schedule",
                    "time": bad_time,
                    "userId": "u1",
                    "message": "hallo",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "time {:?} should be rejected",
            bad_time
        );
    }

    assert!(state.audit.is_empty());
    assert_eq!(state.scheduler.job_count(), 0);
}

#[tokio::test]
async fn test_schedule_rejects_past_date() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(json_post(
            "/api/schedule/schedule",
            serde_json::json!({
                "type": "schedule",
                "time": "09:30",
                "date": "2020-01-01",
                "userId": "u1",
                "message": "hallo",
            }),
        ))
        .await
        .unwrap();

    // A moment that can never fire is rejected, not reported as scheduled.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");

    assert_eq!(state.scheduler.job_count(), 0);
    assert!(state.audit.is_empty());
}

#[tokio::test]
async fn test_schedule_rejects_unknown_type() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(json_post(
            "/api/schedule/schedule",
            serde_json::json!({"type": "later", "userId": "u1", "message": "hallo"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schedule_daily_registers_job() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(json_post(
            "/api/schedule/schedule",
            serde_json::json!({
                "type": "schedule",
                "time": "23:59",
                "userId": "u1",
                "message": "hallo",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "scheduled");
    assert_eq!(body["scheduledTime"], "23:59");
    assert!(body.get("scheduledDate").is_none());

    assert_eq!(state.scheduler.job_count(), 1);
    let logs = state.scheduler.get_logs(Some("u1"));
    assert_eq!(logs.len(), 1);
    assert!(logs[0].contains("Daily message scheduled for user u1 at 23:59"));
}

#[tokio::test]
async fn test_schedule_dated_echoes_date() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(json_post(
            "/api/schedule/schedule",
            serde_json::json!({
                "type": "schedule",
                "time": "08:00",
                "date": "2099-12-31",
                "userId": "u1",
                "message": "hallo",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "scheduled");
    assert_eq!(body["scheduledDate"], "2099-12-31");
}

#[tokio::test]
async fn test_logs_endpoint_empty_and_filtered() {
    let (app, state) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/schedule/logs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["logs"], serde_json::json!([]));

    state.audit.append("for u1", Some("u1"), "execution");
    state.audit.append("for u2", Some("u2"), "execution");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/schedule/logs?userId=u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].as_str().unwrap().contains("for u1"));
}

#[tokio::test]
async fn test_notify_send_requires_fields() {
    let (app, _state) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(json_post(
            "/api/notify/send",
            serde_json::json!({"userId": "", "message": "hallo"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_post(
            "/api/notify/send",
            serde_json::json!({"userId": "u1", "message": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_message_generate_requires_user_id() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/message/generate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_daily_summary_rejects_partial_date_range() {
    let (app, _state) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/fitrockr/daily-summary/u1?startDate=2025-03-01")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/fitrockr/daily-summary/u1?startDate=03/01/2025&endDate=03/02/2025")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
