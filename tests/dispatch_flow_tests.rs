// SPDX-License-Identifier: MIT

//! End-to-end dispatch tests against a local mock notification backend.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::post,
    Json, Router,
};
use pulsecoach::config::Config;
use tower::ServiceExt;

mod common;

/// Spawn a mock notification backend; returns its base URL.
async fn spawn_mock_backend(auth_ok: bool) -> String {
    let auth = move || async move {
        if auth_ok {
            (
                StatusCode::OK,
                Json(serde_json::json!({"data": {"token": "test-token"}})),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "bad credentials"})),
            )
        }
    };
    let notify = || async { Json(serde_json::json!({"status": "delivered"})) };

    let app = Router::new()
        .route("/auth/login", post(auth))
        .route("/notify", post(notify));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn backend_config(base: &str) -> Config {
    Config {
        notify_auth_url: format!("{}/auth/login", base),
        notify_url: format!("{}/notify", base),
        ..Config::default()
    }
}

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
async fn test_notify_send_delivers_through_backend() {
    let base = spawn_mock_backend(true).await;
    let (app, _state) = common::create_test_app_with_config(backend_config(&base));

    let response = app
        .oneshot(json_post(
            "/api/notify/send",
            serde_json::json!({"userId": "u1", "message": "hallo"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "delivered");
}

#[tokio::test]
async fn test_notify_send_surfaces_auth_failure_status() {
    let base = spawn_mock_backend(false).await;
    let (app, _state) = common::create_test_app_with_config(backend_config(&base));

    let response = app
        .oneshot(json_post(
            "/api/notify/send",
            serde_json::json!({"userId": "u1", "message": "hallo"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "auth_error");
}

#[tokio::test]
async fn test_run_now_dispatches_and_audits() {
    let base = spawn_mock_backend(true).await;
    let (app, state) = common::create_test_app_with_config(backend_config(&base));

    let response = app
        .oneshot(json_post(
            "/api/schedule/schedule",
            serde_json::json!({"type": "now", "userId": "u1", "message": "hallo daar"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "sent");
    assert_eq!(body["userId"], "u1");

    // The synchronous entries are present immediately.
    let logs = state.scheduler.get_logs(Some("u1"));
    assert!(logs.iter().any(|l| l.contains("Manual execution triggered for user u1")));
    assert!(logs.iter().any(|l| l.contains("Manual execution completed")));

    // Delivery happens in the background; wait for its audit entry.
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        let logs = state.scheduler.get_logs(Some("u1"));
        if logs.iter().any(|l| l.contains("Message sent successfully to user u1")) {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "delivery never landed in the audit log: {:?}",
            logs
        );
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_concurrent_run_now_attributes_entries_per_user() {
    let base = spawn_mock_backend(true).await;
    let (_app, state) = common::create_test_app_with_config(backend_config(&base));

    let s1 = std::sync::Arc::clone(&state.scheduler);
    let s2 = std::sync::Arc::clone(&state.scheduler);
    let (a, b) = tokio::join!(
        tokio::spawn(async move { s1.run_now("u1", "bericht voor u1") }),
        tokio::spawn(async move { s2.run_now("u2", "bericht voor u2") }),
    );
    a.unwrap().unwrap();
    b.unwrap().unwrap();

    // Wait for both background deliveries to land in the log.
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        let delivered = ["u1", "u2"].into_iter().all(|user| {
            state.audit.query(Some(user)).iter().any(|e| {
                e.text
                    .contains(&format!("Message sent successfully to user {}", user))
            })
        });
        if delivered {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "deliveries never landed in the audit log"
        );
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    // Exactly one trigger and one outcome per user, each attributed to
    // that user and naming no other.
    for user in ["u1", "u2"] {
        let entries = state.audit.query(Some(user));
        assert!(entries.iter().all(|e| e.user_id.as_deref() == Some(user)));

        let triggered = entries
            .iter()
            .filter(|e| e.text.contains("Manual execution triggered"))
            .count();
        assert_eq!(triggered, 1, "user {}: {:?}", user, entries);

        let sent = entries
            .iter()
            .filter(|e| e.text.contains("Message sent successfully"))
            .count();
        assert_eq!(sent, 1, "user {}: {:?}", user, entries);

        assert!(entries
            .iter()
            .all(|e| !e.text.contains("Failed to send")));
        assert!(entries
            .iter()
            .any(|e| e.text.contains(&format!("triggered for user {}", user))));
    }
}

#[tokio::test]
async fn test_run_now_failure_is_audited_not_fatal() {
    let base = spawn_mock_backend(false).await;
    let (app, state) = common::create_test_app_with_config(backend_config(&base));

    let response = app
        .oneshot(json_post(
            "/api/schedule/schedule",
            serde_json::json!({"type": "now", "userId": "u9", "message": "hallo"}),
        ))
        .await
        .unwrap();

    // The request itself succeeds; the failure surfaces in the audit log.
    assert_eq!(response.status(), StatusCode::OK);

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        let logs = state.scheduler.get_logs(Some("u9"));
        if logs.iter().any(|l| l.contains("Failed to send message to user u9")) {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "failure never landed in the audit log: {:?}",
            logs
        );
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}
