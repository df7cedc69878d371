// SPDX-License-Identifier: MIT

//! Notification dispatcher: authenticate, then relay a message to the
//! user's delivery channel.
//!
//! Every failure this component surfaces carries a status and a body. A
//! transport-level error with no structured response is normalized to
//! `status 500` with the error text as body, so callers can inspect
//! failures uniformly.

use crate::config::Config;
use serde::Deserialize;

/// Which step of the dispatch state machine failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    /// Authentication against the delivery backend failed
    Auth,
    /// Delivery of the message itself failed
    Delivery,
}

/// Normalized dispatch failure: always a status and a body.
#[derive(Debug, Clone, thiserror::Error)]
#[error("dispatch failed (status {status}): {body}")]
pub struct DispatchError {
    pub kind: DispatchErrorKind,
    pub status: u16,
    pub body: String,
}

impl DispatchError {
    fn auth(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: DispatchErrorKind::Auth,
            status,
            body: body.into(),
        }
    }

    fn delivery(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: DispatchErrorKind::Delivery,
            status,
            body: body.into(),
        }
    }
}

/// Acknowledgement from the delivery backend.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub ack: serde_json::Value,
}

/// Dispatches messages through the notification backend.
///
/// Stateless beyond its configuration; a fresh bearer token is obtained for
/// every send.
#[derive(Clone)]
pub struct NotificationDispatcher {
    http: reqwest::Client,
    auth_url: String,
    auth_email: String,
    auth_password: String,
    notify_url: String,
}

impl NotificationDispatcher {
    pub fn new(
        auth_url: String,
        auth_email: String,
        auth_password: String,
        notify_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url,
            auth_email,
            auth_password,
            notify_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.notify_auth_url.clone(),
            config.notify_auth_email.clone(),
            config.notify_auth_password.clone(),
            config.notify_url.clone(),
        )
    }

    /// Send a message to a user's delivery channel.
    pub async fn send(
        &self,
        user_id: &str,
        message: &str,
    ) -> Result<DeliveryReceipt, DispatchError> {
        let token = self.authenticate().await?;
        self.deliver(&token, user_id, message).await
    }

    /// Obtain a short-lived bearer token from the auth endpoint.
    async fn authenticate(&self) -> Result<String, DispatchError> {
        let response = self
            .http
            .post(&self.auth_url)
            .json(&serde_json::json!({
                "email": self.auth_email,
                "password": self.auth_password,
            }))
            .send()
            .await
            .map_err(|e| DispatchError::auth(500, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::auth(status, body));
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::auth(500, format!("JSON parse error: {}", e)))?;

        match body.data.and_then(|d| d.token) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(DispatchError::auth(
                500,
                "Authentication succeeded but no token was returned",
            )),
        }
    }

    /// Relay the message with the bearer token.
    async fn deliver(
        &self,
        token: &str,
        user_id: &str,
        message: &str,
    ) -> Result<DeliveryReceipt, DispatchError> {
        let response = self
            .http
            .post(&self.notify_url)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "driver_id": user_id,
                "message": message,
            }))
            .send()
            .await
            .map_err(|e| DispatchError::delivery(500, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::delivery(status, body));
        }

        let ack = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);

        tracing::info!(user_id, "Notification delivered");
        Ok(DeliveryReceipt { ack })
    }
}

/// Auth endpoint response envelope.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    data: Option<AuthData>,
}

#[derive(Debug, Deserialize)]
struct AuthData {
    token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_without_token_field() {
        let body: AuthResponse = serde_json::from_str(r#"{"data":{}}"#).unwrap();
        assert!(body.data.unwrap().token.is_none());

        let body: AuthResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.data.is_none());
    }

    #[test]
    fn test_dispatch_error_carries_status_and_body() {
        let err = DispatchError::auth(500, "connection refused");
        assert_eq!(err.kind, DispatchErrorKind::Auth);
        assert_eq!(err.status, 500);
        assert_eq!(err.body, "connection refused");

        let err = DispatchError::delivery(404, "no such driver");
        assert_eq!(err.kind, DispatchErrorKind::Delivery);
        assert_eq!(err.status, 404);
    }
}
