// SPDX-License-Identifier: MIT

//! Fitrockr API client for fetching users and daily health summaries.
//!
//! Handles:
//! - Tenant/API-key header authentication
//! - User listing and single-user lookup
//! - Daily summary fetches over an inclusive date window
//! - Envelope tolerance: the summaries endpoint may return either a bare
//!   array or a `{content: [...]}` wrapper

use crate::error::AppError;
use crate::models::CalendarDate;
use crate::time_utils::DateWindow;
use serde::{Deserialize, Serialize};

/// Page size used when listing users. Matches the provider's maximum.
const USER_PAGE_SIZE: u32 = 100;

/// Fitrockr API client.
#[derive(Clone)]
pub struct FitrockrClient {
    http: reqwest::Client,
    base_url: String,
    tenant: String,
    api_key: String,
}

impl FitrockrClient {
    /// Create a new Fitrockr client.
    pub fn new(base_url: String, tenant: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            tenant,
            api_key,
        }
    }

    /// List all users known to the provider.
    pub async fn list_users(&self) -> Result<Vec<FitrockrUser>, AppError> {
        let url = format!("{}/users", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("page", "0"), ("size", &USER_PAGE_SIZE.to_string())])
            .header("X-Tenant", &self.tenant)
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::FitrockrApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Find a single user by provider ID.
    ///
    /// The provider has no direct by-ID endpoint for tenant API keys, so this
    /// lists and filters.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<FitrockrUser>, AppError> {
        let users = self.list_users().await?;
        Ok(users.into_iter().find(|u| u.id == user_id))
    }

    /// Fetch daily summaries for a user over an inclusive date window.
    pub async fn daily_summaries(
        &self,
        user_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<RawDailySummary>, AppError> {
        let url = format!("{}/users/{}/dailySummaries", self.base_url, user_id);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("startDate", window.start.to_string()),
                ("endDate", window.end.to_string()),
            ])
            .header("X-Tenant", &self.tenant)
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::FitrockrApi(e.to_string()))?;

        let body: SummariesResponse = self.check_response_json(response).await?;
        Ok(body.into_entries())
    }

    /// Check response status and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::FitrockrApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::FitrockrApi(format!("JSON parse error: {}", e)))
    }
}

/// User record from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitrockrUser {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl FitrockrUser {
    /// Display name for generated messages, if the provider shared one.
    pub fn display_name(&self) -> Option<String> {
        let name = match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => format!("{} {}", f, l),
            (Some(f), None) => f.clone(),
            (None, Some(l)) => l.clone(),
            (None, None) => return None,
        };
        let name = name.trim().to_string();
        (!name.is_empty()).then_some(name)
    }
}

/// A raw per-day summary entry from the provider.
///
/// Absent numeric fields default to zero; a missing optional field must
/// never crash the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDailySummary {
    pub date: Option<CalendarDate>,
    #[serde(default)]
    pub steps: u64,
    #[serde(default)]
    pub calories: u64,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub activity_minutes: u64,
    /// Sleep duration in seconds
    #[serde(default)]
    pub sleep_duration: f64,
    #[serde(default)]
    pub average_heart_rate: u64,
}

/// The summaries endpoint returns either a bare array or an envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SummariesResponse {
    Enveloped { content: Vec<RawDailySummary> },
    Bare(Vec<RawDailySummary>),
}

impl SummariesResponse {
    pub fn into_entries(self) -> Vec<RawDailySummary> {
        match self {
            SummariesResponse::Enveloped { content } => content,
            SummariesResponse::Bare(entries) => entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_and_enveloped_responses_parse_identically() {
        let bare = r#"[{"date":{"year":2025,"month":3,"day":1},"steps":1000}]"#;
        let enveloped =
            r#"{"content":[{"date":{"year":2025,"month":3,"day":1},"steps":1000}]}"#;

        let a: SummariesResponse = serde_json::from_str(bare).unwrap();
        let b: SummariesResponse = serde_json::from_str(enveloped).unwrap();

        let a = a.into_entries();
        let b = b.into_entries();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].steps, 1000);
        assert_eq!(b[0].steps, 1000);
        assert_eq!(a[0].date, b[0].date);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let json = r#"{"date":{"year":2025,"month":3,"day":1}}"#;
        let entry: RawDailySummary = serde_json::from_str(json).unwrap();
        assert_eq!(entry.steps, 0);
        assert_eq!(entry.calories, 0);
        assert_eq!(entry.distance, 0.0);
        assert_eq!(entry.sleep_duration, 0.0);
        assert_eq!(entry.average_heart_rate, 0);
    }

    #[test]
    fn test_entry_without_date_parses() {
        let json = r#"{"steps":500}"#;
        let entry: RawDailySummary = serde_json::from_str(json).unwrap();
        assert!(entry.date.is_none());
        assert_eq!(entry.steps, 500);
    }

    #[test]
    fn test_display_name_variants() {
        let full = FitrockrUser {
            id: "u1".into(),
            first_name: Some("Jan".into()),
            last_name: Some("de Vries".into()),
        };
        assert_eq!(full.display_name().as_deref(), Some("Jan de Vries"));

        let first_only = FitrockrUser {
            id: "u2".into(),
            first_name: Some("Jan".into()),
            last_name: None,
        };
        assert_eq!(first_only.display_name().as_deref(), Some("Jan"));

        let none = FitrockrUser {
            id: "u3".into(),
            first_name: None,
            last_name: None,
        };
        assert!(none.display_name().is_none());
    }
}
