// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (identity lookups by numeric ID or provider key)
//! - Health data (per-day snapshots recorded by the sweep)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{HealthSnapshot, StoredUser};

/// Firestore-backed local store for user identities and health snapshots.
#[derive(Clone)]
pub struct UserStore {
    client: Option<firestore::FirestoreDb>,
}

impl UserStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called. The identity
    /// resolver treats those errors as NotFound, so tests exercise the
    /// fallback path without a live store.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Look up a user by the store's numeric ID (the document ID).
    pub async fn lookup_by_numeric_id(&self, id: i64) -> Result<Option<StoredUser>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a user by their provider (Fitrockr) key.
    pub async fn lookup_by_provider_ref(
        &self,
        provider_id: &str,
    ) -> Result<Option<StoredUser>, AppError> {
        let provider_id = provider_id.to_string();
        let mut matches: Vec<StoredUser> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("user_id").eq(provider_id.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches.pop())
    }

    // ─── Health Snapshot Operations ──────────────────────────────

    /// Record a per-day health snapshot for a user.
    ///
    /// Keyed by `(user_id, date)` so re-running a sweep for the same window
    /// overwrites rather than duplicates.
    pub async fn store_health_snapshot(&self, snapshot: &HealthSnapshot) -> Result<(), AppError> {
        let doc_id = format!("{}_{}", snapshot.user_id, snapshot.date);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::HEALTH_DATA)
            .document_id(doc_id)
            .object(snapshot)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
