// SPDX-License-Identifier: MIT

//! Identity resolution across the local store and the provider namespace.
//!
//! A caller-supplied user reference may be the store's numeric ID or the
//! provider-native ID. Resolution tries the store first (numeric key, then
//! provider key) and degrades to the supplied reference on any miss or
//! store failure. Resolution is never fatal; the pipeline always has a
//! usable identifier.

use crate::db::UserStore;
use crate::models::StoredUser;

/// Outcome of identity resolution.
///
/// Tagged so callers can distinguish "resolution succeeded" from
/// "resolution degraded" for observability, instead of receiving a silently
/// substituted string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A store record supplied (or confirmed) the provider ID.
    Resolved {
        provider_id: String,
        display_name: Option<String>,
    },
    /// No usable store record; the caller-supplied reference is used as-is.
    Fallback { external_ref: String },
}

impl Resolution {
    /// The identifier to use when calling the provider. Never empty for a
    /// non-empty input reference.
    pub fn provider_id(&self) -> &str {
        match self {
            Resolution::Resolved { provider_id, .. } => provider_id,
            Resolution::Fallback { external_ref } => external_ref,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { display_name, .. } => display_name.as_deref(),
            Resolution::Fallback { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

/// Resolves caller-supplied user references to provider IDs.
#[derive(Clone)]
pub struct IdentityResolver {
    store: UserStore,
}

impl IdentityResolver {
    pub fn new(store: UserStore) -> Self {
        Self { store }
    }

    /// Resolve an external reference to a provider ID.
    ///
    /// One lookup attempt per key shape, no retries; the fallback path is
    /// the retry-equivalent. The result is cached nowhere: provider IDs are
    /// not assumed stable across calls.
    pub async fn resolve(&self, external_ref: &str) -> Resolution {
        // Numeric references are tried against the store's numeric key first.
        if let Ok(numeric_id) = external_ref.trim().parse::<i64>() {
            match self.store.lookup_by_numeric_id(numeric_id).await {
                Ok(Some(user)) => {
                    if let Some(resolution) = resolution_from_record(&user) {
                        return resolution;
                    }
                    // Record exists but carries no provider key; keep trying.
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(external_ref, error = %e, "Numeric ID lookup failed");
                }
            }
        }

        // Any reference may itself be a provider key the store knows about.
        match self.store.lookup_by_provider_ref(external_ref).await {
            Ok(Some(user)) => {
                if let Some(resolution) = resolution_from_record(&user) {
                    return resolution;
                }
            }
            Ok(None) => {
                tracing::debug!(external_ref, "No store record; using fallback identifier");
            }
            Err(e) => {
                tracing::warn!(external_ref, error = %e, "Provider-key lookup failed");
            }
        }

        Resolution::Fallback {
            external_ref: external_ref.to_string(),
        }
    }
}

/// Build a `Resolved` outcome from a store record, if it carries a
/// non-empty provider key.
fn resolution_from_record(user: &StoredUser) -> Option<Resolution> {
    let provider_id = user.user_id.as_deref()?.trim();
    if provider_id.is_empty() {
        return None;
    }
    Some(Resolution::Resolved {
        provider_id: provider_id.to_string(),
        display_name: user.display_name.clone(),
    })
}
