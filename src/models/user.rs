//! User model for the local identity store.

use serde::{Deserialize, Serialize};

/// User record in the local store.
///
/// Users carry two disjoint keys: a legacy numeric `id` assigned by the
/// store, and the provider-native `user_id` (Fitrockr). Either may be the
/// value a caller supplies as a user reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    /// Legacy numeric ID (may be absent for provider-imported records)
    pub id: Option<i64>,
    /// Fitrockr user ID (the key the health provider understands)
    pub user_id: Option<String>,
    /// Display name used in generated messages
    pub display_name: Option<String>,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
}
