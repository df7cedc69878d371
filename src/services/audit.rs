// SPDX-License-Identifier: MIT

//! Bounded, queryable audit log.
//!
//! An append-only in-memory ring of timestamped, user-attributable entries.
//! `append` is the sole mutator; it trims FIFO so the ring never exceeds
//! [`MAX_ENTRIES`]. Queries return at most [`QUERY_LIMIT`] of the most
//! recent entries, oldest first.

use crate::time_utils::format_local;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Process-wide cap on retained entries (oldest evicted first).
pub const MAX_ENTRIES: usize = 500;

/// Maximum number of entries a single query returns.
pub const QUERY_LIMIT: usize = 200;

/// Entry categories used across the scheduler and pipeline.
pub mod category {
    pub const SCHEDULE: &str = "schedule";
    pub const EXECUTION: &str = "execution";
    pub const DELIVERY: &str = "delivery";
    pub const DELIVERY_FAILED: &str = "delivery_failed";
    pub const IDENTITY: &str = "identity";
    pub const SWEEP: &str = "sweep";
    pub const PIPELINE: &str = "pipeline";
}

/// A single immutable audit entry.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// Captured at append time, not at the time of the triggering event
    pub timestamp: DateTime<Utc>,
    /// Human-readable local-time line, e.g. `2025-03-01 09:30:00  |  [User:u1] ...`
    pub formatted: String,
    pub user_id: Option<String>,
    pub category: String,
    pub text: String,
}

/// The audit log ring. Cheap to clone; all clones share the same ring.
#[derive(Clone)]
pub struct AuditLog {
    entries: Arc<Mutex<VecDeque<AuditEntry>>>,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_ENTRIES))),
        }
    }

    /// Append an entry. Never fails; the trim and push are atomic under the
    /// ring's lock so concurrent appends cannot lose entries or corrupt
    /// ordering.
    pub fn append(&self, text: &str, user_id: Option<&str>, category: &str) {
        let now = Utc::now();
        let user_prefix = match user_id {
            Some(id) => format!("[User:{}] ", id),
            None => "[All] ".to_string(),
        };
        let formatted = format!("{}  |  {}{}", format_local(now), user_prefix, text);

        tracing::info!(user_id, category, "{}", text);

        // Append must never fail: recover the data from a poisoned lock.
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        entries.push_back(AuditEntry {
            timestamp: now,
            formatted,
            user_id: user_id.map(str::to_string),
            category: category.to_string(),
            text: text.to_string(),
        });

        while entries.len() > MAX_ENTRIES {
            entries.pop_front();
        }
    }

    /// Query up to the [`QUERY_LIMIT`] most recent entries, optionally
    /// filtered by user, ordered oldest to newest.
    pub fn query(&self, user_id: Option<&str>) -> Vec<AuditEntry> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let filtered: Vec<&AuditEntry> = entries
            .iter()
            .filter(|e| match user_id {
                Some(id) => e.user_id.as_deref() == Some(id),
                None => true,
            })
            .collect();

        let skip = filtered.len().saturating_sub(QUERY_LIMIT);
        filtered.into_iter().skip(skip).cloned().collect()
    }

    /// Formatted log lines for the query surface.
    pub fn messages(&self, user_id: Option<&str>) -> Vec<String> {
        self.query(user_id)
            .into_iter()
            .map(|e| e.formatted)
            .collect()
    }

    /// Current number of retained entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
