// SPDX-License-Identifier: MIT

//! Health metric models: provider calendar dates, aggregated daily metrics,
//! and the stored per-day snapshot.

use serde::{Deserialize, Serialize};

/// A calendar date as reported by the health provider.
///
/// Deliberately not a timestamp: the provider reports per-day summaries with
/// no time-zone component, and comparing parsed timestamps would introduce
/// drift. Field order gives lexicographic (year, month, day) ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl CalendarDate {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Convert from a chrono date (used when building windows from "now").
    pub fn from_naive(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year() as u16,
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// The single most recent day's metrics for a user, derived from the
/// provider's daily summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMetrics {
    pub date: CalendarDate,
    pub steps: u64,
    pub calories: u64,
    pub distance_meters: f64,
    pub active_minutes: u64,
    pub sleep_hours: f64,
    pub heart_rate: u64,
}

impl AggregatedMetrics {
    /// True when every metric is zero — a distinguished "no signal" outcome
    /// (device not worn / not synced), not an error.
    pub fn is_all_zero(&self) -> bool {
        self.steps == 0
            && self.calories == 0
            && self.distance_meters == 0.0
            && self.active_minutes == 0
            && self.sleep_hours == 0.0
            && self.heart_rate == 0
    }

    /// Human-readable rendering used by the message-generation API response.
    pub fn human_readable(&self) -> HumanReadableMetrics {
        HumanReadableMetrics {
            steps: format!("{} steps", self.steps),
            calories: format!("{} calories burned", self.calories),
            distance: format!("{:.2} km", self.distance_meters / 1000.0),
            active_minutes: format!("{} active minutes", self.active_minutes),
            sleep_hours: format!("{:.1} hours of sleep", self.sleep_hours),
            heart_rate: format!("{} bpm average heart rate", self.heart_rate),
            date: self.date.to_string(),
        }
    }
}

/// Metrics formatted for display in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct HumanReadableMetrics {
    pub steps: String,
    pub calories: String,
    pub distance: String,
    pub active_minutes: String,
    pub sleep_hours: String,
    pub heart_rate: String,
    pub date: String,
}

/// Per-day health snapshot stored in the database after a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Caller-facing user reference the sweep ran for
    pub user_id: String,
    /// Summary date (YYYY-MM-DD)
    pub date: String,
    pub steps: u64,
    pub calories: u64,
    pub distance_meters: f64,
    pub active_minutes: u64,
    pub sleep_hours: f64,
    pub heart_rate: u64,
    /// When this snapshot was recorded (ISO 8601)
    pub recorded_at: String,
}
