// SPDX-License-Identifier: MIT

//! Shared helpers for date/time handling and window construction.

use crate::models::CalendarDate;
use chrono::{DateTime, Local, SecondsFormat, Utc};

/// Inclusive calendar-date range over which health entries are considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: CalendarDate,
    pub end: CalendarDate,
}

impl DateWindow {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Self {
        Self { start, end }
    }

    /// The default sweep window: yesterday through today.
    pub fn yesterday_to_today() -> Self {
        Self::last_days(1)
    }

    /// Window ending today and starting `days` calendar days earlier.
    /// The manual single-user path uses a 7-day lookback.
    pub fn last_days(days: i64) -> Self {
        let today = Utc::now().date_naive();
        let start = today - chrono::Duration::days(days);
        Self {
            start: CalendarDate::from_naive(start),
            end: CalendarDate::from_naive(today),
        }
    }

    /// Whether `date` falls within the window (inclusive on both ends).
    pub fn contains(&self, date: CalendarDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a UTC timestamp in local time for human-readable log lines.
pub fn format_local(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
