// SPDX-License-Identifier: MIT

//! Health aggregation: reduce a fetched time series to the single most
//! recent entry in a date window.
//!
//! Two distinguished non-error outcomes: `NoData` (nothing in the window)
//! and `NoSignal` (an entry exists but every metric is zero). Callers skip
//! downstream generation and delivery for both, but log them distinctly.

use crate::error::AppError;
use crate::models::AggregatedMetrics;
use crate::services::fitrockr::{FitrockrClient, RawDailySummary};
use crate::time_utils::DateWindow;

/// Outcome of aggregating a user's daily summaries over a window.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    /// The most recent in-window entry.
    Latest(AggregatedMetrics),
    /// No dated entries fell within the window.
    NoData,
    /// The latest entry exists but every metric is zero.
    NoSignal,
}

/// Fetches and aggregates health data from the provider.
#[derive(Clone)]
pub struct HealthAggregator {
    client: FitrockrClient,
}

impl HealthAggregator {
    pub fn new(client: FitrockrClient) -> Self {
        Self { client }
    }

    /// Fetch the user's summaries for the window and reduce to the latest
    /// entry. One provider call; idempotent for an unchanged dataset.
    pub async fn fetch_latest(
        &self,
        provider_id: &str,
        window: &DateWindow,
    ) -> Result<SummaryOutcome, AppError> {
        let entries = self.client.daily_summaries(provider_id, window).await?;
        Ok(latest_in_window(entries, window))
    }
}

/// Reduce raw entries to the single most recent one inside the window.
///
/// Entries without a date are dropped, then entries outside
/// `[window.start, window.end]`. Ties are impossible: the provider reports
/// at most one entry per date.
pub fn latest_in_window(entries: Vec<RawDailySummary>, window: &DateWindow) -> SummaryOutcome {
    let latest = entries
        .into_iter()
        .filter_map(|e| e.date.map(|d| (d, e)))
        .filter(|(date, _)| window.contains(*date))
        .max_by_key(|(date, _)| *date);

    let Some((date, entry)) = latest else {
        return SummaryOutcome::NoData;
    };

    let metrics = AggregatedMetrics {
        date,
        steps: entry.steps,
        calories: entry.calories,
        distance_meters: entry.distance,
        active_minutes: entry.activity_minutes,
        sleep_hours: entry.sleep_duration / 3600.0,
        heart_rate: entry.average_heart_rate,
    };

    if metrics.is_all_zero() {
        SummaryOutcome::NoSignal
    } else {
        SummaryOutcome::Latest(metrics)
    }
}
