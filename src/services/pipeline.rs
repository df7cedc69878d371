// SPDX-License-Identifier: MIT

//! End-to-end coaching pipeline: resolve, aggregate, persist, synthesize,
//! dispatch.
//!
//! The sweep runs this pipeline over every provider user with bounded
//! concurrency. Failures are isolated per user: one user's bad data or
//! refused delivery never aborts the rest of the sweep. Every decision
//! point lands in the audit log.

use crate::db::UserStore;
use crate::error::AppError;
use crate::models::{HealthSnapshot, HumanReadableMetrics};
use crate::services::aggregate::{HealthAggregator, SummaryOutcome};
use crate::services::audit::{category, AuditLog};
use crate::services::fitrockr::FitrockrClient;
use crate::services::identity::{IdentityResolver, Resolution};
use crate::services::message::MessageSynthesizer;
use crate::services::notify::NotificationDispatcher;
use crate::time_utils::{format_utc_rfc3339, DateWindow};
use futures_util::StreamExt;
use serde::Serialize;

/// How many users a sweep processes at once.
const SWEEP_CONCURRENCY: usize = 4;

/// Lookback window for the manual single-user path.
const MANUAL_LOOKBACK_DAYS: i64 = 7;

/// Tally of one sweep run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub users: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Result of the manual generate path.
#[derive(Debug, Clone)]
pub enum GeneratedMessage {
    Generated {
        message: String,
        data: HumanReadableMetrics,
    },
    /// The provider knows the user but reported nothing usable in the window.
    NoData,
}

/// Per-user outcome inside a sweep.
enum UserOutcome {
    Sent,
    Skipped,
    Failed,
}

/// The full coaching pipeline, shared by the sweep and the manual paths.
#[derive(Clone)]
pub struct CoachPipeline {
    fitrockr: FitrockrClient,
    aggregator: HealthAggregator,
    resolver: IdentityResolver,
    synthesizer: MessageSynthesizer,
    dispatcher: NotificationDispatcher,
    store: UserStore,
    audit: AuditLog,
}

impl CoachPipeline {
    pub fn new(
        fitrockr: FitrockrClient,
        resolver: IdentityResolver,
        synthesizer: MessageSynthesizer,
        dispatcher: NotificationDispatcher,
        store: UserStore,
        audit: AuditLog,
    ) -> Self {
        let aggregator = HealthAggregator::new(fitrockr.clone());
        Self {
            fitrockr,
            aggregator,
            resolver,
            synthesizer,
            dispatcher,
            store,
            audit,
        }
    }

    /// The message synthesizer, for callers generating from metrics they
    /// already hold.
    pub fn synthesizer(&self) -> &MessageSynthesizer {
        &self.synthesizer
    }

    /// The notification dispatcher, for the direct-send surface.
    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Run the pipeline for every provider user over the default
    /// yesterday-to-today window.
    ///
    /// The only fatal error is failing to list users; everything after that
    /// is per-user and isolated.
    pub async fn sweep(&self) -> Result<SweepReport, AppError> {
        let users = self.fitrockr.list_users().await?;
        self.audit.append(
            &format!("Automation sweep started for {} users", users.len()),
            None,
            category::SWEEP,
        );

        let window = DateWindow::yesterday_to_today();
        let tasks: Vec<_> = users
            .iter()
            .map(|user| self.process_user(&user.id, &window))
            .collect();
        let outcomes: Vec<UserOutcome> = futures_util::stream::iter(tasks)
            .buffer_unordered(SWEEP_CONCURRENCY)
            .collect()
            .await;

        let mut report = SweepReport {
            users: outcomes.len(),
            ..Default::default()
        };
        for outcome in &outcomes {
            match outcome {
                UserOutcome::Sent => report.sent += 1,
                UserOutcome::Skipped => report.skipped += 1,
                UserOutcome::Failed => report.failed += 1,
            }
        }

        self.audit.append(
            &format!(
                "Automation sweep completed: {} sent, {} skipped, {} failed",
                report.sent, report.skipped, report.failed
            ),
            None,
            category::SWEEP,
        );
        Ok(report)
    }

    /// Run the full pipeline for one user over the manual lookback window.
    /// Used when a sweep is triggered for a single user.
    pub async fn sweep_user(&self, external_ref: &str) -> Result<SweepReport, AppError> {
        let window = DateWindow::last_days(MANUAL_LOOKBACK_DAYS);
        let outcome = self.process_user(external_ref, &window).await;
        let mut report = SweepReport {
            users: 1,
            ..Default::default()
        };
        match outcome {
            UserOutcome::Sent => report.sent = 1,
            UserOutcome::Skipped => report.skipped = 1,
            UserOutcome::Failed => report.failed = 1,
        }
        Ok(report)
    }

    /// Resolve, aggregate, persist, synthesize and dispatch for one user.
    /// Never propagates an error: every exit path is audited instead.
    async fn process_user(&self, external_ref: &str, window: &DateWindow) -> UserOutcome {
        let resolution = self.resolver.resolve(external_ref).await;
        match &resolution {
            Resolution::Resolved { provider_id, .. } => self.audit.append(
                &format!("Resolved user {} to provider ID {}", external_ref, provider_id),
                Some(external_ref),
                category::IDENTITY,
            ),
            Resolution::Fallback { .. } => self.audit.append(
                &format!("No identity record for user {}; using reference as-is", external_ref),
                Some(external_ref),
                category::IDENTITY,
            ),
        }

        let metrics = match self
            .aggregator
            .fetch_latest(resolution.provider_id(), window)
            .await
        {
            Ok(SummaryOutcome::Latest(metrics)) => metrics,
            Ok(SummaryOutcome::NoData) => {
                self.audit.append(
                    &format!("No health data for user {} in window", external_ref),
                    Some(external_ref),
                    category::PIPELINE,
                );
                return UserOutcome::Skipped;
            }
            Ok(SummaryOutcome::NoSignal) => {
                self.audit.append(
                    &format!("All metrics zero for user {}; nothing to report", external_ref),
                    Some(external_ref),
                    category::PIPELINE,
                );
                return UserOutcome::Skipped;
            }
            Err(e) => {
                self.audit.append(
                    &format!("Health data fetch failed for user {}: {}", external_ref, e),
                    Some(external_ref),
                    category::PIPELINE,
                );
                return UserOutcome::Failed;
            }
        };

        let snapshot = HealthSnapshot {
            user_id: external_ref.to_string(),
            date: metrics.date.to_string(),
            steps: metrics.steps,
            calories: metrics.calories,
            distance_meters: metrics.distance_meters,
            active_minutes: metrics.active_minutes,
            sleep_hours: metrics.sleep_hours,
            heart_rate: metrics.heart_rate,
            recorded_at: format_utc_rfc3339(chrono::Utc::now()),
        };
        if let Err(e) = self.store.store_health_snapshot(&snapshot).await {
            // A snapshot we cannot persist is a snapshot we do not act on.
            self.audit.append(
                &format!(
                    "Failed to store health snapshot for user {}: {}; notification skipped",
                    external_ref, e
                ),
                Some(external_ref),
                category::PIPELINE,
            );
            return UserOutcome::Failed;
        }

        let message = self
            .synthesizer
            .generate(&metrics, resolution.display_name())
            .await;

        match self.dispatcher.send(external_ref, &message).await {
            Ok(_) => {
                self.audit.append(
                    &format!("Message sent successfully to user {}", external_ref),
                    Some(external_ref),
                    category::DELIVERY,
                );
                UserOutcome::Sent
            }
            Err(e) => {
                self.audit.append(
                    &format!("Failed to send message to user {}: {}", external_ref, e.body),
                    Some(external_ref),
                    category::DELIVERY_FAILED,
                );
                UserOutcome::Failed
            }
        }
    }

    /// Generate (but do not dispatch) a message for one user, over the
    /// manual lookback window.
    pub async fn generate_for_user(
        &self,
        external_ref: &str,
    ) -> Result<GeneratedMessage, AppError> {
        let resolution = self.resolver.resolve(external_ref).await;
        let provider_id = resolution.provider_id().to_string();

        // Prefer the stored display name; otherwise ask the provider, which
        // doubles as an existence check for unresolved references.
        let display_name = match resolution.display_name() {
            Some(name) => Some(name.to_string()),
            None => {
                let user = self
                    .fitrockr
                    .get_user(&provider_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound("User not registered on Fitrockr".to_string())
                    })?;
                user.display_name()
            }
        };

        let window = DateWindow::last_days(MANUAL_LOOKBACK_DAYS);
        match self.aggregator.fetch_latest(&provider_id, &window).await? {
            SummaryOutcome::Latest(metrics) => {
                let message = self
                    .synthesizer
                    .generate(&metrics, display_name.as_deref())
                    .await;
                Ok(GeneratedMessage::Generated {
                    data: metrics.human_readable(),
                    message,
                })
            }
            SummaryOutcome::NoData | SummaryOutcome::NoSignal => Ok(GeneratedMessage::NoData),
        }
    }
}
