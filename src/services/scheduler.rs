// SPDX-License-Identifier: MIT

//! Per-user job scheduler: immediate and recurring message delivery.
//!
//! Each registered job owns one spawned tokio task that sleeps until its
//! next HH:mm occurrence, fires (dispatch + audit), and either re-arms
//! (daily) or finishes (dated one-off). Jobs are independent units of
//! concurrency: a job's network I/O suspending never delays another job's
//! trigger. The only shared mutable state is the audit log.
//!
//! Jobs live in a registry keyed by job ID so a future cancellation or
//! listing API is structurally possible; each handle is individually
//! stoppable. Jobs are not persisted: process exit drops all timers.

use crate::error::AppError;
use crate::services::audit::{category, AuditLog};
use crate::services::notify::NotificationDispatcher;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Maximum characters of the message echoed into the audit log.
const MESSAGE_PREVIEW_CHARS: usize = 50;

/// When a scheduled job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Fires exactly once, on the given calendar date.
    OnceAt(NaiveDate),
    /// Recurs every day at the job's time, indefinitely.
    Daily,
}

/// A registered delivery job. The message is frozen at scheduling time and
/// never regenerated at fire time.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub user_id: String,
    pub message: String,
    pub kind: JobKind,
    pub hour: u32,
    pub minute: u32,
}

impl ScheduledJob {
    fn date(&self) -> Option<NaiveDate> {
        match self.kind {
            JobKind::OnceAt(date) => Some(date),
            JobKind::Daily => None,
        }
    }
}

/// Registry entry: the job description plus an individually stoppable
/// handle to its timer task.
pub struct JobHandle {
    pub job: ScheduledJob,
    abort: tokio::task::AbortHandle,
}

impl JobHandle {
    /// Stop this job's timer. No caller-facing cancellation API exposes
    /// this yet; the handle exists so one can.
    pub fn stop(&self) {
        self.abort.abort();
    }
}

/// Accepts "run now" and "run at time T" requests, each bound to one user
/// and one pre-generated message, and executes them through the
/// notification dispatcher.
#[derive(Clone)]
pub struct JobScheduler {
    dispatcher: NotificationDispatcher,
    audit: AuditLog,
    jobs: Arc<DashMap<Uuid, JobHandle>>,
}

impl JobScheduler {
    pub fn new(dispatcher: NotificationDispatcher, audit: AuditLog) -> Self {
        Self {
            dispatcher,
            audit,
            jobs: Arc::new(DashMap::new()),
        }
    }

    /// Immediately dispatch a pre-generated message to a user.
    ///
    /// The network call is fire-and-forget from the caller's perspective;
    /// its outcome lands in the audit log. Validation failures abort
    /// synchronously and append nothing.
    pub fn run_now(&self, user_id: &str, message: &str) -> Result<(), AppError> {
        validate_target(user_id, message)?;

        self.audit.append(
            &format!("Manual execution triggered for user {}", user_id),
            Some(user_id),
            category::EXECUTION,
        );
        let preview: String = message.chars().take(MESSAGE_PREVIEW_CHARS).collect();
        self.audit.append(
            &format!("Using pre-generated message: {}...", preview),
            Some(user_id),
            category::EXECUTION,
        );

        let dispatcher = self.dispatcher.clone();
        let audit = self.audit.clone();
        let user = user_id.to_string();
        let msg = message.to_string();
        tokio::spawn(async move {
            match dispatcher.send(&user, &msg).await {
                Ok(_) => audit.append(
                    &format!("Message sent successfully to user {}", user),
                    Some(&user),
                    category::DELIVERY,
                ),
                Err(e) => audit.append(
                    &format!("Failed to send message to user {}: {}", user, e.body),
                    Some(&user),
                    category::DELIVERY_FAILED,
                ),
            }
        });

        self.audit.append(
            "Manual execution completed",
            Some(user_id),
            category::EXECUTION,
        );
        Ok(())
    }

    /// Register a job at `HH:mm`, either daily (no date) or once on the
    /// given `YYYY-MM-DD` date. Multiple jobs for the same user and time
    /// coexist independently; there is no deduplication.
    pub fn schedule_at(
        &self,
        time: &str,
        date: Option<&str>,
        user_id: &str,
        message: &str,
    ) -> Result<Uuid, AppError> {
        let (hour, minute) = parse_time(time)?;
        validate_target(user_id, message)?;

        let kind = match date {
            Some(raw) => {
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    AppError::Validation("Invalid date format - expected YYYY-MM-DD".to_string())
                })?;
                JobKind::OnceAt(date)
            }
            None => JobKind::Daily,
        };

        let job = ScheduledJob {
            user_id: user_id.to_string(),
            message: message.to_string(),
            kind,
            hour,
            minute,
        };

        // A dated occurrence already in the past has nothing left to fire;
        // accepting it would register a job that can never run.
        if next_fire_delay(Local::now().naive_local(), hour, minute, job.date()).is_none() {
            return Err(AppError::Validation(
                "Scheduled time is in the past".to_string(),
            ));
        }

        match job.kind {
            JobKind::OnceAt(d) => self.audit.append(
                &format!("Message scheduled for user {} on {} at {}", user_id, d, time),
                Some(user_id),
                category::SCHEDULE,
            ),
            JobKind::Daily => self.audit.append(
                &format!("Daily message scheduled for user {} at {}", user_id, time),
                Some(user_id),
                category::SCHEDULE,
            ),
        }

        let job_id = Uuid::new_v4();

        // The task starts only after the registry entry exists, so its
        // completion cleanup always finds the entry to remove.
        let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
        let task = tokio::spawn({
            let job = job.clone();
            let dispatcher = self.dispatcher.clone();
            let audit = self.audit.clone();
            let jobs = Arc::clone(&self.jobs);
            async move {
                let _ = ready_rx.await;
                run_job(job, dispatcher, audit, jobs, job_id).await;
            }
        });

        self.jobs.insert(
            job_id,
            JobHandle {
                job,
                abort: task.abort_handle(),
            },
        );
        let _ = ready_tx.send(());

        tracing::info!(%job_id, user_id, time, date, "Job registered");
        Ok(job_id)
    }

    /// Recent audit log lines, optionally filtered to one user.
    pub fn get_logs(&self, user_id: Option<&str>) -> Vec<String> {
        self.audit.messages(user_id)
    }

    /// Number of currently registered (not yet finished) jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}

/// Timer loop for one registered job.
async fn run_job(
    job: ScheduledJob,
    dispatcher: NotificationDispatcher,
    audit: AuditLog,
    jobs: Arc<DashMap<Uuid, JobHandle>>,
    job_id: Uuid,
) {
    loop {
        let now = Local::now().naive_local();
        let Some(delay) = next_fire_delay(now, job.hour, job.minute, job.date()) else {
            // Dated job whose moment has passed: nothing left to fire.
            break;
        };
        tokio::time::sleep(delay).await;

        let when = match job.kind {
            JobKind::OnceAt(date) => date.to_string(),
            JobKind::Daily => "daily".to_string(),
        };
        audit.append(
            &format!(
                "Scheduled message starting for user {} ({}) {:02}:{:02}",
                job.user_id, when, job.hour, job.minute
            ),
            Some(&job.user_id),
            category::EXECUTION,
        );

        // Failures are logged, never retried, and never cancel a daily
        // job's future recurrences.
        match dispatcher.send(&job.user_id, &job.message).await {
            Ok(_) => audit.append(
                &format!("Scheduled message sent successfully to user {}", job.user_id),
                Some(&job.user_id),
                category::DELIVERY,
            ),
            Err(e) => audit.append(
                &format!(
                    "Failed to send scheduled message to user {}: {}",
                    job.user_id, e.body
                ),
                Some(&job.user_id),
                category::DELIVERY_FAILED,
            ),
        }

        audit.append(
            "Scheduled job completed",
            Some(&job.user_id),
            category::EXECUTION,
        );

        if matches!(job.kind, JobKind::OnceAt(_)) {
            break;
        }
    }

    jobs.remove(&job_id);
}

/// Validate the (user, message) pair. The one synchronous failure mode.
fn validate_target(user_id: &str, message: &str) -> Result<(), AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::Validation("userId is required".to_string()));
    }
    if message.trim().is_empty() {
        return Err(AppError::Validation("message is required".to_string()));
    }
    Ok(())
}

/// Parse `HH:mm`; both parts required.
fn parse_time(time: &str) -> Result<(u32, u32), AppError> {
    let invalid = || AppError::Validation("Invalid time format - expected HH:mm".to_string());

    let (h, m) = time.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

/// Time until the job's next occurrence, in local time.
///
/// Returns `None` when a dated job's occurrence is already in the past;
/// daily jobs always have a next occurrence (today if still ahead,
/// otherwise tomorrow).
fn next_fire_delay(
    now: NaiveDateTime,
    hour: u32,
    minute: u32,
    date: Option<NaiveDate>,
) -> Option<std::time::Duration> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let target = match date {
        Some(date) => {
            let target = date.and_time(time);
            if target <= now {
                return None;
            }
            target
        }
        None => {
            let today = now.date().and_time(time);
            if today > now {
                today
            } else {
                today + chrono::Duration::days(1)
            }
        }
    };
    (target - now).to_std().ok()
}
