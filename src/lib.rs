// SPDX-License-Identifier: MIT

//! Pulsecoach: daily health coaching from wearable data
//!
//! This crate provides the backend API for aggregating Fitrockr health
//! summaries, generating coaching messages, and delivering them to users
//! on demand or on a schedule.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::UserStore;
use services::{AuditLog, CoachPipeline, FitrockrClient, JobScheduler};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: UserStore,
    pub fitrockr: FitrockrClient,
    pub scheduler: Arc<JobScheduler>,
    pub pipeline: Arc<CoachPipeline>,
    pub audit: AuditLog,
}
