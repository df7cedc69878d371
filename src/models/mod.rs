// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod health;
pub mod user;

pub use health::{AggregatedMetrics, CalendarDate, HealthSnapshot, HumanReadableMetrics};
pub use user::StoredUser;
