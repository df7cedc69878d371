// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod aggregate;
pub mod audit;
pub mod fitrockr;
pub mod identity;
pub mod message;
pub mod notify;
pub mod pipeline;
pub mod scheduler;

pub use aggregate::{HealthAggregator, SummaryOutcome};
pub use audit::{AuditEntry, AuditLog};
pub use fitrockr::FitrockrClient;
pub use identity::{IdentityResolver, Resolution};
pub use message::MessageSynthesizer;
pub use notify::{DispatchError, DispatchErrorKind, NotificationDispatcher};
pub use pipeline::{CoachPipeline, GeneratedMessage, SweepReport};
pub use scheduler::JobScheduler;
