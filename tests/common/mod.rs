// SPDX-License-Identifier: MIT

use pulsecoach::config::Config;
use pulsecoach::db::UserStore;
use pulsecoach::routes::create_router;
use pulsecoach::services::{
    AuditLog, CoachPipeline, FitrockrClient, IdentityResolver, JobScheduler, MessageSynthesizer,
    NotificationDispatcher,
};
use pulsecoach::AppState;
use std::sync::Arc;

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::default())
}

/// Create a test app against explicit endpoints (e.g. a local mock
/// notification backend).
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let store = UserStore::new_mock();
    let fitrockr = FitrockrClient::new(
        config.fitrockr_base_url.clone(),
        config.fitrockr_tenant.clone(),
        config.fitrockr_api_key.clone(),
    );
    let synthesizer = MessageSynthesizer::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
    );
    let dispatcher = NotificationDispatcher::from_config(&config);
    let resolver = IdentityResolver::new(store.clone());
    let audit = AuditLog::new();

    let scheduler = Arc::new(JobScheduler::new(dispatcher.clone(), audit.clone()));
    let pipeline = Arc::new(CoachPipeline::new(
        fitrockr.clone(),
        resolver,
        synthesizer,
        dispatcher,
        store.clone(),
        audit.clone(),
    ));

    let state = Arc::new(AppState {
        config,
        store,
        fitrockr,
        scheduler,
        pipeline,
        audit,
    });

    (create_router(state.clone()), state)
}
