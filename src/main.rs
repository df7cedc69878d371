// SPDX-License-Identifier: MIT

//! Pulsecoach API Server
//!
//! Aggregates wearable health data from Fitrockr, generates coaching
//! messages, and delivers them to users on demand or on a schedule.

use pulsecoach::{
    config::Config,
    db::UserStore,
    services::{
        AuditLog, CoachPipeline, FitrockrClient, IdentityResolver, JobScheduler,
        MessageSynthesizer, NotificationDispatcher,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Pulsecoach API");

    // Initialize the identity/snapshot store
    let store = UserStore::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

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

    if config.start_automation {
        start_automation(Arc::clone(&pipeline));
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        fitrockr,
        scheduler,
        pipeline,
        audit,
    });

    // Build router
    let app = pulsecoach::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Run a sweep now, then once per day at local midnight.
fn start_automation(pipeline: Arc<CoachPipeline>) {
    tokio::spawn(async move {
        tracing::info!("Startup automation enabled, running initial sweep");
        if let Err(e) = pipeline.sweep().await {
            tracing::error!(error = %e, "Startup sweep failed");
        }

        loop {
            tokio::time::sleep(delay_until_next_midnight()).await;
            if let Err(e) = pipeline.sweep().await {
                tracing::error!(error = %e, "Daily sweep failed");
            }
        }
    });
}

/// Time until the next local midnight.
fn delay_until_next_midnight() -> std::time::Duration {
    let now = chrono::Local::now().naive_local();
    let next = (now.date() + chrono::Duration::days(1)).and_hms_opt(0, 0, 0);
    match next {
        Some(next) => (next - now)
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(24 * 3600)),
        None => std::time::Duration::from_secs(24 * 3600),
    }
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pulsecoach=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
