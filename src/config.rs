//! Application configuration loaded from environment variables.
//!
//! All collaborator endpoints and credentials are read once at startup and
//! cached in memory.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Health provider (Fitrockr) ---
    /// Fitrockr API base URL
    pub fitrockr_base_url: String,
    /// Fitrockr tenant name (X-Tenant header)
    pub fitrockr_tenant: String,
    /// Fitrockr API key (X-API-Key header)
    pub fitrockr_api_key: String,

    // --- Text generation ---
    /// OpenAI-compatible API base URL
    pub openai_base_url: String,
    /// OpenAI API key
    pub openai_api_key: String,

    // --- Notification backend ---
    /// Authentication endpoint (returns a short-lived bearer token)
    pub notify_auth_url: String,
    /// Credentials for the authentication endpoint
    pub notify_auth_email: String,
    pub notify_auth_password: String,
    /// Delivery endpoint
    pub notify_url: String,

    // --- Misc ---
    /// GCP project ID for the identity store
    pub gcp_project_id: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Run a full sweep at startup and register the daily midnight sweep
    pub start_automation: bool,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            fitrockr_base_url: "https://api-02.fitrockr.com/v1".to_string(),
            fitrockr_tenant: "test-tenant".to_string(),
            fitrockr_api_key: "test_api_key".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_api_key: "test_openai_key".to_string(),
            notify_auth_url: "http://localhost:9/auth/login".to_string(),
            notify_auth_email: "test@example.com".to_string(),
            notify_auth_password: "test_password".to_string(),
            notify_url: "http://localhost:9/notify".to_string(),
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 3000,
            start_automation: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            fitrockr_base_url: env::var("FITROCKR_BASE_URL")
                .unwrap_or_else(|_| "https://api-02.fitrockr.com/v1".to_string()),
            fitrockr_tenant: env::var("FITROCKR_TENANT")
                .map_err(|_| ConfigError::Missing("FITROCKR_TENANT"))?,
            fitrockr_api_key: env::var("FITROCKR_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FITROCKR_API_KEY"))?,

            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("OPENAI_API_KEY"))?,

            notify_auth_url: env::var("NOTIFY_AUTH_URL")
                .map_err(|_| ConfigError::Missing("NOTIFY_AUTH_URL"))?,
            notify_auth_email: env::var("NOTIFY_AUTH_EMAIL")
                .map_err(|_| ConfigError::Missing("NOTIFY_AUTH_EMAIL"))?,
            notify_auth_password: env::var("NOTIFY_AUTH_PASSWORD")
                .map_err(|_| ConfigError::Missing("NOTIFY_AUTH_PASSWORD"))?,
            notify_url: env::var("INTERNAL_API_URL")
                .map_err(|_| ConfigError::Missing("INTERNAL_API_URL"))?,

            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            start_automation: env::var("START_AUTOMATION")
                .map(|v| v == "true")
                .unwrap_or(false),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
