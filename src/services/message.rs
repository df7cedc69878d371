// SPDX-License-Identifier: MIT

//! Message synthesis via an OpenAI-compatible chat completions API.
//!
//! Best-effort by contract: any failure (transport, non-2xx, malformed
//! response) falls back to a static default message. Message generation
//! never blocks the pipeline.

use crate::models::AggregatedMetrics;
use serde::Deserialize;

/// Fallback when the text generator is unavailable.
pub const DEFAULT_MESSAGE: &str = "Here's your daily health update!";

const MODEL: &str = "gpt-3.5-turbo";

/// Builds coaching prompts and invokes the text-generation API.
#[derive(Clone)]
pub struct MessageSynthesizer {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MessageSynthesizer {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Generate a coaching message for the given metrics.
    ///
    /// One request per call, nothing cached. On any failure the static
    /// default message is returned instead.
    pub async fn generate(
        &self,
        metrics: &AggregatedMetrics,
        display_name: Option<&str>,
    ) -> String {
        let prompt = build_prompt(metrics, display_name);

        match self.complete(&prompt).await {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Message generation failed, using default");
                DEFAULT_MESSAGE.to_string()
            }
        }
    }

    /// Single chat-completions request.
    async fn complete(&self, prompt: &str) -> Result<String, anyhow::Error> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": MODEL,
                "messages": [{"role": "user", "content": prompt}],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("HTTP {}: {}", status, body);
        }

        let body: ChatResponse = response.json().await?;
        let message = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if message.is_empty() {
            anyhow::bail!("empty completion");
        }
        Ok(message)
    }
}

/// Build the coaching prompt.
///
/// The target language is fixed (Dutch), the message must not open with a
/// greeting, and must not contain quotation marks or special characters.
fn build_prompt(metrics: &AggregatedMetrics, display_name: Option<&str>) -> String {
    let data = serde_json::to_string(metrics).unwrap_or_default();
    match display_name {
        Some(name) => format!(
            "Generate a personalized health coaching message for {name} based on this \
             health data:\n{data}. Do not start with a greeting but include the name \
             {name}, keep it motivational and concise, write it in Dutch, and do not \
             include any quotation marks or special characters."
        ),
        None => format!(
            "Based on this health data, generate a personalized coaching message in \
             Dutch. Do not include greeting words like hi or hello at the start; give \
             the coaching message directly, and do not include any quotation marks or \
             special characters:\n{data}"
        ),
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}
