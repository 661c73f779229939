//! Kid-friendly hints from the Gemini `generateContent` API.
//!
//! [`HintClient::get_hint`] never fails: every problem is logged and turned
//! into a fixed message the player can read.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::storage::HintConfig;

pub const MISSING_KEY_MESSAGE: &str = "Hint feature is unavailable: API Key is not configured.";
pub const DISABLED_MESSAGE: &str = "Hint feature is unavailable: hints are turned off.";
pub const FAILURE_MESSAGE: &str =
    "Oops! I couldn't think of a hint right now. Please try again in a moment.";

#[derive(Error, Debug)]
enum HintError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response has no hint text")]
    EmptyResponse,
}

pub struct HintClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    enabled: bool,
}

impl HintClient {
    /// Build a client, reading the API key from the configured variable.
    pub fn from_config(config: &HintConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(config, api_key)
    }

    pub fn new(config: &HintConfig, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "hint client builder failed; using defaults");
                Client::new()
            });
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            enabled: config.enabled,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }

    /// Ask for a hint on `question` in level `level_id`.
    pub async fn get_hint(&self, level_id: u32, question: &str) -> String {
        if !self.enabled {
            return DISABLED_MESSAGE.to_string();
        }
        let Some(api_key) = self.api_key.as_deref() else {
            return MISSING_KEY_MESSAGE.to_string();
        };

        match self.fetch(api_key, &build_prompt(level_id, question)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(level = level_id, error = %e, "hint request failed");
                FAILURE_MESSAGE.to_string()
            }
        }
    }

    async fn fetch(&self, api_key: &str, prompt: &str) -> Result<String, HintError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        );
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HintError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = resp.json().await?;
        value["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or(HintError::EmptyResponse)
    }
}

/// Prompt asking for a short nudge that does not give the answer away.
pub fn build_prompt(level_id: u32, question: &str) -> String {
    format!(
        "You are a helpful and friendly assistant for a kids coding game called CodePlay.\n\
         A child is playing Level {level_id} and is stuck on the following problem: \"{question}\".\n\
         Provide a simple, encouraging, and kid-friendly hint.\n\
         Do NOT give the direct answer. Guide them to think about the solution.\n\
         For example, if the question is \"What does a loop do?\", a good hint would be \
         \"Think about something you do every day, over and over again... like brushing your teeth!\".\n\
         Keep the hint to one or two short sentences."
    )
}
