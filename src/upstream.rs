use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::models::{GenerateContentRequest, GenerateContentResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Failures of a single generateContent call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("provider credential is not configured")]
    MissingCredential,

    #[error("upstream returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("upstream response has no candidate text")]
    Extraction,

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

// Gemini client - one single-turn call per admitted request
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        );

        Self {
            client,
            endpoint,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends `prompt` as the only content part and returns the first
    /// candidate's text.
    pub async fn forward(&self, prompt: &str) -> Result<String, GatewayError> {
        let Some(key) = self.api_key.as_deref() else {
            error!("Upstream credential missing, refusing to call provider");
            return Err(GatewayError::MissingCredential);
        };

        debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "Calling upstream");

        let res = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, key)
            .timeout(self.timeout)
            .json(&GenerateContentRequest::single_turn(prompt))
            .send()
            .await?;

        let status = res.status();
        let body = res.bytes().await?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status,
                message: upstream_error_message(&body),
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_slice(&body).map_err(|_| GatewayError::Extraction)?;

        parsed
            .first_text()
            .map(str::to_string)
            .ok_or(GatewayError::Extraction)
    }
}

// Provider's own `error.message`, or a generic fallback
fn upstream_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| "Unknown error".to_string())
}
