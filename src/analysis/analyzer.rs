//! Core `ErrorAnalyzer` trait and the Gemini-backed implementation.
//!
//! `GeminiAnalyzer` calls the `generateContent` endpoint of the Gemini API.
//! All connection details come from [`LlmConfig`]; the client and credential
//! are fixed at construction so callers (and tests) choose what to inject.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::analysis::parse::parse_analysis;
use crate::analysis::prompt::PromptBuilder;
use crate::analysis::types::{AnalysisRequest, AnalysisResult};
use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// AnalysisError
// ---------------------------------------------------------------------------

/// Errors that can occur while asking the model for an analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No API key configured.
    #[error("Gemini API key not configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    /// HTTP transport or connection error.
    #[error("Failed to analyze the error: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("Failed to analyze the error: the request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The reply could not be parsed as the expected JSON.
    #[error("Failed to analyze the error: could not parse the model reply ({0})")]
    Parse(String),

    /// The reply carried no text at all.
    #[error("Failed to analyze the error: the model returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnalysisError::Timeout
        } else {
            AnalysisError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorAnalyzer trait
// ---------------------------------------------------------------------------

/// Async trait for turning an [`AnalysisRequest`] into an [`AnalysisResult`].
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn ErrorAnalyzer>`).
#[async_trait]
pub trait ErrorAnalyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError>;
}

// ---------------------------------------------------------------------------
// GeminiAnalyzer
// ---------------------------------------------------------------------------

/// Calls `POST {base_url}/v1beta/models/{model}:generateContent`.
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    config: LlmConfig,
    prompt_builder: PromptBuilder,
}

impl GeminiAnalyzer {
    /// Build a `GeminiAnalyzer` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is used if the builder fails.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            prompt_builder: PromptBuilder::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn api_key(&self) -> Result<&str, AnalysisError> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AnalysisError::MissingApiKey)
    }
}

/// Request body for a single-turn text generation.
pub(crate) fn request_body(prompt: &str, temperature: f32) -> Value {
    serde_json::json!({
        "contents": [
            { "role": "user", "parts": [ { "text": prompt } ] }
        ],
        "generationConfig": { "temperature": temperature }
    })
}

/// Concatenated text parts of the first candidate.
pub(crate) fn candidate_text(json: &Value) -> Option<String> {
    let parts = json["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

/// Human-readable message for a non-success response body.
pub(crate) fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string));

    match from_json {
        Some(message) if !message.trim().is_empty() => message,
        _ if !body.trim().is_empty() => format!("{} - {}", status.as_u16(), body.trim()),
        _ => format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("error")
        ),
    }
}

#[async_trait]
impl ErrorAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let key = self.api_key()?;
        let prompt = self.prompt_builder.build(request);

        log::debug!(
            "analysis: calling {} (prompt {} bytes, level {:?})",
            self.config.model,
            prompt.len(),
            request.expertise
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", key)
            .json(&request_body(&prompt, self.config.temperature))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = api_error_message(status, &body);
            log::warn!("analysis: service returned {status}: {message}");
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::Parse(e.to_string()))?;

        let text = candidate_text(&json).ok_or(AnalysisError::EmptyResponse)?;

        parse_analysis(&text).inspect_err(|e| {
            log::warn!("analysis: unusable model reply ({e}): {text}");
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
