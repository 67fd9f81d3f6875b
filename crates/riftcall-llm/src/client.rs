// OpenAI-compatible chat completions client using reqwest-eventsource.
//
// Sends the recommendation prompt with `stream: true`, accumulates the
// streamed `choices[0].delta.content` fragments, and returns the full text.
// Every failure becomes a `RecommendError` so the controller can report it
// and retry on the next poll.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde::Deserialize;
use tracing::{debug, warn};

use riftcall_core::champions::ChampionDirectory;
use riftcall_core::config::{Config, ConfigError};
use riftcall_core::normalize::NormalizedView;
use riftcall_core::ports::{RecommendError, Recommender};

use crate::prompt::{build_recommendation_prompt, system_prompt};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Sentinel payload that ends an OpenAI stream.
const DONE_MARKER: &str = "[DONE]";

// ---------------------------------------------------------------------------
// OpenAiClient
// ---------------------------------------------------------------------------

/// Streaming chat completions client.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    directory: Arc<ChampionDirectory>,
}

impl OpenAiClient {
    pub fn new(
        api_url: String,
        api_key: String,
        model: String,
        max_tokens: u32,
        directory: Arc<ChampionDirectory>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            model,
            max_tokens,
            directory,
        }
    }

    /// Build a client from the application config. Fails when no usable API
    /// key is configured.
    pub fn from_config(
        config: &Config,
        directory: Arc<ChampionDirectory>,
    ) -> Result<Self, ConfigError> {
        let key = config.api_key()?.to_string();
        Ok(Self::new(
            config.llm.api_url.clone(),
            key,
            config.llm.model.clone(),
            config.llm.max_tokens,
            directory,
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one system + user exchange and return the complete reply.
    pub async fn complete(&self, system: &str, user_content: &str) -> Result<String, RecommendError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "stream": true,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user_content }
            ]
        });

        let request = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body);

        let mut es = request
            .eventsource()
            .map_err(|e| RecommendError::Network(format!("failed to create event source: {e}")))?;

        let mut acc = StreamAccumulator::default();

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("SSE connection opened");
                }
                Ok(Event::Message(msg)) => match acc.push(&msg.data) {
                    Ok(true) => {
                        debug!("[DONE] received, streaming complete");
                        es.close();
                        return acc.finish();
                    }
                    Ok(false) => {}
                    Err(e) => {
                        es.close();
                        return Err(e);
                    }
                },
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    debug!("stream closed by server");
                    break;
                }
                Err(err) => {
                    warn!(?err, "SSE stream error");
                    es.close();
                    return Err(map_stream_error(err).await);
                }
            }
        }

        es.close();
        acc.finish()
    }
}

#[async_trait]
impl Recommender for OpenAiClient {
    async fn recommend(&self, view: &NormalizedView) -> Result<String, RecommendError> {
        let user = build_recommendation_prompt(view, &self.directory);
        debug!(model = %self.model, prompt_len = user.len(), "requesting recommendation");
        self.complete(&system_prompt(), &user).await
    }
}

// ---------------------------------------------------------------------------
// Stream accumulation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

/// Collects the text of one streamed completion.
#[derive(Debug, Default)]
pub(crate) struct StreamAccumulator {
    text: String,
    finish_reason: Option<String>,
}

impl StreamAccumulator {
    /// Feed one SSE `data` payload. Returns `Ok(true)` once the end marker
    /// has been seen.
    pub(crate) fn push(&mut self, data: &str) -> Result<bool, RecommendError> {
        let data = data.trim();
        if data == DONE_MARKER {
            return Ok(true);
        }
        if data.is_empty() {
            return Ok(false);
        }

        let payload: ChunkPayload = serde_json::from_str(data)
            .map_err(|e| RecommendError::Malformed(format!("bad stream chunk: {e}")))?;

        if let Some(error) = payload.error {
            return Err(RecommendError::Malformed(
                error
                    .message
                    .unwrap_or_else(|| "error event without message".to_string()),
            ));
        }

        // Only the first choice is used; `n` is never set above 1.
        if let Some(choice) = payload.choices.into_iter().next() {
            if let Some(content) = choice.delta.and_then(|d| d.content) {
                self.text.push_str(&content);
            }
            if choice.finish_reason.is_some() {
                self.finish_reason = choice.finish_reason;
            }
        }
        Ok(false)
    }

    pub(crate) fn finish(self) -> Result<String, RecommendError> {
        if self.text.trim().is_empty() {
            return Err(RecommendError::EmptyResponse {
                finish_reason: self.finish_reason.unwrap_or_else(|| "unknown".to_string()),
            });
        }
        Ok(self.text)
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// The `error.message` of an OpenAI error body, or the raw body when it has
/// another shape.
pub(crate) fn parse_error_body(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ApiErrorBody {
                message: Some(message),
            },
        }) => message,
        _ => body.trim().to_string(),
    }
}

async fn map_stream_error(err: reqwest_eventsource::Error) -> RecommendError {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, response) => {
            let body = response.text().await.unwrap_or_default();
            RecommendError::Status {
                status: status.as_u16(),
                message: parse_error_body(&body),
            }
        }
        reqwest_eventsource::Error::Transport(e) => RecommendError::Network(e.to_string()),
        reqwest_eventsource::Error::InvalidContentType(header, response) => {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            RecommendError::Status {
                status,
                message: format!(
                    "unexpected content type {:?}: {}",
                    header,
                    parse_error_body(&body)
                ),
            }
        }
        other => RecommendError::Malformed(format!("stream error: {other}")),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
