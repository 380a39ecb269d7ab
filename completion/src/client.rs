//! HTTP transport for an OpenAI-style chat-completions service.
//!
//! One logical `complete()` call makes up to [`MAX_ATTEMPTS`] round trips
//! with a fixed [`RETRY_DELAY`] between them. Anything that happens on the
//! wire (connect failure, timeout, non-2xx status, malformed body) is
//! retried; caller-side problems fail immediately. The per-call response
//! cap (`max_tokens`) is sent with every request, and truncation is the
//! service's to perform, not the client's to detect.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CompletionError;

/// Attempt budget for one logical completion call.
pub const MAX_ATTEMPTS: u32 = 12;

/// Fixed pause between attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default per-call response-size cap, in output tokens.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4000;

/// API credential supplied by the caller at call time.
///
/// Debug output is redacted. The key leaves this type only as the
/// Authorization header of an outbound request; it is never logged or
/// persisted.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(redacted)")
    }
}

/// One instruction+content pair to send to the completion service.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub instructions: &'a str,
    pub content: &'a str,
    pub credentials: &'a ApiKey,
    /// Sampling temperature. `None` leaves the service default in effect.
    pub temperature: Option<f32>,
}

/// The completion seam: one request in, raw response text out.
///
/// The HTTP client below is the production implementation; tests substitute
/// scripted fakes so stage logic can be exercised without a network.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError>;
}

/// Production client speaking the chat-completions wire format.
pub struct HttpCompletionClient {
    http: reqwest::Client,
    base_url: String,
    max_output_tokens: u32,
}

impl HttpCompletionClient {
    /// Build a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        max_output_tokens: u32,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Configuration(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_output_tokens,
        })
    }

    async fn send_once(&self, request: &CompletionRequest<'_>) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: request.model,
            messages: vec![
                ChatMessage { role: Role::System, content: request.instructions },
                ChatMessage { role: Role::User, content: request.content },
            ],
            max_tokens: self.max_output_tokens,
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(request.credentials.expose())
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::service)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CompletionError::Service(format!(
                "HTTP {status}: {}",
                truncate(&detail, 300)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::service(format!("malformed response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::service("response contained no choices"))
    }
}

#[async_trait]
impl Completion for HttpCompletionClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError> {
        if request.credentials.is_empty() {
            return Err(CompletionError::Configuration("API credential is empty".into()));
        }
        if request.model.trim().is_empty() {
            return Err(CompletionError::Configuration("model name is empty".into()));
        }

        let mut last_err = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.send_once(&request).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts = MAX_ATTEMPTS,
                        error = %err,
                        "Completion request failed"
                    );
                    last_err = Some(err);
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| CompletionError::service("attempt budget exhausted")))
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// Wire types for the chat-completions endpoint.

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}
