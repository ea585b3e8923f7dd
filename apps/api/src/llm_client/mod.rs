//! Streaming client for the Anthropic Messages API.
//!
//! Handlers only see the `TextGenerator` trait; `LlmClient` is the production
//! implementation and the only code that talks to the provider.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod sse;

use sse::{SseDecoder, SseEvent};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Fixed so every analysis is produced by the same model.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f32 = 0.3;
const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// A stream of text deltas in the order the model produced them.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Anything that can turn a prompt into streamed text.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>` so handlers never see the provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Starts a completion. Errors returned here happen before any text was produced;
    /// errors inside the stream happen mid-answer.
    async fn stream_text(&self, prompt: &str, system: &str) -> Result<TextStream, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Payload of one streamed event. Only the variants the service acts on are modelled.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamPayload {
    ContentBlockDelta { delta: Delta },
    MessageStop,
    Error { error: AnthropicErrorBody },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, PartialEq)]
enum StreamStep {
    Text(String),
    Stop,
    Skip,
}

fn interpret_event(event: &SseEvent) -> Result<StreamStep, LlmError> {
    if event.data.is_empty() {
        return Ok(StreamStep::Skip);
    }
    match serde_json::from_str::<StreamPayload>(&event.data)? {
        StreamPayload::ContentBlockDelta {
            delta: Delta::TextDelta { text },
        } => Ok(StreamStep::Text(text)),
        StreamPayload::MessageStop => Ok(StreamStep::Stop),
        StreamPayload::Error { error } => Err(LlmError::Stream(error.message)),
        _ => Ok(StreamStep::Skip),
    }
}

/// Turns the raw SSE body into text deltas, ending at `message_stop` or end of body.
fn text_deltas<S>(body: S) -> impl Stream<Item = Result<String, LlmError>> + Send
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    async_stream::try_stream! {
        let mut body = Box::pin(body);
        let mut decoder = SseDecoder::default();
        'read: while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(LlmError::from)?;
            for event in decoder.push(&chunk) {
                match interpret_event(&event)? {
                    StreamStep::Text(text) if !text.is_empty() => {
                        yield text;
                    }
                    StreamStep::Stop => break 'read,
                    _ => {}
                }
            }
        }
        if decoder.pending() > 0 {
            debug!("LLM stream ended with {} undelimited bytes", decoder.pending());
        }
    }
}

/// The LLM client used by the analysis service.
/// Wraps the Anthropic Messages API with retry logic and streaming output.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    retry_base_delay: Duration,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Self::with_api_url(api_key, ANTHROPIC_API_URL.to_string())
    }

    /// Points the client at a different Messages endpoint (proxies, test servers).
    pub fn with_api_url(api_key: String, api_url: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(300))
                .build()?,
            api_key,
            api_url,
            retry_base_delay: RETRY_BASE_DELAY,
        })
    }

    /// First retry delay; each further retry doubles it.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Sends the streaming request, retrying on 429 and 5xx with exponential backoff.
    /// Only the initial response is retried; once bytes flow the stream is final.
    async fn open_stream(&self, prompt: &str, system: &str) -> Result<reqwest::Response, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            stream: true,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = self.retry_base_delay * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .header("accept", "text/event-stream")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            debug!("LLM stream opened on attempt {}", attempt + 1);
            return Ok(response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn stream_text(&self, prompt: &str, system: &str) -> Result<TextStream, LlmError> {
        let response = self.open_stream(prompt, system).await?;
        Ok(Box::pin(text_deltas(response.bytes_stream())))
    }
}
